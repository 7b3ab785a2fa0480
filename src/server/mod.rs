//! # HTTP Server for Slide Rendering
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /generate` | JSON slide description in, PNG out |
//! | `GET /.well-known/schemas/slide-generator.json` | JSON Schema of the request body |
//! | `GET /health` | Liveness probe |
//!
//! ## Usage
//!
//! ```bash
//! slidegen serve --listen 0.0.0.0:8080
//! curl -X POST localhost:8080/generate \
//!     -H 'content-type: application/json' \
//!     -d '{"title": "Q1 Report"}' -o slide.png
//! ```

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::SlideError;

/// Build the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(handlers::generate::generate))
        .route(
            "/.well-known/schemas/slide-generator.json",
            get(handlers::generate::schema),
        )
        .route("/health", get(handlers::generate::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use slidegen::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), slidegen::error::SlideError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), SlideError> {
    let app_state = Arc::new(AppState::new(&config)?);
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| SlideError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;

    info!(
        listen = %config.listen_addr,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        "slidegen HTTP server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| SlideError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
