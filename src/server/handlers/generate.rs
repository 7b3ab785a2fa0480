//! Slide generation and discovery handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::SlideError;
use crate::json_api::{SlideRequest, slide_request_schema};

use super::super::state::AppState;

/// Handle POST /generate - render a slide description as PNG.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SlideRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    request.validate().map_err(into_response_error)?;

    let png_bytes = state.renderer.render(&request).await.map_err(|e| {
        error!(error = %e, "slide render failed");
        into_response_error(e)
    })?;
    info!(
        format = ?request.format(),
        bytes = png_bytes.len(),
        "slide generated"
    );

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

/// Handle GET /.well-known/schemas/slide-generator.json
pub async fn schema() -> impl IntoResponse {
    Json(slide_request_schema())
}

/// Handle GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn into_response_error(e: SlideError) -> (StatusCode, String) {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, e.to_string())
}
