//! Server state and configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::compose::Renderer;
use crate::error::SlideError;
use crate::fetch::http::DEFAULT_TIMEOUT;
use crate::text::FontLibrary;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Upper bound on each image or map tile download
    pub fetch_timeout: Duration,
    /// Font file to use instead of searching the system font directories
    pub font_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            fetch_timeout: DEFAULT_TIMEOUT,
            font_path: None,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub renderer: Renderer,
}

impl AppState {
    /// Load fonts and build live fetchers for `config`.
    pub fn new(config: &ServerConfig) -> Result<Self, SlideError> {
        let fonts = FontLibrary::load(config.font_path.as_deref())?;
        let renderer = Renderer::live(fonts, config.fetch_timeout)?;
        Ok(Self { renderer })
    }

    pub fn with_renderer(renderer: Renderer) -> Self {
        Self { renderer }
    }
}
