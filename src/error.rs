//! # Error Types
//!
//! This module defines error types used throughout the slidegen library.
//!
//! Only [`SlideError`] ever reaches a caller. Fetch problems are described by
//! [`crate::fetch::FetchError`] and are always absorbed by a fallback branch.

use thiserror::Error;

/// Main error type for slidegen operations
#[derive(Debug, Error)]
pub enum SlideError {
    /// The request failed boundary validation
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The finished canvas could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An explicitly requested font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Listener or runtime errors from the HTTP server
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SlideError {
    /// True when the caller sent something we refuse to render.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SlideError::MalformedInput(_) | SlideError::Json(_))
    }
}
