//! # Slidegen - Slide Rendering Library
//!
//! Slidegen turns a JSON description of a slide (title, text blocks, a chart,
//! a table, a photo, or a map pin) into a PNG. It provides:
//!
//! - **Layout engines**: a wide 1920×1080 slide and a tall 1080×1920 story format
//! - **Text**: script-aware wrapping with outline fonts and a bitmap fallback
//! - **Rendering**: gradient and photo backgrounds, bar/line/pie charts
//! - **Fetching**: remote photos and stitched slippy-map tiles, with timeouts
//! - **Server**: an axum HTTP API with a JSON Schema discovery endpoint
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use slidegen::{compose::Renderer, json_api::SlideRequest, text::FontLibrary};
//!
//! # async fn example() -> Result<(), slidegen::SlideError> {
//! let request: SlideRequest = serde_json::from_str(r#"{
//!     "title": "Q1 Report",
//!     "graph": {"type": "bar", "data": [1, 2, 3], "labels": ["a", "b", "c"]}
//! }"#)?;
//! request.validate()?;
//!
//! let renderer = Renderer::live(FontLibrary::discover(), Duration::from_secs(10))?;
//! let png = renderer.render(&request).await?;
//! std::fs::write("slide.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`json_api`] | Request types, validation, JSON Schema |
//! | [`text`] | Fonts, script detection, wrapping |
//! | [`render`] | Canvas, backgrounds, charts |
//! | [`layout`] | Horizontal and vertical layout engines |
//! | [`fetch`] | Photo download and map tiles |
//! | [`compose`] | Composition driver |
//! | [`server`] | HTTP server |
//! | [`error`] | Error types |

pub mod compose;
pub mod error;
pub mod fetch;
pub mod json_api;
pub mod layout;
pub mod render;
pub mod server;
pub mod text;

// Re-exports for convenience
pub use compose::Renderer;
pub use error::SlideError;
pub use json_api::SlideRequest;
