//! # Rendering Module
//!
//! Raster primitives the layout engines draw with.
//!
//! ## Modules
//!
//! - [`canvas`]: RGBA canvas with source-over compositing and PNG encoding
//! - [`background`]: random vertical gradients and cover-fitted photos
//! - [`chart`]: bar, line, and pie charts on a transparent bitmap
//!
//! ## Usage Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use slidegen::render::background;
//!
//! // 1920x1080 gradient, reproducible from the seed
//! let mut rng = StdRng::seed_from_u64(7);
//! let canvas = background::generate(1920, 1080, false, &mut rng);
//!
//! let png = canvas.encode_png().unwrap();
//! assert!(!png.is_empty());
//! ```

pub mod background;
pub mod canvas;
pub mod chart;

pub use canvas::{Canvas, Rect};
