//! # Text
//!
//! Font loading, measurement, and script-aware line wrapping.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`script`] | Unicode script classification and break-mode detection |
//! | [`font`] | Outline + bitmap fallback fonts, measurement, rasterization |
//! | [`wrap`] | Greedy measure-and-break wrapping |

pub mod font;
pub mod script;
pub mod wrap;

pub use font::{Font, FontLibrary};
pub use script::{BreakMode, Script};
pub use wrap::{Measure, wrap};
