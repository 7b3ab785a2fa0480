//! # Fetch
//!
//! Remote rasters for the visual slot: photos by URL and maps stitched from
//! slippy-map tiles.
//!
//! Every fetch returns `Result<_, FetchError>`. Callers decide what a failure
//! means; the compositor treats any of them as "visual unavailable" and moves
//! on to the next candidate.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`http`] | reqwest-backed image download with a request timeout |
//! | [`tiles`] | Web-Mercator tile math, stitching, and the center pin |

pub mod http;
pub mod tiles;

pub use http::HttpImageSource;
pub use tiles::TileMapSource;

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

use crate::json_api::MapSpec;

/// Why a remote raster could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not found")]
    NotFound,

    #[error("timed out")]
    Timeout,

    /// Non-success status other than 404
    #[error("HTTP {0}")]
    Http(u16),

    #[error("transport error: {0}")]
    Transport(String),

    /// The body is bigger than the download limit
    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The body was not a decodable image
    #[error("decode error: {0}")]
    Decode(String),

    /// Not a single tile of a map could be fetched
    #[error("no map tiles available")]
    NoTiles,
}

/// Downloads and decodes an image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<DynamicImage, FetchError>;
}

/// Produces a map raster centered on a pin.
#[async_trait]
pub trait MapSource: Send + Sync {
    /// Raster of `spec.size()` with the marker already drawn at the center.
    async fn fetch_map(&self, spec: &MapSpec) -> Result<DynamicImage, FetchError>;
}
