//! # JSON API
//!
//! Deserialize JSON slide descriptions and describe them with a JSON Schema.
//!
//! ## Example
//!
//! ```
//! use slidegen::json_api::{SlideFormat, SlideRequest};
//!
//! let json = r#"{
//!     "title": "Q1 Report",
//!     "graph": {"type": "bar", "data": [1, 2, 3], "labels": ["a", "b", "c"]},
//!     "format": "horizontal"
//! }"#;
//!
//! let req: SlideRequest = serde_json::from_str(json).unwrap();
//! req.validate().unwrap();
//! assert_eq!(req.format(), SlideFormat::Horizontal);
//! ```

mod discovery;
mod schema;
mod validate;

pub use discovery::slide_request_schema;
pub use schema::{
    ChartKind, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, GraphData, ImageRef, MapSpec, SlideFormat,
    SlideRequest, TableData, TextBlock,
};
pub use validate::MAX_MAP_EDGE;
