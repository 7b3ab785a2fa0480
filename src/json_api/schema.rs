//! JSON request types for the slide API.

use serde::{Deserialize, Serialize};
use tracing::warn;

fn default_zoom() -> i32 {
    14
}

fn default_language() -> Option<String> {
    Some("ja".to_string())
}

/// Default map raster size when the request leaves it out.
pub const DEFAULT_MAP_WIDTH: u32 = 800;
pub const DEFAULT_MAP_HEIGHT: u32 = 600;

/// Top-level slide description.
///
/// Every field is optional; an empty object renders a bare background.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Text blocks, rendered in array order.
    #[serde(default)]
    pub text_blocks: Option<Vec<TextBlock>>,
    /// Single chart.
    #[serde(default)]
    pub graph: Option<GraphData>,
    #[serde(default)]
    pub table: Option<TableData>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub map: Option<MapSpec>,
    /// `null` and missing both mean horizontal.
    #[serde(default)]
    pub format: Option<SlideFormat>,
}

impl SlideRequest {
    /// Page geometry selected by the request.
    pub fn format(&self) -> SlideFormat {
        self.format.unwrap_or_default()
    }

    /// Non-empty title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Text block contents in rendering order.
    pub fn texts(&self) -> Vec<&str> {
        self.text_blocks
            .iter()
            .flatten()
            .map(|block| block.text.as_str())
            .collect()
    }
}

/// Page geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideFormat {
    /// 1920×1080 wide slide.
    #[default]
    Horizontal,
    /// 1080×1920 story format.
    Vertical,
}

impl SlideFormat {
    /// Canvas size in pixels as `(width, height)`.
    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            SlideFormat::Horizontal => (1920, 1080),
            SlideFormat::Vertical => (1080, 1920),
        }
    }
}

/// A single paragraph of text. No styling fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextBlock {
    pub text: String,
}

/// Chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// Chart data: parallel value and label sequences.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphData {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: Vec<f64>,
    pub labels: Vec<String>,
}

impl GraphData {
    /// Values paired with their labels.
    ///
    /// Mismatched lengths are truncated to the shorter sequence.
    pub fn points(&self) -> Vec<(&str, f64)> {
        if self.data.len() != self.labels.len() {
            warn!(
                values = self.data.len(),
                labels = self.labels.len(),
                "graph data/label length mismatch, truncating"
            );
        }
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
            .collect()
    }
}

/// Table data. The header count defines the column count.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Body rows coerced to exactly `column_count()` cells.
    ///
    /// Extra cells are dropped and missing cells are empty strings.
    pub fn normalized_rows(&self) -> Vec<Vec<&str>> {
        let columns = self.column_count();
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() != columns {
                    warn!(
                        row = index,
                        cells = row.len(),
                        columns,
                        "ragged table row, clipping to header width"
                    );
                }
                (0..columns)
                    .map(|col| row.get(col).map(String::as_str).unwrap_or(""))
                    .collect()
            })
            .collect()
    }
}

/// Reference to a remote raster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageRef {
    pub url: String,
}

/// Map pin description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapSpec {
    pub lat: f64,
    pub lon: f64,
    /// Zoom level, 1–20 expected.
    #[serde(default = "default_zoom")]
    pub zoom: i32,
    /// Language hint. Does not affect rendering geometry.
    #[serde(default = "default_language")]
    pub language: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl MapSpec {
    /// Requested raster size, with defaults applied.
    pub fn size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(DEFAULT_MAP_WIDTH),
            self.height.unwrap_or(DEFAULT_MAP_HEIGHT),
        )
    }
}
