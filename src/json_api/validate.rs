//! Boundary validation for slide requests.
//!
//! Rejects input that cannot be rendered meaningfully. Structural mismatches
//! (ragged table rows, graph data/label length) are not rejected here; the
//! renderer clips them.

use super::schema::SlideRequest;
use crate::error::SlideError;

/// Largest map raster edge we are willing to stitch.
pub const MAX_MAP_EDGE: u32 = 4096;

impl SlideRequest {
    /// Check the request for values the renderer refuses.
    pub fn validate(&self) -> Result<(), SlideError> {
        if let Some(graph) = &self.graph
            && let Some(bad) = graph.data.iter().position(|v| !v.is_finite())
        {
            return Err(SlideError::MalformedInput(format!(
                "graph.data[{}] is not a finite number",
                bad
            )));
        }

        if let Some(image) = &self.image
            && image.url.trim().is_empty()
        {
            return Err(SlideError::MalformedInput(
                "image.url must not be empty".to_string(),
            ));
        }

        if let Some(map) = &self.map {
            if !map.lat.is_finite() || !(-90.0..=90.0).contains(&map.lat) {
                return Err(SlideError::MalformedInput(format!(
                    "map.lat {} is outside [-90, 90]",
                    map.lat
                )));
            }
            if !map.lon.is_finite() || !(-180.0..=180.0).contains(&map.lon) {
                return Err(SlideError::MalformedInput(format!(
                    "map.lon {} is outside [-180, 180]",
                    map.lon
                )));
            }
            let (width, height) = map.size();
            if width == 0 || height == 0 || width > MAX_MAP_EDGE || height > MAX_MAP_EDGE {
                return Err(SlideError::MalformedInput(format!(
                    "map size {}x{} must be between 1 and {} on each edge",
                    width, height, MAX_MAP_EDGE
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SlideRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_request_is_valid() {
        assert!(parse("{}").validate().is_ok());
    }

    #[test]
    fn test_mismatched_graph_is_accepted() {
        let req = parse(r#"{"graph": {"type": "bar", "data": [1, 2, 3], "labels": ["a"]}}"#);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_ragged_table_is_accepted() {
        let req = parse(r#"{"table": {"headers": ["A", "B"], "rows": [["1"], ["1", "2", "3"]]}}"#);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let req = parse(r#"{"map": {"lat": 91.0, "lon": 0.0}}"#);
        let err = req.validate().unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("map.lat"));
    }

    #[test]
    fn test_longitude_out_of_range() {
        let req = parse(r#"{"map": {"lat": 0.0, "lon": -181.0}}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_map_size_rejected() {
        let req = parse(r#"{"map": {"lat": 0.0, "lon": 0.0, "width": 0}}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_oversized_map_rejected() {
        let req = parse(r#"{"map": {"lat": 0.0, "lon": 0.0, "height": 5000}}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_image_url_rejected() {
        let req = parse(r#"{"image": {"url": "  "}}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_finite_graph_value_rejected() {
        let mut req = parse(r#"{"graph": {"type": "line", "data": [1, 2], "labels": ["a", "b"]}}"#);
        if let Some(graph) = req.graph.as_mut() {
            graph.data[1] = f64::NAN;
        }
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("graph.data[1]"));
    }
}
