//! JSON Schema document describing [`SlideRequest`](super::SlideRequest).
//!
//! Served at `/.well-known/schemas/slide-generator.json` so clients can
//! validate requests before posting them.

use serde_json::{Value, json};

use super::schema::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use super::validate::MAX_MAP_EDGE;

/// Build the JSON Schema for a slide request.
pub fn slide_request_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SlideRequest",
        "type": "object",
        "properties": {
            "title": { "type": ["string", "null"] },
            "textBlocks": {
                "type": ["array", "null"],
                "items": { "$ref": "#/$defs/TextBlock" }
            },
            "graph": {
                "anyOf": [{ "$ref": "#/$defs/GraphData" }, { "type": "null" }]
            },
            "table": {
                "anyOf": [{ "$ref": "#/$defs/TableData" }, { "type": "null" }]
            },
            "image": {
                "anyOf": [{ "$ref": "#/$defs/ImageData" }, { "type": "null" }]
            },
            "map": {
                "anyOf": [{ "$ref": "#/$defs/MapData" }, { "type": "null" }]
            },
            "format": {
                "anyOf": [
                    { "type": "string", "enum": ["horizontal", "vertical"] },
                    { "type": "null" }
                ],
                "default": "horizontal"
            }
        },
        "$defs": {
            "TextBlock": {
                "type": "object",
                "required": ["text"],
                "properties": { "text": { "type": "string" } }
            },
            "GraphData": {
                "type": "object",
                "required": ["type", "data", "labels"],
                "properties": {
                    "type": { "type": "string", "enum": ["bar", "line", "pie"] },
                    "data": { "type": "array", "items": { "type": "number" } },
                    "labels": { "type": "array", "items": { "type": "string" } }
                }
            },
            "TableData": {
                "type": "object",
                "required": ["headers", "rows"],
                "properties": {
                    "headers": { "type": "array", "items": { "type": "string" } },
                    "rows": {
                        "type": "array",
                        "items": { "type": "array", "items": { "type": "string" } }
                    }
                }
            },
            "ImageData": {
                "type": "object",
                "required": ["url"],
                "properties": { "url": { "type": "string", "minLength": 1 } }
            },
            "MapData": {
                "type": "object",
                "required": ["lat", "lon"],
                "properties": {
                    "lat": { "type": "number", "minimum": -90, "maximum": 90 },
                    "lon": { "type": "number", "minimum": -180, "maximum": 180 },
                    "zoom": { "type": "integer", "default": 14, "minimum": 1, "maximum": 20 },
                    "language": { "type": ["string", "null"], "default": "ja" },
                    "width": {
                        "type": ["integer", "null"],
                        "default": DEFAULT_MAP_WIDTH,
                        "minimum": 1,
                        "maximum": MAX_MAP_EDGE
                    },
                    "height": {
                        "type": ["integer", "null"],
                        "default": DEFAULT_MAP_HEIGHT,
                        "minimum": 1,
                        "maximum": MAX_MAP_EDGE
                    }
                }
            }
        }
    })
}
