//! Slippy-map rendering: stitch 256px Web-Mercator tiles around a point and
//! mark it with a pin.
//!
//! Tiles are fetched through any [`ImageSource`], one after another. Tiles
//! that fail stay light gray; the map only fails when every tile failed.

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use tracing::{debug, warn};

use super::{FetchError, ImageSource, MapSource};
use crate::json_api::MapSpec;

pub const TILE_SIZE: u32 = 256;
pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const MIN_ZOOM: i32 = 1;
pub const MAX_ZOOM: i32 = 19;

/// Web Mercator is undefined past this latitude.
const MAX_LATITUDE: f64 = 85.051_128_78;

const MISSING_TILE: Rgba<u8> = Rgba([230, 230, 230, 255]);
const PIN_COLOR: Rgba<u8> = Rgba([220, 40, 40, 255]);
const PIN_DOT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PIN_RADIUS: i32 = 11;
const PIN_DOT_RADIUS: i32 = 4;
/// Distance from the pin tip up to the center of its head.
const PIN_HEIGHT: i32 = 24;

/// One tile and where its top-left corner lands in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Tile column, already wrapped into `0..2^zoom`.
    pub x: u32,
    pub y: u32,
    pub dest_x: i64,
    pub dest_y: i64,
}

/// Zoom level usable with standard tile servers.
pub fn clamp_zoom(zoom: i32) -> u32 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM) as u32
}

/// Global pixel position of `(lat, lon)` at `zoom`.
pub fn project(lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
    let world = TILE_SIZE as f64 * 2f64.powi(zoom as i32);
    let x = (lon + 180.0) / 360.0 * world;
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * world;
    (x, y)
}

/// Fill `{z}`, `{x}`, and `{y}` in a tile URL template.
pub fn tile_url(template: &str, zoom: u32, x: u32, y: u32) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

/// Tiles covering a `width`×`height` viewport centered on global pixel `center`.
///
/// Columns wrap around the antimeridian. Rows beyond the poles are left out.
pub fn covering_tiles(center: (f64, f64), width: u32, height: u32, zoom: u32) -> Vec<TilePlacement> {
    let tiles_per_side = 1i64 << zoom;
    let tile = TILE_SIZE as i64;
    let left = (center.0 - width as f64 / 2.0).floor() as i64;
    let top = (center.1 - height as f64 / 2.0).floor() as i64;

    let first_col = left.div_euclid(tile);
    let last_col = (left + width as i64 - 1).div_euclid(tile);
    let first_row = top.div_euclid(tile).max(0);
    let last_row = (top + height as i64 - 1).div_euclid(tile).min(tiles_per_side - 1);

    let mut placements = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            placements.push(TilePlacement {
                x: col.rem_euclid(tiles_per_side) as u32,
                y: row as u32,
                dest_x: col * tile - left,
                dest_y: row * tile - top,
            });
        }
    }
    placements
}

/// [`MapSource`] that stitches tiles from a `{z}/{x}/{y}` tile server.
#[derive(Debug, Clone)]
pub struct TileMapSource<S> {
    tiles: S,
    url_template: String,
}

impl<S: ImageSource> TileMapSource<S> {
    /// OpenStreetMap standard tiles.
    pub fn new(tiles: S) -> Self {
        Self::with_template(tiles, OSM_TILE_URL)
    }

    pub fn with_template(tiles: S, url_template: impl Into<String>) -> Self {
        Self {
            tiles,
            url_template: url_template.into(),
        }
    }
}

#[async_trait]
impl<S: ImageSource> MapSource for TileMapSource<S> {
    async fn fetch_map(&self, spec: &MapSpec) -> Result<DynamicImage, FetchError> {
        let zoom = clamp_zoom(spec.zoom);
        let (width, height) = spec.size();
        let center = project(spec.lat, spec.lon, zoom);
        let placements = covering_tiles(center, width, height, zoom);

        let mut map = RgbaImage::from_pixel(width, height, MISSING_TILE);
        let mut fetched = 0usize;
        for placement in &placements {
            let url = tile_url(&self.url_template, zoom, placement.x, placement.y);
            match self.tiles.fetch_image(&url).await {
                Ok(tile) => {
                    imageops::overlay(&mut map, &tile.to_rgba8(), placement.dest_x, placement.dest_y);
                    fetched += 1;
                }
                Err(e) => debug!(url, error = %e, "tile unavailable"),
            }
        }

        if fetched == 0 {
            return Err(FetchError::NoTiles);
        }
        if fetched < placements.len() {
            warn!(
                fetched,
                total = placements.len(),
                "map rendered with missing tiles"
            );
        }

        draw_pin(&mut map, width as i32 / 2, height as i32 / 2);
        Ok(DynamicImage::ImageRgba8(map))
    }
}

/// Teardrop marker with its tip at `(x, y)`.
fn draw_pin(map: &mut RgbaImage, x: i32, y: i32) {
    let head_y = y - PIN_HEIGHT;
    for py in head_y - PIN_RADIUS..=y {
        for px in x - PIN_RADIUS..=x + PIN_RADIUS {
            let dx = px - x;
            let dy = py - head_y;
            let head_dist2 = dx * dx + dy * dy;
            let in_head = head_dist2 <= PIN_RADIUS * PIN_RADIUS;
            // Tail narrows linearly from the head's width to the tip.
            let in_tail = py >= head_y && {
                let t = (y - py) as f32 / PIN_HEIGHT as f32;
                (dx.abs() as f32) <= PIN_RADIUS as f32 * 0.8 * t
            };
            if !(in_head || in_tail) || px < 0 || py < 0 {
                continue;
            }
            let color = if head_dist2 <= PIN_DOT_RADIUS * PIN_DOT_RADIUS {
                PIN_DOT
            } else {
                PIN_COLOR
            };
            if let Some(pixel) = map.get_pixel_mut_checked(px as u32, py as u32) {
                *pixel = color;
            }
        }
    }
}
