//! # Render Tests
//!
//! End-to-end composition through the public API with the bitmap font, a
//! fixed seed, and in-memory fetchers, so nothing here touches the network.
//!
//! Most checks compare a slide against a baseline rendered with the same
//! seed: the background is identical, so any differing pixel was drawn by
//! the element under test.

use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use slidegen::compose::{self, Assets, Renderer, Visual, VisualKind};
use slidegen::fetch::{FetchError, ImageSource, MapSource};
use slidegen::json_api::{MapSpec, SlideRequest};
use slidegen::render::{Canvas, background};
use slidegen::text::FontLibrary;

const SEED: u64 = 7;

// ============================================================================
// HELPERS
// ============================================================================

struct Solid(Rgba<u8>);

#[async_trait]
impl ImageSource for Solid {
    async fn fetch_image(&self, _url: &str) -> Result<DynamicImage, FetchError> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, self.0)))
    }
}

#[async_trait]
impl MapSource for Solid {
    async fn fetch_map(&self, _spec: &MapSpec) -> Result<DynamicImage, FetchError> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, self.0)))
    }
}

struct Unreachable;

#[async_trait]
impl ImageSource for Unreachable {
    async fn fetch_image(&self, _url: &str) -> Result<DynamicImage, FetchError> {
        Err(FetchError::Transport("connection refused".into()))
    }
}

#[async_trait]
impl MapSource for Unreachable {
    async fn fetch_map(&self, _spec: &MapSpec) -> Result<DynamicImage, FetchError> {
        Err(FetchError::NoTiles)
    }
}

fn parse(json: &str) -> SlideRequest {
    serde_json::from_str(json).unwrap()
}

fn draw(json: &str, assets: &Assets) -> Canvas {
    let mut rng = StdRng::seed_from_u64(SEED);
    compose::compose(&parse(json), assets, &FontLibrary::bitmap(), &mut rng)
}

fn photo(color: Rgba<u8>, width: u32, height: u32) -> Assets {
    Assets {
        visual: Some(Visual {
            kind: VisualKind::Photo,
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, color)),
        }),
    }
}

/// Count pixels inside `[x0, x1) × [y0, y1)` that differ between two canvases.
fn diff_in(a: &Canvas, b: &Canvas, (x0, y0): (u32, u32), (x1, y1): (u32, u32)) -> usize {
    let mut count = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            if a.pixel(x, y) != b.pixel(x, y) {
                count += 1;
            }
        }
    }
    count
}

fn close_to(px: Option<Rgba<u8>>, want: [u8; 3], tolerance: u8) -> bool {
    px.is_some_and(|p| (0..3).all(|c| p[c].abs_diff(want[c]) <= tolerance))
}

// ============================================================================
// HORIZONTAL
// ============================================================================

#[test]
fn test_q1_report_places_title_and_chart() {
    let baseline = draw("{}", &Assets::default());
    let slide = draw(
        r#"{
            "title": "Q1 Report",
            "graph": {"type": "bar", "data": [1, 2, 3], "labels": ["a", "b", "c"]}
        }"#,
        &Assets::default(),
    );

    assert_eq!((slide.width(), slide.height()), (1920, 1080));
    // Title band, horizontally centered.
    assert!(diff_in(&baseline, &slide, (700, 80), (1220, 160)) > 0);
    // Chart in the left column.
    assert!(diff_in(&baseline, &slide, (80, 240), (920, 860)) > 10_000);
    // Nothing to draw on the right.
    assert_eq!(diff_in(&baseline, &slide, (1000, 240), (1920, 1080)), 0);
}

#[test]
fn test_empty_request_is_a_plain_gradient() {
    let slide = draw("{}", &Assets::default());
    let mut rng = StdRng::seed_from_u64(SEED);
    let gradient = background::generate(1920, 1080, false, &mut rng);
    assert_eq!(slide.image().as_raw(), gradient.image().as_raw());
}

#[test]
fn test_photo_takes_visual_slot_over_chart() {
    let baseline = draw("{}", &Assets::default());
    let slide = draw(
        r#"{"graph": {"type": "line", "data": [3, 1, 2], "labels": ["x", "y", "z"]}}"#,
        &photo(Rgba([0, 255, 0, 255]), 100, 100),
    );

    // Not upscaled: 100×100 at the content origin.
    assert!(close_to(slide.pixel(80, 80), [0, 255, 0], 2));
    assert!(close_to(slide.pixel(179, 179), [0, 255, 0], 2));
    // Light backing around it.
    assert_eq!(slide.pixel(65, 65), Some(Rgba([240, 240, 240, 255])));
    assert_eq!(slide.pixel(190, 190), Some(Rgba([240, 240, 240, 255])));
    // No chart beyond the backing.
    assert_eq!(diff_in(&baseline, &slide, (210, 210), (920, 1000)), 0);
}

#[test]
fn test_text_moves_right_when_visual_present() {
    let text_only = r#"{"textBlocks": [{"text": "Revenue grew"}]}"#;
    let baseline = draw("{}", &Assets::default());

    let alone = draw(text_only, &Assets::default());
    assert!(diff_in(&baseline, &alone, (80, 80), (900, 140)) > 0);

    let beside = draw(text_only, &photo(Rgba([0, 0, 0, 255]), 40, 40));
    assert!(diff_in(&baseline, &beside, (1000, 80), (1840, 140)) > 0);
    assert_eq!(diff_in(&baseline, &beside, (200, 200), (920, 1000)), 0);
}

#[test]
fn test_table_renders_below_content() {
    let baseline = draw("{}", &Assets::default());
    let slide = draw(
        r#"{"table": {"headers": ["Region", "Sales"], "rows": [["East", "10"], ["West"]]}}"#,
        &Assets::default(),
    );
    // Header row band starts at the default cursor plus the table gap.
    assert!(diff_in(&baseline, &slide, (80, 110), (1840, 160)) > 0);
    // Three rows of 50px end at 260.
    assert!(diff_in(&baseline, &slide, (80, 210), (1840, 260)) > 0);
    assert_eq!(diff_in(&baseline, &slide, (0, 270), (1920, 1080)), 0);
}

#[test]
fn test_table_without_headers_is_skipped() {
    let baseline = draw("{}", &Assets::default());
    let slide = draw(r#"{"table": {"headers": [], "rows": [["a"]]}}"#, &Assets::default());
    assert_eq!(slide.image().as_raw(), baseline.image().as_raw());
}

#[test]
fn test_mixed_script_title_renders() {
    let baseline = draw("{}", &Assets::default());
    let slide = draw(r#"{"title": "売上レポート Q1 2024"}"#, &Assets::default());
    assert!(diff_in(&baseline, &slide, (0, 60), (1920, 170)) > 0);
}

// ============================================================================
// VERTICAL
// ============================================================================

#[test]
fn test_vertical_chart_card_over_map_background() {
    let assets = Assets {
        visual: Some(Visual {
            kind: VisualKind::Map,
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255]))),
        }),
    };
    let slide = draw(
        r#"{
            "format": "vertical",
            "graph": {"type": "pie", "data": [1, 1], "labels": ["yes", "no"]}
        }"#,
        &assets,
    );

    assert_eq!((slide.width(), slide.height()), (1080, 1920));
    // Map covers the page.
    assert!(close_to(slide.pixel(5, 1900), [0, 0, 255], 2));
    // Near-opaque white card below the top safe area.
    let card = slide.pixel(45, 105);
    assert!(card.is_some_and(|p| p[0] >= 235 && p[1] >= 235));
}

#[test]
fn test_vertical_elements_stack_downward() {
    let baseline = draw(r#"{"format": "vertical"}"#, &Assets::default());
    let slide = draw(
        r#"{
            "format": "vertical",
            "title": "Launch",
            "textBlocks": [{"text": "One"}, {"text": "Two"}],
            "table": {"headers": ["k", "v"], "rows": [["a", "1"]]}
        }"#,
        &Assets::default(),
    );

    assert!(diff_in(&baseline, &slide, (20, 100), (1060, 300)) > 0);
    assert!(diff_in(&baseline, &slide, (40, 300), (1040, 900)) > 0);
    // Bottom of the page is untouched.
    assert_eq!(diff_in(&baseline, &slide, (0, 1500), (1080, 1920)), 0);
}

// ============================================================================
// RENDERER
// ============================================================================

#[tokio::test]
async fn test_unreachable_image_degrades_to_gradient() {
    let renderer = Renderer::new(FontLibrary::bitmap(), Arc::new(Unreachable), Arc::new(Unreachable))
        .with_seed(SEED);

    let with_image = renderer
        .render(&parse(r#"{"title": "Hi", "image": {"url": "http://10.255.255.1/x.png"}}"#))
        .await
        .unwrap();
    let without = renderer.render(&parse(r#"{"title": "Hi"}"#)).await.unwrap();

    assert_eq!(&with_image[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(with_image, without);
}

#[tokio::test]
async fn test_rendered_png_decodes_at_canvas_size() {
    let renderer = Renderer::new(
        FontLibrary::bitmap(),
        Arc::new(Solid(Rgba([10, 20, 30, 255]))),
        Arc::new(Unreachable),
    )
    .with_seed(SEED);

    let png = renderer
        .render(&parse(r#"{"format": "vertical", "image": {"url": "http://x/a.jpg"}}"#))
        .await
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1920));
}
