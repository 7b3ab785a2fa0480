//! # Composition
//!
//! Turns a [`SlideRequest`] into PNG bytes in two phases:
//!
//! 1. [`Renderer::resolve`] (async) fetches the remote visual: the photo if
//!    one is requested, otherwise the map. Failures are logged and leave the
//!    visual empty.
//! 2. [`compose`] (blocking, pure) draws background, title, visual, text and
//!    table in a fixed order onto a fresh canvas.
//!
//! [`Renderer::render`] runs both and encodes the result, moving the CPU-bound
//! work onto tokio's blocking pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::SlideError;
use crate::fetch::{FetchError, HttpImageSource, ImageSource, MapSource, TileMapSource};
use crate::json_api::{SlideFormat, SlideRequest};
use crate::layout::{HorizontalCursor, HorizontalLayout, VerticalCursor, VerticalLayout};
use crate::render::{Canvas, background, chart};
use crate::text::FontLibrary;

/// Where a resolved visual came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Photo,
    Map,
}

/// A fetched raster ready to be placed.
#[derive(Debug, Clone)]
pub struct Visual {
    pub kind: VisualKind,
    pub image: DynamicImage,
}

/// Everything the compositor needs from the network.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    /// Photo or map. Takes the visual slot (horizontal) or the background
    /// (vertical) ahead of any chart.
    pub visual: Option<Visual>,
}

/// Upper bound on resolving one visual (a photo, or every tile of a map).
pub const DEFAULT_RESOLVE_DEADLINE: Duration = Duration::from_secs(30);

/// Shared render entry point. Cheap to clone.
#[derive(Clone)]
pub struct Renderer {
    fonts: FontLibrary,
    images: Arc<dyn ImageSource>,
    maps: Arc<dyn MapSource>,
    seed: Option<u64>,
    deadline: Duration,
}

impl Renderer {
    pub fn new(fonts: FontLibrary, images: Arc<dyn ImageSource>, maps: Arc<dyn MapSource>) -> Self {
        Self {
            fonts,
            images,
            maps,
            seed: None,
            deadline: DEFAULT_RESOLVE_DEADLINE,
        }
    }

    /// Renderer fetching photos over HTTP and maps from OpenStreetMap tiles.
    pub fn live(fonts: FontLibrary, fetch_timeout: Duration) -> Result<Self, SlideError> {
        let http = HttpImageSource::new(fetch_timeout)?;
        let maps = TileMapSource::new(http.clone());
        Ok(Self::new(fonts, Arc::new(http), Arc::new(maps)))
    }

    /// Fix the background colors. Without a seed every render is different.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bound the time spent fetching each visual, however many requests it takes.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Fetch the photo, or the map when there is no usable photo.
    pub async fn resolve(&self, request: &SlideRequest) -> Assets {
        if let Some(image) = &request.image
            && !image.url.trim().is_empty()
        {
            match self.bounded(self.images.fetch_image(&image.url)).await {
                Ok(photo) => {
                    return Assets {
                        visual: Some(Visual {
                            kind: VisualKind::Photo,
                            image: photo,
                        }),
                    };
                }
                Err(e) => warn!(url = %image.url, error = %e, "image unavailable, falling back"),
            }
        }

        if let Some(map) = &request.map {
            match self.bounded(self.maps.fetch_map(map)).await {
                Ok(raster) => {
                    return Assets {
                        visual: Some(Visual {
                            kind: VisualKind::Map,
                            image: raster,
                        }),
                    };
                }
                Err(e) => warn!(lat = map.lat, lon = map.lon, error = %e, "map unavailable, falling back"),
            }
        }

        Assets::default()
    }

    async fn bounded(
        &self,
        fetch: impl Future<Output = Result<DynamicImage, FetchError>>,
    ) -> Result<DynamicImage, FetchError> {
        tokio::time::timeout(self.deadline, fetch)
            .await
            .unwrap_or(Err(FetchError::Timeout))
    }

    /// Draw the slide with this renderer's fonts and seed.
    pub fn compose(&self, request: &SlideRequest, assets: &Assets) -> Canvas {
        compose(request, assets, &self.fonts, &mut self.rng())
    }

    /// Resolve, compose, and encode one slide as PNG.
    pub async fn render(&self, request: &SlideRequest) -> Result<Vec<u8>, SlideError> {
        let assets = self.resolve(request).await;
        let renderer = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || renderer.compose(&request, &assets).encode_png())
            .await
            .map_err(|e| SlideError::Encoding(format!("Render task failed: {}", e)))?
    }
}

/// Draw a slide onto a fresh canvas.
pub fn compose(request: &SlideRequest, assets: &Assets, fonts: &FontLibrary, rng: &mut impl Rng) -> Canvas {
    let started = Instant::now();
    let format = request.format();
    let canvas = match format {
        SlideFormat::Horizontal => compose_horizontal(request, assets, fonts, rng),
        SlideFormat::Vertical => compose_vertical(request, assets, fonts, rng),
    };
    debug!(
        ?format,
        visual = ?assets.visual.as_ref().map(|v| v.kind),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "slide composed"
    );
    canvas
}

fn compose_horizontal(request: &SlideRequest, assets: &Assets, fonts: &FontLibrary, rng: &mut impl Rng) -> Canvas {
    let (width, height) = SlideFormat::Horizontal.canvas_size();
    let mut canvas = background::generate(width, height, false, rng);
    let layout = HorizontalLayout::new(fonts);
    let mut cursor = HorizontalCursor::default();

    if let Some(title) = request.title() {
        cursor = layout.title(&mut canvas, cursor, title);
    }

    if let Some(visual) = &assets.visual {
        cursor = layout.visual(&mut canvas, cursor, &visual.image.to_rgba8(), false);
    } else if let Some(rendered) = request
        .graph
        .as_ref()
        .and_then(|graph| chart::render(graph, SlideFormat::Horizontal, fonts))
    {
        cursor = layout.visual(&mut canvas, cursor, rendered.image(), true);
    }

    let texts = request.texts();
    if !texts.is_empty() {
        cursor = layout.text_blocks(&mut canvas, cursor, &texts);
    }

    if let Some(table) = &request.table {
        layout.table(&mut canvas, cursor, table);
    }

    canvas
}

fn compose_vertical(request: &SlideRequest, assets: &Assets, fonts: &FontLibrary, rng: &mut impl Rng) -> Canvas {
    let (width, height) = SlideFormat::Vertical.canvas_size();
    let mut canvas = match &assets.visual {
        Some(visual) => background::with_image(width, height, true, &visual.image, rng),
        None => background::generate(width, height, true, rng),
    };
    let layout = VerticalLayout::new(fonts, assets.visual.is_some());
    let mut cursor = VerticalCursor::default();

    if let Some(title) = request.title() {
        cursor = layout.title_overlay(&mut canvas, cursor, title);
    }

    if let Some(rendered) = request
        .graph
        .as_ref()
        .and_then(|graph| chart::render(graph, SlideFormat::Vertical, fonts))
    {
        cursor = layout.chart_card(&mut canvas, cursor, rendered.image());
    }

    let texts = request.texts();
    if !texts.is_empty() {
        cursor = layout.text_cards(&mut canvas, cursor, &texts);
    }

    if let Some(table) = &request.table {
        layout.table_card(&mut canvas, cursor, table);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::json_api::MapSpec;
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};

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

    struct Down;

    #[async_trait]
    impl ImageSource for Down {
        async fn fetch_image(&self, _url: &str) -> Result<DynamicImage, FetchError> {
            Err(FetchError::Timeout)
        }
    }

    #[async_trait]
    impl MapSource for Down {
        async fn fetch_map(&self, _spec: &MapSpec) -> Result<DynamicImage, FetchError> {
            Err(FetchError::NoTiles)
        }
    }

    struct Stalled;

    #[async_trait]
    impl MapSource for Stalled {
        async fn fetch_map(&self, _spec: &MapSpec) -> Result<DynamicImage, FetchError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Err(FetchError::NoTiles)
        }
    }

    fn renderer(images: impl ImageSource + 'static, maps: impl MapSource + 'static) -> Renderer {
        Renderer::new(FontLibrary::bitmap(), Arc::new(images), Arc::new(maps)).with_seed(1)
    }

    fn parse(json: &str) -> SlideRequest {
        serde_json::from_str(json).unwrap()
    }

    const BOTH: &str = r#"{
        "image": {"url": "http://example.invalid/a.png"},
        "map": {"lat": 35.0, "lon": 139.0}
    }"#;

    #[tokio::test]
    async fn test_photo_wins_over_map() {
        let r = renderer(Solid(Rgba([0, 255, 0, 255])), Solid(Rgba([0, 0, 255, 255])));
        let assets = r.resolve(&parse(BOTH)).await;
        assert_eq!(assets.visual.map(|v| v.kind), Some(VisualKind::Photo));
    }

    #[tokio::test]
    async fn test_map_used_when_photo_fails() {
        let r = renderer(Down, Solid(Rgba([0, 0, 255, 255])));
        let assets = r.resolve(&parse(BOTH)).await;
        assert_eq!(assets.visual.map(|v| v.kind), Some(VisualKind::Map));
    }

    #[tokio::test]
    async fn test_everything_down_resolves_to_nothing() {
        let r = renderer(Down, Down);
        let assets = r.resolve(&parse(BOTH)).await;
        assert!(assets.visual.is_none());
    }

    #[tokio::test]
    async fn test_map_not_fetched_without_map_spec() {
        let r = renderer(Down, Solid(Rgba([0, 0, 255, 255])));
        let assets = r.resolve(&parse(r#"{"image": {"url": "http://x.invalid/"}}"#)).await;
        assert!(assets.visual.is_none());
    }

    #[tokio::test]
    async fn test_stalled_map_hits_deadline() {
        let r = renderer(Down, Stalled).with_deadline(Duration::from_millis(50));
        let started = Instant::now();
        let assets = r.resolve(&parse(BOTH)).await;
        assert!(assets.visual.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_canvas_size_follows_format() {
        let r = renderer(Down, Down);
        let h = r.compose(&parse("{}"), &Assets::default());
        assert_eq!((h.width(), h.height()), (1920, 1080));
        let v = r.compose(&parse(r#"{"format": "vertical"}"#), &Assets::default());
        assert_eq!((v.width(), v.height()), (1080, 1920));
    }

    #[test]
    fn test_seeded_compose_is_deterministic() {
        let r = renderer(Down, Down);
        let req = parse(r#"{"title": "Same", "textBlocks": [{"text": "every time"}]}"#);
        let a = r.compose(&req, &Assets::default());
        let b = r.compose(&req, &Assets::default());
        assert_eq!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn test_vertical_photo_becomes_background() {
        let r = renderer(Down, Down);
        let assets = Assets {
            visual: Some(Visual {
                kind: VisualKind::Photo,
                image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(90, 160, Rgba([0, 200, 0, 255]))),
            }),
        };
        let canvas = r.compose(&parse(r#"{"format": "vertical"}"#), &assets);
        assert_eq!(canvas.pixel(5, 1900), Some(Rgba([0, 200, 0, 255])));
    }

    #[tokio::test]
    async fn test_render_returns_png() {
        let r = renderer(Down, Down);
        let png = r.render(&parse(r#"{"title": "Hi"}"#)).await.unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
