//! Full-canvas backgrounds: vertical two-color gradients and fitted photos.

use image::{DynamicImage, Rgba, imageops::FilterType};
use rand::Rng;

use super::canvas::Canvas;

/// Top and bottom colors of a vertical gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub top: [u8; 3],
    pub bottom: [u8; 3],
}

/// Curated color pairs for the story format.
pub const VIBRANT_PALETTES: [Gradient; 6] = [
    Gradient { top: [102, 51, 153], bottom: [255, 94, 98] },
    Gradient { top: [0, 82, 212], bottom: [67, 198, 172] },
    Gradient { top: [255, 0, 132], bottom: [51, 0, 27] },
    Gradient { top: [17, 153, 142], bottom: [24, 90, 157] },
    Gradient { top: [252, 70, 107], bottom: [63, 94, 251] },
    Gradient { top: [255, 126, 95], bottom: [142, 45, 226] },
];

/// Channel range of the random top color. Dark enough for white text.
const TOP_RANGE: std::ops::RangeInclusive<u8> = 40..=120;
/// Channel range of the random bottom color.
const BOTTOM_RANGE: std::ops::RangeInclusive<u8> = 20..=80;

impl Gradient {
    /// Pick gradient colors: a curated palette when `vibrant`, otherwise
    /// independent uniform samples per channel.
    pub fn random(rng: &mut impl Rng, vibrant: bool) -> Self {
        if vibrant {
            VIBRANT_PALETTES[rng.random_range(0..VIBRANT_PALETTES.len())]
        } else {
            Self {
                top: [
                    rng.random_range(TOP_RANGE),
                    rng.random_range(TOP_RANGE),
                    rng.random_range(TOP_RANGE),
                ],
                bottom: [
                    rng.random_range(BOTTOM_RANGE),
                    rng.random_range(BOTTOM_RANGE),
                    rng.random_range(BOTTOM_RANGE),
                ],
            }
        }
    }

    /// Color of scanline `y` on a canvas `height` pixels tall.
    pub fn color_at(&self, y: u32, height: u32) -> Rgba<u8> {
        let t = if height == 0 { 0.0 } else { y as f64 / height as f64 };
        let mut out = [0u8, 0, 0, 255];
        for c in 0..3 {
            let a = self.top[c] as f64;
            let b = self.bottom[c] as f64;
            out[c] = (a * (1.0 - t) + b * t).floor() as u8;
        }
        Rgba(out)
    }

    /// Render the gradient one scanline at a time.
    pub fn render(&self, width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        for y in 0..height {
            canvas.set_row(y, self.color_at(y, height));
        }
        canvas
    }
}

/// Random gradient canvas.
pub fn generate(width: u32, height: u32, vibrant: bool, rng: &mut impl Rng) -> Canvas {
    Gradient::random(rng, vibrant).render(width, height)
}

/// Region of `source` that, scaled up or down, covers `width`×`height`.
///
/// The scale is the canvas width over the source width; if that leaves the
/// height short, the canvas height over the source height instead. The
/// region is centered and returned as `(x, y, w, h)` in source pixels, so
/// only the visible part is ever resampled.
pub fn cover_crop(source: (u32, u32), width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let mut scale = width as f64 / src_w as f64;
    if (src_h as f64 * scale).round() < height as f64 {
        scale = height as f64 / src_h as f64;
    }
    let crop_w = ((width as f64 / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((height as f64 / scale).round() as u32).clamp(1, src_h);
    ((src_w - crop_w) / 2, (src_h - crop_h) / 2, crop_w, crop_h)
}

/// Gradient canvas with `source` center-cropped and scaled to cover it.
pub fn with_image(
    width: u32,
    height: u32,
    vibrant: bool,
    source: &DynamicImage,
    rng: &mut impl Rng,
) -> Canvas {
    let mut canvas = generate(width, height, vibrant, rng);
    if source.width() == 0 || source.height() == 0 || width == 0 || height == 0 {
        return canvas;
    }
    let (x, y, crop_w, crop_h) = cover_crop((source.width(), source.height()), width, height);
    let fitted = source
        .crop_imm(x, y, crop_w, crop_h)
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();
    canvas.paste(&fitted, 0, 0);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lerp(a: u8, b: u8, t: f64) -> f64 {
        a as f64 * (1.0 - t) + b as f64 * t
    }

    #[test]
    fn test_random_colors_within_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let g = Gradient::random(&mut rng, false);
            assert!(g.top.iter().all(|c| TOP_RANGE.contains(c)));
            assert!(g.bottom.iter().all(|c| BOTTOM_RANGE.contains(c)));
        }
    }

    #[test]
    fn test_vibrant_picks_from_palette() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let g = Gradient::random(&mut rng, true);
            assert!(VIBRANT_PALETTES.contains(&g));
        }
    }

    #[test]
    fn test_same_seed_same_background() {
        let a = generate(16, 32, false, &mut StdRng::seed_from_u64(42));
        let b = generate(16, 32, false, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn test_scanlines_follow_linear_interpolation() {
        let g = Gradient::random(&mut StdRng::seed_from_u64(3), false);
        let height = 1080;
        let canvas = g.render(4, height);
        for y in (0..height).step_by(37) {
            let t = y as f64 / height as f64;
            let px = canvas.pixel(2, y).unwrap();
            for c in 0..3 {
                let expected = lerp(g.top[c], g.bottom[c], t);
                assert!(
                    (px[c] as f64 - expected).abs() <= 1.0,
                    "row {} channel {}: {} vs {}",
                    y,
                    c,
                    px[c],
                    expected
                );
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_gradient_rows_are_uniform() {
        let canvas = Gradient { top: [40, 40, 40], bottom: [80, 80, 80] }.render(8, 8);
        for y in 0..8 {
            let first = canvas.pixel(0, y);
            assert!((0..8).all(|x| canvas.pixel(x, y) == first));
        }
        assert_eq!(canvas.pixel(0, 0), Some(Rgba([40, 40, 40, 255])));
    }

    #[test]
    fn test_cover_crop_wide_source() {
        // 4:3 photo on a 9:16 canvas: full height, middle strip of the width.
        assert_eq!(cover_crop((800, 600), 1080, 1920), (231, 0, 338, 600));
    }

    #[test]
    fn test_cover_crop_tall_source() {
        assert_eq!(cover_crop((600, 1200), 1920, 1080), (0, 431, 600, 338));
    }

    #[test]
    fn test_cover_crop_extreme_aspect_stays_inside_source() {
        assert_eq!(cover_crop((4000, 1), 1080, 1920), (1999, 0, 1, 1));
        assert_eq!(cover_crop((1, 4000), 1920, 1080), (0, 1999, 1, 1));
    }

    #[test]
    fn test_with_image_extreme_aspect_covers_canvas() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4000,
            1,
            Rgba([200, 20, 20, 255]),
        ));
        let canvas = with_image(1080, 1920, true, &source, &mut StdRng::seed_from_u64(1));
        assert_eq!((canvas.width(), canvas.height()), (1080, 1920));
        assert_eq!(canvas.pixel(540, 960), Some(Rgba([200, 20, 20, 255])));
        assert_eq!(canvas.pixel(0, 1919), Some(Rgba([200, 20, 20, 255])));
    }

    #[test]
    fn test_with_image_covers_canvas() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            30,
            Rgba([10, 200, 30, 255]),
        ));
        let canvas = with_image(90, 160, true, &source, &mut StdRng::seed_from_u64(1));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba([10, 200, 30, 255])));
        assert_eq!(canvas.pixel(89, 159), Some(Rgba([10, 200, 30, 255])));
    }
}
