//! # Layout
//!
//! The two page geometries. Each engine is a set of placement steps that take
//! the canvas and a cursor, draw one kind of content, and return the advanced
//! cursor. Cursors are plain `Copy` values; nothing is remembered between
//! steps except what the caller threads through.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`horizontal`] | 1920×1080 slide: centered title, left visual slot, right text column and table |
//! | [`vertical`] | 1080×1920 story: stacked translucent cards over a full-bleed background |

pub mod horizontal;
pub mod vertical;

pub use horizontal::{HorizontalCursor, HorizontalLayout};
pub use vertical::{VerticalCursor, VerticalLayout};

use image::{Rgba, RgbaImage, imageops::FilterType};

use crate::render::Canvas;
use crate::render::canvas::WHITE;
use crate::text::Font;

/// Size that fits `source` inside `bounds` with the source aspect ratio.
///
/// Starts from the source size clamped to the bounds (or the bounds
/// themselves when `upscale` is set), then shrinks whichever dimension is
/// too long for the aspect ratio. Fractional pixels are truncated.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32), upscale: bool) -> (u32, u32) {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    if src_w == 0 || src_h == 0 || bounds.0 == 0 || bounds.1 == 0 {
        return (0, 0);
    }
    let (mut w, mut h) = if upscale {
        (bounds.0 as u64, bounds.1 as u64)
    } else {
        (src_w.min(bounds.0 as u64), src_h.min(bounds.1 as u64))
    };
    // w/h > src_w/src_h, compared without division
    if w * src_h > h * src_w {
        w = h * src_w / src_h;
    } else {
        h = w * src_h / src_w;
    }
    (w.max(1) as u32, h.max(1) as u32)
}

/// Resize `source` to `size` with a Lanczos filter. No-op when already that size.
pub(crate) fn resize_to(source: &RgbaImage, size: (u32, u32)) -> RgbaImage {
    if source.dimensions() == size {
        source.clone()
    } else {
        image::imageops::resize(source, size.0, size.1, FilterType::Lanczos3)
    }
}

/// Draw white `text` over copies of itself in `outline` shifted by each offset.
pub(crate) fn draw_outlined_text(
    canvas: &mut Canvas,
    font: &Font,
    (x, y): (i32, i32),
    text: &str,
    offsets: &[(i32, i32)],
    outline: Rgba<u8>,
) {
    for &(dx, dy) in offsets {
        canvas.draw_text(font, x + dx, y + dy, text, outline);
    }
    canvas.draw_text(font, x, y, text, WHITE);
}

/// X that centers `text` within `width` pixels starting at `left`.
pub(crate) fn centered_x(font: &Font, text: &str, left: i32, width: u32) -> i32 {
    left + ((width as f32 - font.text_width(text)) / 2.0).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_never_upscales_photos() {
        assert_eq!(fit_within((400, 300), (840, 768), false), (400, 300));
    }

    #[test]
    fn test_fit_width_bound() {
        // 1600x1200 into 840x768: width binds
        assert_eq!(fit_within((1600, 1200), (840, 768), false), (840, 630));
    }

    #[test]
    fn test_fit_height_bound() {
        assert_eq!(fit_within((1000, 2000), (840, 768), false), (384, 768));
    }

    #[test]
    fn test_fit_upscales_undersized_chart() {
        assert_eq!(fit_within((800, 600), (960, 360), true), (480, 360));
        assert_eq!(fit_within((400, 300), (840, 768), true), (840, 630));
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        for (src, bounds) in [
            ((800, 600), (840, 628)),
            ((1920, 1080), (840, 768)),
            ((333, 777), (200, 200)),
        ] {
            let (w, h) = fit_within(src, bounds, false);
            assert!(w <= bounds.0 && h <= bounds.1);
            let want = src.0 as f64 / src.1 as f64;
            let got = w as f64 / h as f64;
            assert!((want - got).abs() / want < 0.02, "{:?} -> {:?}", src, (w, h));
        }
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(fit_within((0, 10), (100, 100), false), (0, 0));
        assert_eq!(fit_within((10, 10), (0, 100), true), (0, 0));
    }
}
