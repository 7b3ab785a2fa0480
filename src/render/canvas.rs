//! RGBA drawing surface with source-over compositing.
//!
//! One `Canvas` is created per render and owned by whoever draws into it.
//! Every primitive clips to the canvas bounds, so content placed past an
//! edge is silently cut off.

use image::{ImageEncoder, Rgba, RgbaImage};

use crate::error::SlideError;
use crate::text::Font;

/// Axis-aligned rectangle in canvas pixels. `x`/`y` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow on every side by `by` pixels.
    pub fn inflate(self, by: u32) -> Self {
        Self {
            x: self.x - by as i32,
            y: self.y - by as i32,
            width: self.width + 2 * by,
            height: self.height + 2 * by,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Shorthand for an RGBA color.
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

pub const WHITE: Rgba<u8> = rgba(255, 255, 255, 255);
pub const BLACK: Rgba<u8> = rgba(0, 0, 0, 255);

/// Mutable raster that accumulates drawn layers.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Canvas filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Overwrite a whole scanline, ignoring alpha.
    pub fn set_row(&mut self, y: u32, color: Rgba<u8>) {
        if y >= self.height() {
            return;
        }
        for x in 0..self.width() {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Composite `color` over the pixel at `(x, y)` with extra `coverage` (0..=1).
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let src_a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let src_c = color[c] as f32;
            let dst_c = dst[c] as f32;
            let out = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = out.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Composite a solid rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width() as i32);
        let y1 = rect.bottom().min(self.height() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    /// Composite a border `thickness` pixels wide along the inside of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba<u8>, thickness: u32) {
        let t = thickness.min(rect.width / 2 + 1).min(rect.height / 2 + 1);
        if t == 0 || rect.width == 0 || rect.height == 0 {
            return;
        }
        // Four non-overlapping strips so translucent corners are blended once.
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        if rect.height > t {
            self.fill_rect(
                Rect::new(rect.x, rect.bottom() - t as i32, rect.width, t),
                color,
            );
        }
        let inner_h = rect.height.saturating_sub(2 * t);
        if inner_h > 0 {
            let inner_y = rect.y + t as i32;
            self.fill_rect(Rect::new(rect.x, inner_y, t, inner_h), color);
            if rect.width > t {
                self.fill_rect(Rect::new(rect.right() - t as i32, inner_y, t, inner_h), color);
            }
        }
    }

    /// Composite `src` with its top-left corner at `(x, y)`.
    pub fn paste(&mut self, src: &RgbaImage, x: i32, y: i32) {
        for (sx, sy, px) in src.enumerate_pixels() {
            let dx = x + sx as i32;
            let dy = y + sy as i32;
            if px[3] == 255 {
                if dx >= 0 && dy >= 0 && dx < self.width() as i32 && dy < self.height() as i32 {
                    self.image.put_pixel(dx as u32, dy as u32, *px);
                }
            } else {
                self.blend_pixel(dx, dy, *px, 1.0);
            }
        }
    }

    /// Draw one line of text with its line box's top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, font: &Font, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        font.rasterize(text, |px, py, coverage| {
            self.blend_pixel(x + px, y + py, color, coverage);
        });
    }

    /// Encode as an RGB PNG. Alpha is dropped; slides are opaque.
    pub fn encode_png(&self) -> Result<Vec<u8>, SlideError> {
        let rgb = image::DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();

        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e: image::ImageError| SlideError::Encoding(e.to_string()))?;

        Ok(png_bytes)
    }
}
