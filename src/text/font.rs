//! Font loading, measurement, and rasterization.
//!
//! A [`Font`] is an outline face (loaded with ab_glyph) at a pixel size, with
//! the embedded Spleen 12x24 bitmap face behind it. Characters the outline
//! face has no glyph for are measured and drawn with the bitmap face, so the
//! width used for layout is always the width that gets drawn. When no outline
//! face is available at all, every character uses the bitmap face.

use ab_glyph::{Font as _, FontArc, FontVec, GlyphId, ScaleFont, point};
use spleen_font::{FONT_12X24, PSF2Font};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, warn};

use crate::error::SlideError;

/// Spleen 12x24 cell size.
const BITMAP_CELL_W: usize = 12;
const BITMAP_CELL_H: usize = 24;

/// Spleen face parsed once per process; lookups go through its glyph cache.
static SPLEEN: OnceLock<Option<Mutex<PSF2Font<'static>>>> = OnceLock::new();

fn spleen() -> Option<&'static Mutex<PSF2Font<'static>>> {
    SPLEEN
        .get_or_init(|| PSF2Font::new(FONT_12X24).ok().map(Mutex::new))
        .as_ref()
}

/// Fonts tried in order when no explicit font is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// The typeface shared by every font size of one render.
///
/// Cheap to clone; the outline face is reference counted.
#[derive(Clone, Default)]
pub struct FontLibrary {
    face: Option<FontArc>,
    source: Option<PathBuf>,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("source", &self.source)
            .field("outline", &self.face.is_some())
            .finish()
    }
}

impl FontLibrary {
    /// Bitmap face only. Deterministic on every machine.
    pub fn bitmap() -> Self {
        Self::default()
    }

    /// Load an outline face from a font file (face 0 of a collection).
    pub fn from_path(path: &Path) -> Result<Self, SlideError> {
        let data = std::fs::read(path)
            .map_err(|e| SlideError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
        let face = FontVec::try_from_vec_and_index(data, 0)
            .map_err(|e| SlideError::Font(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(Self {
            face: Some(FontArc::new(face)),
            source: Some(path.to_path_buf()),
        })
    }

    /// First loadable font from [`SYSTEM_FONT_PATHS`], else the bitmap face.
    pub fn discover() -> Self {
        for candidate in SYSTEM_FONT_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::from_path(path) {
                Ok(library) => {
                    debug!(font = %path.display(), "loaded system font");
                    return library;
                }
                Err(e) => warn!(error = %e, "skipping unusable system font"),
            }
        }
        warn!("no system font found, falling back to built-in bitmap font");
        Self::bitmap()
    }

    /// Explicit font when given (errors are fatal), discovery otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SlideError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => Ok(Self::discover()),
        }
    }

    /// True when an outline face was loaded.
    pub fn has_outline_face(&self) -> bool {
        self.face.is_some()
    }

    /// This typeface at `px` pixels.
    pub fn font(&self, px: f32) -> Font {
        Font {
            face: self.face.clone(),
            px,
        }
    }
}

/// Where a character's glyph comes from.
#[derive(Clone, Copy)]
enum GlyphSource {
    Outline(GlyphId),
    Bitmap,
}

/// A typeface at a fixed pixel size.
#[derive(Clone)]
pub struct Font {
    face: Option<FontArc>,
    px: f32,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("px", &self.px)
            .field("outline", &self.face.is_some())
            .finish()
    }
}

impl Font {
    /// Nominal pixel size.
    pub fn px(&self) -> f32 {
        self.px
    }

    fn bitmap_scale(&self) -> f32 {
        self.px / BITMAP_CELL_H as f32
    }

    fn source(&self, ch: char) -> GlyphSource {
        if let Some(face) = &self.face {
            let id = face.glyph_id(ch);
            if id.0 != 0 {
                return GlyphSource::Outline(id);
            }
        }
        GlyphSource::Bitmap
    }

    /// Horizontal advance of one character.
    pub fn advance(&self, ch: char) -> f32 {
        match (self.source(ch), &self.face) {
            (GlyphSource::Outline(id), Some(face)) => face.as_scaled(self.px).h_advance(id),
            _ => BITMAP_CELL_W as f32 * self.bitmap_scale(),
        }
    }

    /// Width of a single line of text.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> f32 {
        match &self.face {
            Some(face) => face.as_scaled(self.px).ascent(),
            None => self.px,
        }
    }

    /// Height of the line box.
    pub fn line_height(&self) -> f32 {
        match &self.face {
            Some(face) => {
                let scaled = face.as_scaled(self.px);
                scaled.ascent() - scaled.descent()
            }
            None => self.px,
        }
    }

    /// Rasterize one line of text.
    ///
    /// Calls `plot(x, y, coverage)` for every covered pixel, with coordinates
    /// relative to the top-left corner of the line box.
    pub fn rasterize(&self, text: &str, mut plot: impl FnMut(i32, i32, f32)) {
        let ascent = self.ascent();
        let bitmap_top = ((self.line_height() - self.px) / 2.0).max(0.0);
        let mut caret_x = 0.0f32;

        for ch in text.chars() {
            let advance = self.advance(ch);
            match (self.source(ch), &self.face) {
                (GlyphSource::Outline(id), Some(face)) => {
                    let glyph = id.with_scale_and_position(self.px, point(caret_x, ascent));
                    if let Some(outlined) = face.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            plot(
                                bounds.min.x as i32 + gx as i32,
                                bounds.min.y as i32 + gy as i32,
                                coverage,
                            );
                        });
                    }
                }
                _ => {
                    let cell = bitmap_glyph(ch);
                    draw_bitmap_cell(
                        cell.as_deref(),
                        caret_x,
                        bitmap_top,
                        self.bitmap_scale(),
                        &mut plot,
                    );
                }
            }
            caret_x += advance;
        }
    }
}

/// Look up a Spleen glyph as a 12x24 on/off grid.
fn bitmap_glyph(ch: char) -> Option<Vec<bool>> {
    let mut utf8 = [0u8; 4];
    let glyph = spleen()?
        .lock()
        .ok()?
        .glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes())?;
    let mut cell = vec![false; BITMAP_CELL_W * BITMAP_CELL_H];
    for (row_y, row) in glyph.enumerate() {
        for (col_x, on) in row.enumerate() {
            if row_y < BITMAP_CELL_H && col_x < BITMAP_CELL_W {
                cell[row_y * BITMAP_CELL_W + col_x] = on;
            }
        }
    }
    Some(cell)
}

/// Scale a bitmap cell to the font size. Unknown characters become a box.
fn draw_bitmap_cell(
    cell: Option<&[bool]>,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    plot: &mut impl FnMut(i32, i32, f32),
) {
    for row in 0..BITMAP_CELL_H {
        for col in 0..BITMAP_CELL_W {
            let on = match cell {
                Some(bits) => bits[row * BITMAP_CELL_W + col],
                None => {
                    row == 2 || row == BITMAP_CELL_H - 3 || col == 1 || col == BITMAP_CELL_W - 2
                }
            };
            if !on {
                continue;
            }
            let x0 = (origin_x + col as f32 * scale).floor() as i32;
            let x1 = ((origin_x + (col + 1) as f32 * scale).floor() as i32).max(x0 + 1);
            let y0 = (origin_y + row as f32 * scale).floor() as i32;
            let y1 = ((origin_y + (row + 1) as f32 * scale).floor() as i32).max(y0 + 1);
            for y in y0..y1 {
                for x in x0..x1 {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_advance_scales_with_size() {
        let fonts = FontLibrary::bitmap();
        assert_eq!(fonts.font(24.0).advance('A'), 12.0);
        assert_eq!(fonts.font(48.0).advance('A'), 24.0);
        assert_eq!(fonts.font(72.0).text_width("abc"), 108.0);
    }

    #[test]
    fn test_bitmap_line_height_is_pixel_size() {
        let font = FontLibrary::bitmap().font(36.0);
        assert_eq!(font.line_height(), 36.0);
        assert_eq!(font.ascent(), 36.0);
    }

    #[test]
    fn test_rasterize_plots_inside_measured_box() {
        let font = FontLibrary::bitmap().font(36.0);
        let text = "Hello";
        let width = font.text_width(text).ceil() as i32;
        let height = font.line_height().ceil() as i32;
        let mut plotted = 0;
        font.rasterize(text, |x, y, coverage| {
            assert!(x >= 0 && x < width, "x {} outside 0..{}", x, width);
            assert!(y >= 0 && y < height, "y {} outside 0..{}", y, height);
            assert!(coverage > 0.0);
            plotted += 1;
        });
        assert!(plotted > 0);
    }

    #[test]
    fn test_space_draws_nothing() {
        let font = FontLibrary::bitmap().font(24.0);
        let mut plotted = 0;
        font.rasterize("   ", |_, _, _| plotted += 1);
        assert_eq!(plotted, 0);
        assert_eq!(font.text_width("   "), 36.0);
    }

    #[test]
    fn test_unknown_glyph_draws_box_with_same_advance() {
        let font = FontLibrary::bitmap().font(24.0);
        let mut plotted = 0;
        font.rasterize("\u{10FFFD}", |_, _, _| plotted += 1);
        assert!(plotted > 0);
        assert_eq!(font.advance('\u{10FFFD}'), 12.0);
    }

    #[test]
    fn test_bitmap_face_is_parsed_once() {
        let first = spleen().map(|m| m as *const _);
        let second = spleen().map(|m| m as *const _);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(bitmap_glyph('A').is_some());
    }

    #[test]
    fn test_missing_font_file_is_error() {
        let result = FontLibrary::from_path(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(SlideError::Font(_))));
    }

    #[test]
    fn test_load_without_explicit_path_never_fails() {
        assert!(FontLibrary::load(None).is_ok());
    }
}
