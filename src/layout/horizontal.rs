//! Wide slide layout (1920×1080).
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Title                    │
//! │ ┌───────────────┐   text block           │
//! │ │ visual slot   │   text block           │
//! │ │ (image/map/   │   ┌──────┬──────┐      │
//! │ │  chart)       │   │ head │ head │      │
//! │ └───────────────┘   └──────┴──────┘      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Placement order is title, visual, text, table. Each step is optional. The
//! text column reclaims the full width when no visual is placed.

use image::{Rgba, RgbaImage};
use tracing::warn;

use super::{centered_x, draw_outlined_text, fit_within, resize_to};
use crate::json_api::TableData;
use crate::render::canvas::{Canvas, Rect, WHITE, rgba};
use crate::text::{Font, FontLibrary, wrap};

pub const WIDTH: u32 = 1920;
pub const HEIGHT: u32 = 1080;
pub const MARGIN: i32 = 80;

const TITLE_PX: f32 = 72.0;
const BODY_PX: f32 = 36.0;
const TABLE_PX: f32 = 24.0;

const TITLE_SHADOW: (i32, i32) = (3, 3);
const SHADOW_COLOR: Rgba<u8> = rgba(0, 0, 0, 128);

const VISUAL_PADDING: u32 = 20;
const VISUAL_BACKING: Rgba<u8> = rgba(240, 240, 240, 255);

const LINE_HEIGHT: i32 = 50;
const BLOCK_GAP: i32 = 30;

const TABLE_GAP: i32 = 30;
const ROW_HEIGHT: u32 = 50;
const CELL_TEXT_TOP: i32 = 12;
const HEADER_FILL: Rgba<u8> = rgba(50, 50, 50, 200);
const CELL_BORDER: Rgba<u8> = rgba(255, 255, 255, 128);

/// Layout state threaded through the horizontal placement steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalCursor {
    /// Next free y in the right column.
    pub current_y: i32,
    /// Top of the content area below the title.
    pub content_start_y: i32,
    /// Left edge of the right column.
    pub column_x: i32,
}

impl Default for HorizontalCursor {
    fn default() -> Self {
        Self {
            current_y: MARGIN,
            content_start_y: MARGIN,
            column_x: MARGIN,
        }
    }
}

/// Fonts for the wide slide.
#[derive(Debug, Clone)]
pub struct HorizontalLayout {
    title_font: Font,
    body_font: Font,
    table_font: Font,
}

impl HorizontalLayout {
    pub fn new(fonts: &FontLibrary) -> Self {
        Self {
            title_font: fonts.font(TITLE_PX),
            body_font: fonts.font(BODY_PX),
            table_font: fonts.font(TABLE_PX),
        }
    }

    /// Width of the left visual slot.
    pub fn left_width() -> u32 {
        (WIDTH - 3 * MARGIN as u32) / 2
    }

    /// Draw the centered title with a drop shadow.
    ///
    /// The content area starts one margin below the title.
    pub fn title(&self, canvas: &mut Canvas, cursor: HorizontalCursor, title: &str) -> HorizontalCursor {
        let font = &self.title_font;
        let max_width = (WIDTH as i32 - 2 * MARGIN) as f32;
        let lines = wrap(title, font, max_width, true);
        let line_h = font.line_height().ceil() as i32;

        let mut y = MARGIN;
        for line in &lines {
            let x = centered_x(font, line, 0, WIDTH);
            draw_outlined_text(canvas, font, (x, y), line, &[TITLE_SHADOW], SHADOW_COLOR);
            y += line_h;
        }

        let content_start_y = y + MARGIN;
        HorizontalCursor {
            current_y: content_start_y,
            content_start_y,
            ..cursor
        }
    }

    /// Place a visual in the left column over a light backing rectangle.
    ///
    /// Photos and maps are only ever shrunk; `upscale` lets an undersized
    /// chart grow to the slot. Moves the right column past the slot.
    pub fn visual(
        &self,
        canvas: &mut Canvas,
        cursor: HorizontalCursor,
        source: &RgbaImage,
        upscale: bool,
    ) -> HorizontalCursor {
        let slot_w = Self::left_width();
        let slot_h = (HEIGHT as i32 - cursor.content_start_y - MARGIN).max(0) as u32;
        let size = fit_within(source.dimensions(), (slot_w, slot_h), upscale);
        if size.0 == 0 || size.1 == 0 {
            warn!(slot_h, "no room for visual, skipping");
            return cursor;
        }

        let placed = Rect::new(MARGIN, cursor.content_start_y, size.0, size.1);
        canvas.fill_rect(placed.inflate(VISUAL_PADDING), VISUAL_BACKING);
        canvas.paste(&resize_to(source, size), placed.x, placed.y);

        HorizontalCursor {
            column_x: MARGIN + slot_w as i32 + MARGIN,
            ..cursor
        }
    }

    /// Draw text blocks down the right column.
    pub fn text_blocks(&self, canvas: &mut Canvas, cursor: HorizontalCursor, texts: &[&str]) -> HorizontalCursor {
        let font = &self.body_font;
        let max_width = (WIDTH as i32 - cursor.column_x - MARGIN).max(0) as f32;
        let mut y = cursor.current_y;

        for text in texts {
            for line in wrap(text, font, max_width, true) {
                canvas.draw_text(font, cursor.column_x, y, &line, WHITE);
                y += LINE_HEIGHT;
            }
            y += BLOCK_GAP;
        }

        HorizontalCursor {
            current_y: y,
            ..cursor
        }
    }

    /// Draw the table below the text in the right column.
    ///
    /// Columns split the column width equally. Rows have a fixed height; long
    /// cell text overflows its cell.
    pub fn table(&self, canvas: &mut Canvas, cursor: HorizontalCursor, table: &TableData) -> HorizontalCursor {
        let columns = table.column_count();
        if columns == 0 {
            warn!("table has no headers, skipping");
            return cursor;
        }
        let column_w = (WIDTH as i32 - cursor.column_x - MARGIN).max(0) as u32;
        let cell_w = column_w / columns as u32;
        let mut y = cursor.current_y + TABLE_GAP;

        let header: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        self.row(canvas, cursor.column_x, y, cell_w, &header, Some(HEADER_FILL));
        y += ROW_HEIGHT as i32;

        for cells in table.normalized_rows() {
            self.row(canvas, cursor.column_x, y, cell_w, &cells, None);
            y += ROW_HEIGHT as i32;
        }

        HorizontalCursor {
            current_y: y,
            ..cursor
        }
    }

    fn row(&self, canvas: &mut Canvas, left: i32, y: i32, cell_w: u32, cells: &[&str], fill: Option<Rgba<u8>>) {
        let font = &self.table_font;
        for (i, cell) in cells.iter().enumerate() {
            let rect = Rect::new(left + i as i32 * cell_w as i32, y, cell_w, ROW_HEIGHT);
            if let Some(fill) = fill {
                canvas.fill_rect(rect, fill);
            }
            canvas.stroke_rect(rect, CELL_BORDER, 1);
            let x = centered_x(font, cell, rect.x, cell_w);
            canvas.draw_text(font, x, y + CELL_TEXT_TOP, cell, WHITE);
        }
    }
}
