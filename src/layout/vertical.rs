//! Story layout (1080×1920).
//!
//! Content is stacked top to bottom as cards: title overlay, chart card, one
//! card per text block, table card. Cards are dark and translucent so white
//! text stays legible over any background; the chart card is light. Content
//! that runs past the bottom edge is clipped.

use image::{Rgba, RgbaImage};
use tracing::warn;

use super::{centered_x, draw_outlined_text, fit_within, resize_to};
use crate::json_api::TableData;
use crate::render::canvas::{BLACK, Canvas, Rect, WHITE, rgba};
use crate::text::{Font, FontLibrary, wrap};

pub const WIDTH: u32 = 1080;
pub const HEIGHT: u32 = 1920;

/// First y below the device notch.
pub const TOP_SAFE_AREA: i32 = 100;
const MARGIN: i32 = 60;
const CARD_MARGIN: i32 = 40;
const CARD_WIDTH: u32 = WIDTH - 2 * CARD_MARGIN as u32;
const CARD_PADDING: i32 = 30;
const CARD_GAP: i32 = 30;
const CARD_BORDER: u32 = 3;
const CARD_OVER_PHOTO: Rgba<u8> = rgba(0, 0, 0, 240);
const CARD_OVER_GRADIENT: Rgba<u8> = rgba(0, 0, 0, 200);

const TITLE_PX: f32 = 140.0;
const BODY_PX: f32 = 50.0;
const TABLE_PX: f32 = 36.0;

const TITLE_LINE_HEIGHT: i32 = 160;
const TITLE_LINE_TRIM: i32 = 20;
const TITLE_PADDING: i32 = 40;
const TITLE_GAP: i32 = 40;
const TITLE_OUTLINE: [(i32, i32); 8] = [
    (-2, -2),
    (-2, 2),
    (2, -2),
    (2, 2),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
];
const TITLE_SHADOW: (i32, i32) = (4, 4);
const TITLE_SHADOW_COLOR: Rgba<u8> = rgba(0, 0, 0, 180);

const CHART_CARD_HEIGHT: u32 = 400;
const CHART_CARD_FILL: Rgba<u8> = rgba(255, 255, 255, 240);
const CHART_INSET: u32 = 40;
const CHART_GAP: i32 = 40;

const TEXT_LINE_HEIGHT: i32 = 60;
const TEXT_OUTLINE: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const ROW_HEIGHT: u32 = 60;
const CELL_TEXT_TOP: i32 = 15;
const HEADER_FILL: Rgba<u8> = rgba(255, 255, 255, 40);
const HEADER_BORDER: Rgba<u8> = rgba(255, 255, 255, 100);
const BODY_BORDER: Rgba<u8> = rgba(255, 255, 255, 60);

/// Layout state threaded through the vertical placement steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalCursor {
    /// Next free y below the last card.
    pub current_y: i32,
}

impl Default for VerticalCursor {
    fn default() -> Self {
        Self {
            current_y: TOP_SAFE_AREA,
        }
    }
}

/// Fonts and card styling for the story format.
#[derive(Debug, Clone)]
pub struct VerticalLayout {
    title_font: Font,
    body_font: Font,
    table_font: Font,
    has_image_background: bool,
}

impl VerticalLayout {
    /// `has_image_background` selects the more opaque card fill used over photos.
    pub fn new(fonts: &FontLibrary, has_image_background: bool) -> Self {
        Self {
            title_font: fonts.font(TITLE_PX),
            body_font: fonts.font(BODY_PX),
            table_font: fonts.font(TABLE_PX),
            has_image_background,
        }
    }

    /// Dark translucent card with a white border.
    pub fn glass_rect(&self, canvas: &mut Canvas, rect: Rect) {
        let fill = if self.has_image_background {
            CARD_OVER_PHOTO
        } else {
            CARD_OVER_GRADIENT
        };
        canvas.fill_rect(rect, fill);
        canvas.stroke_rect(rect, WHITE, CARD_BORDER);
    }

    /// Wrapped, centered title on a glass card.
    ///
    /// Each line is drawn as a black outline, then a drop shadow, then white.
    pub fn title_overlay(&self, canvas: &mut Canvas, cursor: VerticalCursor, title: &str) -> VerticalCursor {
        let font = &self.title_font;
        let max_width = (WIDTH as i32 - 2 * MARGIN) as f32;
        let lines = wrap(title, font, max_width, true);
        let total_h = lines.len() as i32 * TITLE_LINE_HEIGHT - TITLE_LINE_TRIM;

        let y = cursor.current_y;
        let card_left = MARGIN - TITLE_PADDING;
        self.glass_rect(
            canvas,
            Rect::new(
                card_left,
                y - TITLE_PADDING,
                (WIDTH as i32 - 2 * card_left) as u32,
                (total_h + 2 * TITLE_PADDING).max(0) as u32,
            ),
        );

        let mut text_y = y;
        for line in &lines {
            let x = centered_x(font, line, 0, WIDTH);
            for (dx, dy) in TITLE_OUTLINE {
                canvas.draw_text(font, x + dx, text_y + dy, line, BLACK);
            }
            draw_outlined_text(canvas, font, (x, text_y), line, &[TITLE_SHADOW], TITLE_SHADOW_COLOR);
            text_y += TITLE_LINE_HEIGHT;
        }

        VerticalCursor {
            current_y: y + total_h + 2 * TITLE_PADDING + TITLE_GAP,
        }
    }

    /// Light card with the chart scaled to fit inside and centered.
    pub fn chart_card(&self, canvas: &mut Canvas, cursor: VerticalCursor, chart: &RgbaImage) -> VerticalCursor {
        let card = Rect::new(CARD_MARGIN, cursor.current_y, CARD_WIDTH, CHART_CARD_HEIGHT);
        canvas.fill_rect(card, CHART_CARD_FILL);
        canvas.stroke_rect(card, WHITE, CARD_BORDER);

        let bounds = (CARD_WIDTH - CHART_INSET, CHART_CARD_HEIGHT - CHART_INSET);
        let size = fit_within(chart.dimensions(), bounds, true);
        if size.0 > 0 && size.1 > 0 {
            let x = card.x + (CARD_WIDTH - size.0) as i32 / 2;
            let y = card.y + (CHART_CARD_HEIGHT - size.1) as i32 / 2;
            canvas.paste(&resize_to(chart, size), x, y);
        }

        VerticalCursor {
            current_y: card.bottom() + CHART_GAP,
        }
    }

    /// One glass card per text block, sized to its wrapped line count.
    pub fn text_cards(&self, canvas: &mut Canvas, cursor: VerticalCursor, texts: &[&str]) -> VerticalCursor {
        let font = &self.body_font;
        let text_width = (CARD_WIDTH as i32 - 2 * CARD_PADDING) as f32;
        let mut y = cursor.current_y;

        for text in texts {
            let lines = wrap(text, font, text_width, true);
            let card_h = lines.len() as u32 * TEXT_LINE_HEIGHT as u32 + 2 * CARD_PADDING as u32;
            self.glass_rect(canvas, Rect::new(CARD_MARGIN, y, CARD_WIDTH, card_h));

            let x = CARD_MARGIN + CARD_PADDING;
            let mut text_y = y + CARD_PADDING;
            for line in &lines {
                draw_outlined_text(canvas, font, (x, text_y), line, &TEXT_OUTLINE, BLACK);
                text_y += TEXT_LINE_HEIGHT;
            }

            y += card_h as i32 + CARD_GAP;
        }

        VerticalCursor { current_y: y }
    }

    /// Glass card holding the whole table. The header row gets a light tint.
    pub fn table_card(&self, canvas: &mut Canvas, cursor: VerticalCursor, table: &TableData) -> VerticalCursor {
        let columns = table.column_count();
        if columns == 0 {
            warn!("table has no headers, skipping");
            return cursor;
        }
        let rows = table.normalized_rows();
        let card_h = (rows.len() as u32 + 1) * ROW_HEIGHT + 2 * CARD_PADDING as u32;
        let card = Rect::new(CARD_MARGIN, cursor.current_y, CARD_WIDTH, card_h);
        self.glass_rect(canvas, card);

        let table_x = card.x + CARD_PADDING;
        let cell_w = (CARD_WIDTH - 2 * CARD_PADDING as u32) / columns as u32;
        let mut y = card.y + CARD_PADDING;

        let header: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        self.row(canvas, table_x, y, cell_w, &header, Some(HEADER_FILL), HEADER_BORDER);
        y += ROW_HEIGHT as i32;
        for cells in &rows {
            self.row(canvas, table_x, y, cell_w, cells, None, BODY_BORDER);
            y += ROW_HEIGHT as i32;
        }

        VerticalCursor {
            current_y: card.bottom() + CARD_GAP,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        &self,
        canvas: &mut Canvas,
        left: i32,
        y: i32,
        cell_w: u32,
        cells: &[&str],
        fill: Option<Rgba<u8>>,
        border: Rgba<u8>,
    ) {
        let font = &self.table_font;
        for (i, cell) in cells.iter().enumerate() {
            let rect = Rect::new(left + i as i32 * cell_w as i32, y, cell_w, ROW_HEIGHT);
            if let Some(fill) = fill {
                canvas.fill_rect(rect, fill);
            }
            canvas.stroke_rect(rect, border, 1);
            let x = centered_x(font, cell, rect.x, cell_w);
            canvas.draw_text(font, x, y + CELL_TEXT_TOP, cell, WHITE);
        }
    }
}
