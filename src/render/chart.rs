//! Chart rendering for slide visuals.
//!
//! Renders bar, line, and pie charts into a transparent RGBA bitmap sized for
//! the slot it is placed in. Bar and line charts get axes, dashed grid lines
//! at round tick values, and labels. Pie charts get percentage labels and a
//! legend. Labels go through [`FontLibrary`], so CJK labels fall back per glyph
//! like the rest of the slide.

use image::Rgba;
use tracing::{debug, warn};

use crate::json_api::{ChartKind, GraphData, SlideFormat};
use crate::render::canvas::{Canvas, Rect, WHITE, rgba};
use crate::text::{Font, FontLibrary};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Chart bitmap size for the horizontal visual slot.
pub const HORIZONTAL_SIZE: (u32, u32) = (800, 600);
/// Chart bitmap size for the vertical chart card.
pub const VERTICAL_SIZE: (u32, u32) = (960, 360);

const LABEL_PX_HORIZONTAL: f32 = 20.0;
const LABEL_PX_VERTICAL: f32 = 18.0;

const LEFT_PAD: f32 = 8.0;
const TOP_PAD: f32 = 12.0;
const BOTTOM_PAD: f32 = 8.0;
const RIGHT_MARGIN: f32 = 16.0;
const Y_TICK_PAD: f32 = 8.0; // space between y label text and axis
const X_LABEL_GAP: f32 = 6.0; // space between axis and x labels
const X_LABEL_SPACING: f32 = 12.0;

const LINE_THICKNESS: f32 = 3.0;
const MARKER_RADIUS: f32 = 5.0;
const AXIS_THICKNESS: u32 = 2;
const GRID_DASH_ON: i32 = 6;
const GRID_DASH_OFF: i32 = 4;
const BAR_GAP_RATIO: f32 = 0.2;
const MIN_BAR_H: f32 = 1.0;

const PIE_PAD: f32 = 16.0;
const PIE_LABEL_RADIUS: f32 = 0.65;
const SLICE_BORDER: f32 = 2.0;
const LEGEND_SWATCH: u32 = 18;
const LEGEND_ROW_GAP: f32 = 10.0;

const INK: Rgba<u8> = rgba(40, 40, 40, 255);
const GRID: Rgba<u8> = rgba(0, 0, 0, 70);
const EMPTY_PIE: Rgba<u8> = rgba(200, 200, 200, 255);

/// Series colors, cycled for pie slices.
pub const SERIES_COLORS: [Rgba<u8>; 10] = [
    rgba(31, 119, 180, 255),
    rgba(255, 127, 14, 255),
    rgba(44, 160, 44, 255),
    rgba(214, 39, 40, 255),
    rgba(148, 103, 189, 255),
    rgba(140, 86, 75, 255),
    rgba(227, 119, 194, 255),
    rgba(127, 127, 127, 255),
    rgba(188, 189, 34, 255),
    rgba(23, 190, 207, 255),
];

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn draw_hline_dashed(canvas: &mut Canvas, x1: i32, x2: i32, y: i32, color: Rgba<u8>) {
    let period = GRID_DASH_ON + GRID_DASH_OFF;
    for x in x1..=x2 {
        if (x - x1) % period < GRID_DASH_ON {
            canvas.blend_pixel(x, y, color, 1.0);
        }
    }
}

fn draw_filled_circle(canvas: &mut Canvas, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let r_ceil = radius.ceil() as i32 + 1;
    let cxi = cx as i32;
    let cyi = cy as i32;

    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let dist = ((dx as f32 - (cx - cxi as f32)).powi(2)
                + (dy as f32 - (cy - cyi as f32)).powi(2))
            .sqrt();
            if dist <= radius {
                canvas.blend_pixel(cxi + dx, cyi + dy, color, 1.0);
            } else if dist <= radius + 1.0 {
                // Anti-alias edge
                canvas.blend_pixel(cxi + dx, cyi + dy, color, 1.0 - (dist - radius));
            }
        }
    }
}

fn draw_line_thick(
    canvas: &mut Canvas,
    (x1, y1): (f32, f32),
    (x2, y2): (f32, f32),
    thickness: f32,
    color: Rgba<u8>,
) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 0.001 {
        draw_filled_circle(canvas, x1, y1, thickness / 2.0, color);
        return;
    }

    let half_t = thickness / 2.0;

    // Bounding box
    let min_x = (x1.min(x2) - half_t - 1.0).max(0.0) as i32;
    let max_x = ((x1.max(x2) + half_t + 1.0) as i32).min(canvas.width() as i32 - 1);
    let min_y = (y1.min(y2) - half_t - 1.0).max(0.0) as i32;
    let max_y = ((y1.max(y2) + half_t + 1.0) as i32).min(canvas.height() as i32 - 1);

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let pxf = px as f32;
            let pyf = py as f32;

            // Project point onto line segment
            let t = (((pxf - x1) * dx + (pyf - y1) * dy) / (len * len)).clamp(0.0, 1.0);
            let closest_x = x1 + t * dx;
            let closest_y = y1 + t * dy;
            let dist = ((pxf - closest_x).powi(2) + (pyf - closest_y).powi(2)).sqrt();

            if dist <= half_t {
                canvas.blend_pixel(px, py, color, 1.0);
            } else if dist <= half_t + 1.0 {
                canvas.blend_pixel(px, py, color, 1.0 - (dist - half_t));
            }
        }
    }
}

// ============================================================================
// TEXT RENDERING
// ============================================================================

/// Draw `text` with its right edge at `right_x`, vertically centered on `center_y`.
fn draw_text_right(canvas: &mut Canvas, font: &Font, text: &str, right_x: f32, center_y: f32) {
    let x = right_x - font.text_width(text);
    let y = center_y - font.line_height() / 2.0;
    canvas.draw_text(font, x.round() as i32, y.round() as i32, text, INK);
}

/// Draw `text` horizontally centered on `center_x` with its top at `top_y`.
fn draw_text_centered(
    canvas: &mut Canvas,
    font: &Font,
    text: &str,
    center_x: f32,
    top_y: f32,
    color: Rgba<u8>,
) {
    let x = center_x - font.text_width(text) / 2.0;
    canvas.draw_text(font, x.round() as i32, top_y.round() as i32, text, color);
}

// ============================================================================
// NICE TICK GENERATION
// ============================================================================

fn nice_step(rough: f64) -> f64 {
    let exponent = rough.abs().log10().floor();
    let fraction = rough / 10.0f64.powf(exponent);
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10.0f64.powf(exponent)
}

fn compute_nice_ticks(min: f64, max: f64, target_count: usize) -> Vec<f64> {
    if (max - min).abs() < 1e-10 {
        return vec![min];
    }

    let range = max - min;
    let rough_step = range / target_count as f64;
    let step = nice_step(rough_step);

    let tick_min = (min / step).floor() * step;
    let tick_max = (max / step).ceil() * step;
    let count = ((tick_max - tick_min) / step).round();

    // Steps below the precision of the values (or an infinite range) cannot
    // be walked; fall back to the bare extent.
    if !step.is_finite()
        || step <= 0.0
        || !count.is_finite()
        || count < 1.0
        || count > (target_count * 4) as f64
        || tick_min + step == tick_min
    {
        return vec![min, max];
    }

    (0..=count as usize)
        .map(|i| tick_min + i as f64 * step)
        .collect()
}

fn format_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v as i64)
    } else if (v * 10.0 - (v * 10.0).round()).abs() < 1e-9 {
        format!("{:.1}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

// ============================================================================
// LAYOUT
// ============================================================================

struct Layout {
    /// Left edge of data area (after y-axis labels).
    data_left: f32,
    /// Right edge of data area.
    data_right: f32,
    /// Top edge of data area.
    data_top: f32,
    /// Bottom edge of data area.
    data_bottom: f32,
}

impl Layout {
    fn data_width(&self) -> f32 {
        (self.data_right - self.data_left).max(0.0)
    }

    fn data_height(&self) -> f32 {
        (self.data_bottom - self.data_top).max(0.0)
    }

    /// Pixel row of `v` on an axis spanning `y_min..=y_max`.
    fn value_to_y(&self, v: f64, y_min: f64, y_max: f64) -> f32 {
        let y_range = y_max - y_min;
        let normalized = if y_range.abs() < 1e-10 {
            0.5
        } else {
            (v - y_min) / y_range
        };
        self.data_bottom - normalized as f32 * self.data_height()
    }

    /// Horizontal center of each of `n` equal category slots.
    fn slot_centers(&self, n: usize) -> Vec<f32> {
        let slot_w = self.data_width() / n.max(1) as f32;
        (0..n)
            .map(|i| self.data_left + (i as f32 + 0.5) * slot_w)
            .collect()
    }
}

fn compute_layout(width: u32, height: u32, y_label_width: f32, font: &Font) -> Layout {
    let line_h = font.line_height();
    Layout {
        data_left: LEFT_PAD + y_label_width + Y_TICK_PAD,
        data_right: width as f32 - RIGHT_MARGIN,
        data_top: TOP_PAD + line_h / 2.0,
        data_bottom: height as f32 - (BOTTOM_PAD + line_h + X_LABEL_GAP),
    }
}

// ============================================================================
// CHART RENDERING
// ============================================================================

/// Chart bitmap size for a page format.
pub fn size_for(format: SlideFormat) -> (u32, u32) {
    match format {
        SlideFormat::Horizontal => HORIZONTAL_SIZE,
        SlideFormat::Vertical => VERTICAL_SIZE,
    }
}

fn label_px(format: SlideFormat) -> f32 {
    match format {
        SlideFormat::Horizontal => LABEL_PX_HORIZONTAL,
        SlideFormat::Vertical => LABEL_PX_VERTICAL,
    }
}

/// Render a chart to a transparent RGBA bitmap.
///
/// Returns `None` when there is nothing to plot (no value/label pairs), in
/// which case the chart is treated as absent.
pub fn render(graph: &GraphData, format: SlideFormat, fonts: &FontLibrary) -> Option<Canvas> {
    let points = graph.points();
    if points.is_empty() {
        debug!("chart has no data points, skipping");
        return None;
    }

    let (width, height) = size_for(format);
    let font = fonts.font(label_px(format));
    let mut canvas = Canvas::new(width, height);

    match graph.kind {
        ChartKind::Bar | ChartKind::Line => {
            draw_axis_chart(&mut canvas, graph.kind, &points, &font)
        }
        ChartKind::Pie => draw_pie_chart(&mut canvas, &points, &font),
    }

    Some(canvas)
}

fn draw_axis_chart(canvas: &mut Canvas, kind: ChartKind, points: &[(&str, f64)], font: &Font) {
    let values: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
    let mut v_min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut v_max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if kind == ChartKind::Bar {
        // Bars grow from zero.
        v_min = v_min.min(0.0);
        v_max = v_max.max(0.0);
    }
    let ticks = compute_nice_ticks(v_min, v_max, 5);
    let y_min = ticks.first().copied().unwrap_or(v_min);
    let y_max = ticks.last().copied().unwrap_or(v_max);

    let y_labels: Vec<String> = ticks.iter().map(|&v| format_number(v)).collect();
    let y_label_width = y_labels
        .iter()
        .map(|l| font.text_width(l))
        .fold(0.0, f32::max);
    let layout = compute_layout(canvas.width(), canvas.height(), y_label_width, font);

    // Y-axis grid lines and labels
    for (&tick, label) in ticks.iter().zip(y_labels.iter()) {
        let py = layout.value_to_y(tick, y_min, y_max);
        draw_hline_dashed(
            canvas,
            layout.data_left as i32,
            layout.data_right as i32,
            py.round() as i32,
            GRID,
        );
        draw_text_right(canvas, font, label, layout.data_left - Y_TICK_PAD, py);
    }

    // Axes
    let baseline = if kind == ChartKind::Bar {
        layout.value_to_y(0.0, y_min, y_max)
    } else {
        layout.data_bottom
    };
    canvas.fill_rect(
        Rect::new(
            layout.data_left as i32 - AXIS_THICKNESS as i32,
            layout.data_top as i32,
            AXIS_THICKNESS,
            layout.data_height() as u32 + AXIS_THICKNESS,
        ),
        INK,
    );
    canvas.fill_rect(
        Rect::new(
            layout.data_left as i32,
            baseline.round() as i32,
            layout.data_width() as u32,
            AXIS_THICKNESS,
        ),
        INK,
    );

    let centers = layout.slot_centers(points.len());
    draw_x_labels(canvas, font, points, &centers, &layout);

    match kind {
        ChartKind::Line => draw_line_style(canvas, &values, &centers, y_min, y_max, &layout),
        _ => draw_bar_style(canvas, &values, &centers, y_min, y_max, baseline, &layout),
    }
}

fn draw_x_labels(
    canvas: &mut Canvas,
    font: &Font,
    points: &[(&str, f64)],
    centers: &[f32],
    layout: &Layout,
) {
    // Determine how many labels fit without overlap
    let max_label_w = points
        .iter()
        .map(|(label, _)| font.text_width(label))
        .fold(0.0, f32::max);
    let label_pixel_width = max_label_w + X_LABEL_SPACING;
    let max_labels = ((layout.data_width() / label_pixel_width) as usize).max(1);
    let count = points.len();
    let step = if count > max_labels {
        count.div_ceil(max_labels)
    } else {
        1
    };

    let label_y = layout.data_bottom + AXIS_THICKNESS as f32 + X_LABEL_GAP;
    let canvas_w = canvas.width() as f32;
    for i in (0..count).step_by(step) {
        let label = points[i].0;
        // Clamp so label text doesn't overflow canvas edges
        let half_w = font.text_width(label) / 2.0;
        let center = centers[i].max(half_w).min(canvas_w - half_w);
        draw_text_centered(canvas, font, label, center, label_y, INK);
    }
}

// ============================================================================
// STYLE RENDERERS
// ============================================================================

fn draw_line_style(
    canvas: &mut Canvas,
    values: &[f64],
    centers: &[f32],
    y_min: f64,
    y_max: f64,
    layout: &Layout,
) {
    let color = SERIES_COLORS[0];
    let points: Vec<(f32, f32)> = values
        .iter()
        .zip(centers)
        .map(|(&v, &x)| (x, layout.value_to_y(v, y_min, y_max)))
        .collect();
    // Lines
    for pair in points.windows(2) {
        draw_line_thick(canvas, pair[0], pair[1], LINE_THICKNESS, color);
    }
    // Markers
    for &(x, y) in &points {
        draw_filled_circle(canvas, x, y, MARKER_RADIUS, color);
    }
}

fn draw_bar_style(
    canvas: &mut Canvas,
    values: &[f64],
    centers: &[f32],
    y_min: f64,
    y_max: f64,
    baseline: f32,
    layout: &Layout,
) {
    let slot_w = layout.data_width() / values.len().max(1) as f32;
    let bar_w = (slot_w * (1.0 - BAR_GAP_RATIO)).max(1.0);

    for (&v, &center) in values.iter().zip(centers) {
        let value_y = layout.value_to_y(v, y_min, y_max);
        let mut top = value_y.min(baseline);
        let bottom = value_y.max(baseline);
        if bottom - top < MIN_BAR_H {
            top = bottom - MIN_BAR_H;
        }
        let left = (center - bar_w / 2.0).round() as i32;
        canvas.fill_rect(
            Rect::new(
                left,
                top.round() as i32,
                bar_w.round() as u32,
                (bottom - top).round().max(MIN_BAR_H) as u32,
            ),
            SERIES_COLORS[0],
        );
    }
}

/// Center and radius of the pie on a `width`×`height` chart.
pub fn pie_geometry(width: u32, height: u32) -> (f32, f32, f32) {
    let radius = ((height as f32).min(width as f32 * 0.55) / 2.0 - PIE_PAD).max(1.0);
    let cx = (width as f32 * 0.35).max(radius + PIE_PAD);
    let cy = height as f32 / 2.0;
    (cx, cy, radius)
}

/// Angle of `(dx, dy)` measured clockwise from 12 o'clock, in `0..TAU`.
fn clockwise_angle(dx: f32, dy: f32) -> f32 {
    let theta = dx.atan2(-dy);
    if theta < 0.0 {
        theta + std::f32::consts::TAU
    } else {
        theta
    }
}

fn draw_pie_chart(canvas: &mut Canvas, points: &[(&str, f64)], font: &Font) {
    let (cx, cy, radius) = pie_geometry(canvas.width(), canvas.height());

    if points.iter().any(|&(_, v)| v < 0.0) {
        warn!("negative pie values are drawn as empty slices");
    }
    let values: Vec<f64> = points.iter().map(|&(_, v)| v.max(0.0)).collect();
    let total: f64 = values.iter().sum();

    if total <= 0.0 {
        draw_filled_circle(canvas, cx, cy, radius, EMPTY_PIE);
    } else {
        // Cumulative slice boundaries as fractions of a turn
        let mut bounds = Vec::with_capacity(values.len() + 1);
        let mut acc = 0.0;
        bounds.push(0.0);
        for v in &values {
            acc += v / total;
            bounds.push(acc);
        }

        draw_slices(canvas, cx, cy, radius, &bounds);

        let nonzero = values.iter().filter(|&&v| v > 0.0).count();
        if nonzero > 1 {
            for &b in &bounds[..bounds.len() - 1] {
                let angle = b as f32 * std::f32::consts::TAU;
                let edge = (cx + radius * angle.sin(), cy - radius * angle.cos());
                draw_line_thick(canvas, (cx, cy), edge, SLICE_BORDER, WHITE);
            }
        }

        // Percentage labels at the middle of each slice
        for (i, &v) in values.iter().enumerate() {
            if v <= 0.0 {
                continue;
            }
            let mid = ((bounds[i] + bounds[i + 1]) / 2.0) as f32 * std::f32::consts::TAU;
            let lx = cx + radius * PIE_LABEL_RADIUS * mid.sin();
            let ly = cy - radius * PIE_LABEL_RADIUS * mid.cos();
            let top = ly - font.line_height() / 2.0;
            draw_text_centered(canvas, font, &format_percent(v / total), lx, top, WHITE);
        }
    }

    draw_legend(canvas, points, font, cx + radius + PIE_PAD * 2.0, cy);
}

fn draw_slices(canvas: &mut Canvas, cx: f32, cy: f32, radius: f32, bounds: &[f64]) {
    let slice_count = bounds.len() - 1;
    let r_ceil = radius.ceil() as i32 + 1;
    let cxi = cx as i32;
    let cyi = cy as i32;

    for py in cyi - r_ceil..=cyi + r_ceil {
        for px in cxi - r_ceil..=cxi + r_ceil {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let coverage = if dist <= radius {
                1.0
            } else if dist <= radius + 1.0 {
                1.0 - (dist - radius)
            } else {
                continue;
            };
            let turn = (clockwise_angle(dx, dy) / std::f32::consts::TAU) as f64;
            let slice = bounds
                .partition_point(|&b| b <= turn)
                .saturating_sub(1)
                .min(slice_count - 1);
            let color = SERIES_COLORS[slice % SERIES_COLORS.len()];
            canvas.blend_pixel(px, py, color, coverage);
        }
    }
}

fn draw_legend(canvas: &mut Canvas, points: &[(&str, f64)], font: &Font, left: f32, center_y: f32) {
    let row_h = font.line_height().max(LEGEND_SWATCH as f32) + LEGEND_ROW_GAP;
    let total_h = row_h * points.len() as f32 - LEGEND_ROW_GAP;
    let mut y = center_y - total_h / 2.0;

    for (i, (label, _)) in points.iter().enumerate() {
        let row_center = y + (row_h - LEGEND_ROW_GAP) / 2.0;
        canvas.fill_rect(
            Rect::new(
                left.round() as i32,
                (row_center - LEGEND_SWATCH as f32 / 2.0).round() as i32,
                LEGEND_SWATCH,
                LEGEND_SWATCH,
            ),
            SERIES_COLORS[i % SERIES_COLORS.len()],
        );
        let text_x = left + LEGEND_SWATCH as f32 + 10.0;
        let text_y = row_center - font.line_height() / 2.0;
        canvas.draw_text(
            font,
            text_x.round() as i32,
            text_y.round() as i32,
            label,
            INK,
        );
        y += row_h;
    }
}

// ============================================================================
// TESTS
// ============================================================================
