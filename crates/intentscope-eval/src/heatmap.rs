//! Confusion matrix heat map
//!
//! Rows are true labels, columns predicted labels. Cell colour runs from
//! white to dark blue in proportion to the count; every cell is annotated
//! with its count, drawn in white once the count exceeds half of the
//! matrix maximum so it stays legible on dark cells. A colour bar to the
//! right of the grid shows the ramp from `0` to the maximum count.
//!
//! Text is drawn with a built-in 3x5 bitmap glyph set (lower-case ASCII,
//! digits and a little punctuation); other characters render as `?`.

use crate::metrics::ConfusionMatrix;
use image::{Rgb, RgbImage};
use intentscope_core::{Error, Result};
use std::path::Path;

const CELL: u32 = 44;
const SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;
const ADVANCE: u32 = (GLYPH_W + 1) * SCALE;
const PAD: u32 = 12;
const BAR_W: u32 = 16;

const TITLE: &str = "confusion matrix";
const X_AXIS: &str = "predicted";
const Y_AXIS: &str = "true";

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);
const LOW: [f64; 3] = [247.0, 251.0, 255.0];
const HIGH: [f64; 3] = [8.0, 48.0, 107.0];

/// Render `matrix` to an RGB image
pub fn render_heatmap(matrix: &ConfusionMatrix) -> RgbImage {
    let labels = matrix.universe().labels();
    let n = labels.len() as u32;
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let label_extent = longest * ADVANCE;
    let line = GLYPH_H * SCALE;

    let left = PAD + text_width(Y_AXIS).max(label_extent) + PAD;
    let top = PAD + line + PAD;
    let grid = n * CELL;
    let bottom = PAD + label_extent + PAD + line + PAD;

    let max = matrix.max();
    let max_label = max.to_string();
    let bar_x = left + grid + PAD;
    let bar_extent = PAD + BAR_W + PAD / 2 + text_width(&max_label) + PAD;

    let width = (left + grid + bar_extent).max(left + text_width(TITLE) + PAD);
    let height = top + grid + bottom;
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    draw_text(&mut img, left, PAD, TITLE, BLACK);
    draw_text(&mut img, PAD, top.saturating_sub(line + 2), Y_AXIS, BLACK);

    for (i, row) in matrix.rows().iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let x = left + j as u32 * CELL;
            let y = top + i as u32 * CELL;
            fill_rect(&mut img, x, y, CELL, CELL, cell_colour(count, max));
            outline_rect(&mut img, x, y, CELL, CELL, GRID);

            let text = count.to_string();
            let colour = annotation_colour(count, max);
            let tx = x + (CELL.saturating_sub(text_width(&text))) / 2;
            let ty = y + (CELL - line) / 2;
            draw_text(&mut img, tx, ty, &text, colour);
        }
    }

    for (i, label) in labels.iter().enumerate() {
        // row labels right-aligned against the grid
        let y = top + i as u32 * CELL + (CELL - line) / 2;
        let x = left - PAD / 2 - text_width(label);
        draw_text(&mut img, x, y, label, BLACK);

        // column labels run bottom-to-top under each column
        let x = left + i as u32 * CELL + (CELL - line) / 2;
        let y = top + grid + PAD / 2 + text_width(label);
        draw_text_vertical(&mut img, x, y, label, BLACK);
    }

    if grid > 0 {
        // top of the bar is the maximum, bottom is zero
        let span = u64::from(grid - 1);
        for dy in 0..grid {
            let colour = cell_colour(span - u64::from(dy), span);
            fill_rect(&mut img, bar_x, top + dy, BAR_W, 1, colour);
        }
        let tick_x = bar_x + BAR_W + PAD / 2;
        draw_text(&mut img, tick_x, top, &max_label, BLACK);
        draw_text(&mut img, tick_x, top + grid - line, "0", BLACK);
    }

    let x_axis_y = top + grid + PAD + label_extent + PAD;
    let x_axis_x = left + grid.saturating_sub(text_width(X_AXIS)) / 2;
    draw_text(&mut img, x_axis_x, x_axis_y, X_AXIS, BLACK);

    img
}

/// Render `matrix` and save it as PNG
pub fn save_heatmap(matrix: &ConfusionMatrix, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    render_heatmap(matrix)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::render(format!("failed to write {}: {}", path.display(), e)))
}

/// Linear white-to-blue ramp
pub fn cell_colour(count: u64, max: u64) -> Rgb<u8> {
    let t = if max == 0 { 0.0 } else { count as f64 / max as f64 };
    let channel = |k: usize| (LOW[k] + (HIGH[k] - LOW[k]) * t).round() as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

/// White on cells above half the maximum, black elsewhere
pub fn annotation_colour(count: u64, max: u64) -> Rgb<u8> {
    if count as f64 > max as f64 / 2.0 {
        WHITE
    } else {
        BLACK
    }
}

fn text_width(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        n * ADVANCE - SCALE
    }
}

fn put(img: &mut RgbImage, x: u32, y: u32, colour: Rgb<u8>) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, colour);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, colour: Rgb<u8>) {
    for dy in 0..h {
        for dx in 0..w {
            put(img, x + dx, y + dy, colour);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, colour: Rgb<u8>) {
    for d in 0..w {
        put(img, x + d, y, colour);
        put(img, x + d, y + h - 1, colour);
    }
    for d in 0..h {
        put(img, x, y + d, colour);
        put(img, x + w - 1, y + d, colour);
    }
}

/// Draw `text`; `origin` maps (char index, glyph x, glyph y) to image pixels
fn draw_text_with<F>(img: &mut RgbImage, text: &str, colour: Rgb<u8>, origin: F)
where
    F: Fn(u32, u32, u32) -> (u32, u32),
{
    for (i, c) in text.chars().enumerate() {
        let rows = glyph(c);
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..GLYPH_W {
                if bits & (0b100 >> gx) == 0 {
                    continue;
                }
                for sy in 0..SCALE {
                    for sx in 0..SCALE {
                        let (px, py) = origin(
                            i as u32,
                            gx * SCALE + sx,
                            gy as u32 * SCALE + sy,
                        );
                        put(img, px, py, colour);
                    }
                }
            }
        }
    }
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, colour: Rgb<u8>) {
    draw_text_with(img, text, colour, |i, gx, gy| (x + i * ADVANCE + gx, y + gy));
}

/// Rotated 90 degrees counter-clockwise; `(x, y)` is the bottom-left corner
fn draw_text_vertical(img: &mut RgbImage, x: u32, y: u32, text: &str, colour: Rgb<u8>) {
    draw_text_with(img, text, colour, |i, gx, gy| {
        (x + gy, y.saturating_sub(i * ADVANCE + gx))
    });
}

/// 3x5 glyph rows, most significant of the three bits is the left column
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_lowercase() {
        '0' => [7, 5, 5, 5, 7],
        '1' => [2, 6, 2, 2, 7],
        '2' => [7, 1, 7, 4, 7],
        '3' => [7, 1, 7, 1, 7],
        '4' => [5, 5, 7, 1, 1],
        '5' => [7, 4, 7, 1, 7],
        '6' => [7, 4, 7, 5, 7],
        '7' => [7, 1, 1, 1, 1],
        '8' => [7, 5, 7, 5, 7],
        '9' => [7, 5, 7, 1, 7],
        'a' => [2, 5, 7, 5, 5],
        'b' => [6, 5, 6, 5, 6],
        'c' => [3, 4, 4, 4, 3],
        'd' => [6, 5, 5, 5, 6],
        'e' => [7, 4, 6, 4, 7],
        'f' => [7, 4, 6, 4, 4],
        'g' => [3, 4, 5, 5, 3],
        'h' => [5, 5, 7, 5, 5],
        'i' => [7, 2, 2, 2, 7],
        'j' => [1, 1, 1, 5, 2],
        'k' => [5, 5, 6, 5, 5],
        'l' => [4, 4, 4, 4, 7],
        'm' => [5, 7, 7, 5, 5],
        'n' => [6, 5, 5, 5, 5],
        'o' => [2, 5, 5, 5, 2],
        'p' => [6, 5, 6, 4, 4],
        'q' => [2, 5, 5, 6, 3],
        'r' => [6, 5, 6, 5, 5],
        's' => [3, 4, 2, 1, 6],
        't' => [7, 2, 2, 2, 2],
        'u' => [5, 5, 5, 5, 7],
        'v' => [5, 5, 5, 5, 2],
        'w' => [5, 5, 7, 7, 5],
        'x' => [5, 5, 2, 5, 5],
        'y' => [5, 5, 2, 2, 2],
        'z' => [7, 1, 2, 4, 7],
        '_' => [0, 0, 0, 0, 7],
        '-' => [0, 0, 7, 0, 0],
        '.' => [0, 0, 0, 0, 2],
        ':' => [0, 2, 0, 2, 0],
        '/' => [1, 1, 2, 4, 4],
        '(' => [1, 2, 2, 2, 1],
        ')' => [4, 2, 2, 2, 4],
        ' ' => [0, 0, 0, 0, 0],
        _ => [7, 1, 2, 0, 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::evaluate;
    use intentscope_core::PredictionRecord;

    fn matrix() -> ConfusionMatrix {
        let records = vec![
            PredictionRecord::new("bar_chart", "bar_chart"),
            PredictionRecord::new("bar_chart", "bar_chart"),
            PredictionRecord::new("bar_chart", "bar_chart"),
            PredictionRecord::new("max_value", "min_value"),
        ];
        evaluate(&records).unwrap().matrix
    }

    #[test]
    fn test_colour_ramp_endpoints() {
        assert_eq!(cell_colour(0, 4), Rgb([247, 251, 255]));
        assert_eq!(cell_colour(4, 4), Rgb([8, 48, 107]));
        assert_eq!(cell_colour(0, 0), Rgb([247, 251, 255]));
    }

    #[test]
    fn test_annotation_threshold_is_half_max() {
        assert_eq!(annotation_colour(3, 4), WHITE);
        assert_eq!(annotation_colour(2, 4), BLACK);
        assert_eq!(annotation_colour(1, 3), BLACK);
        assert_eq!(annotation_colour(2, 3), WHITE);
    }

    #[test]
    fn test_render_fills_cells() {
        let m = matrix();
        let img = render_heatmap(&m);

        let labels = m.universe().labels();
        let longest = labels.iter().map(|l| l.len()).max().unwrap() as u32;
        let left = PAD + text_width(Y_AXIS).max(longest * ADVANCE) + PAD;
        let top = PAD + GLYPH_H * SCALE + PAD;

        // (bar_chart, bar_chart) holds the maximum: darkest colour near its corner
        assert_eq!(*img.get_pixel(left + 2, top + 2), Rgb([8, 48, 107]));
        // (bar_chart, max_value) is empty: lightest colour
        assert_eq!(*img.get_pixel(left + CELL + 2, top + 2), Rgb([247, 251, 255]));
        assert!(img.width() >= left + 3 * CELL);
    }

    #[test]
    fn test_colour_bar_spans_ramp() {
        let m = matrix();
        let img = render_heatmap(&m);

        let longest = m.universe().labels().iter().map(|l| l.len()).max().unwrap() as u32;
        let left = PAD + text_width(Y_AXIS).max(longest * ADVANCE) + PAD;
        let top = PAD + GLYPH_H * SCALE + PAD;
        let grid = 3 * CELL;
        let bar_x = left + grid + PAD + BAR_W / 2;

        assert_eq!(*img.get_pixel(bar_x, top), Rgb([8, 48, 107]));
        assert_eq!(*img.get_pixel(bar_x, top + grid - 1), Rgb([247, 251, 255]));
        // ticks for 0 and the maximum fit inside the image
        assert!(img.width() >= left + grid + PAD + BAR_W + PAD / 2 + text_width("3"));
    }

    #[test]
    fn test_empty_matrix_renders() {
        let img = render_heatmap(&evaluate(&[]).unwrap().matrix);
        assert!(img.width() > 0 && img.height() > 0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confusion_matrix.png");
        save_heatmap(&matrix(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
