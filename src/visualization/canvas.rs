//! In-memory RGB raster with the drawing primitives the charts need

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use palette::{Hsl, IntoColor, Srgb};

use super::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::error::Result;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
pub const AXIS: Rgb<u8> = Rgb([60, 60, 60]);

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (210.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            hsl_to_rgb(hue, 0.65, 0.5)
        })
        .collect()
}

pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb<u8> {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Rgb([
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// Drawing surface. Coordinates are signed and clipped to the image.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
        if x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64 {
            let px = self.image.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                let mixed = px.0[c] as f32 * (1.0 - alpha) + color.0[c] as f32 * alpha;
                px.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Fill the rectangle spanning both corners, inclusive.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.put(x, y, color);
            }
        }
    }

    /// Alpha-blend a filled rectangle over the existing pixels.
    pub fn blend_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.blend(x, y, color, alpha);
            }
        }
    }

    pub fn stroke_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        self.draw_line(x0, y0, x1, y0, color, 1);
        self.draw_line(x1, y0, x1, y1, color, 1);
        self.draw_line(x1, y1, x0, y1, color, 1);
        self.draw_line(x0, y1, x0, y0, color, 1);
    }

    /// Bresenham line with a square brush of `thickness` pixels.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, thickness: i64) {
        let half = (thickness.max(1) - 1) / 2;
        let extra = (thickness.max(1) - 1) - half;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            for by in -half..=extra {
                for bx in -half..=extra {
                    self.put(x + bx, y + by, color);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Dashed line: `dash` pixels drawn, then `dash` skipped, along the major axis.
    pub fn draw_dashed_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, dash: i64) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        let dash = dash.max(1);
        for i in 0..=steps {
            if (i / dash) % 2 == 0 {
                let x = x0 + (x1 - x0) * i / steps;
                let y = y0 + (y1 - y0) * i / steps;
                self.put(x, y, color);
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Rgb<u8>, scale: i64) {
        let scale = scale.max(1);
        for (i, c) in text.chars().enumerate() {
            let origin_x = x + i as i64 * GLYPH_ADVANCE * scale;
            let rows = font::glyph(c);
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (*bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        let px = origin_x + col * scale;
                        let py = y + row as i64 * scale;
                        self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
                    }
                }
            }
        }
    }

    /// Draw `text` horizontally centred on `cx`.
    pub fn draw_text_centered(&mut self, cx: i64, y: i64, text: &str, color: Rgb<u8>, scale: i64) {
        let width = font::text_width(text, scale);
        self.draw_text(cx - width / 2, y, text, color, scale);
    }

    pub fn text_height(scale: i64) -> i64 {
        GLYPH_HEIGHT * scale.max(1)
    }

    /// Serialize to PNG bytes without touching the filesystem.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::encode::is_png;

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.fill_rect(-5, -5, 2, 2, BLACK);
        assert_eq!(canvas.pixel(0, 0), BLACK);
        assert_eq!(canvas.pixel(2, 2), BLACK);
        assert_eq!(canvas.pixel(3, 3), WHITE);
    }

    #[test]
    fn test_blend_rect_mixes() {
        let mut canvas = Canvas::new(4, 4, WHITE);
        canvas.blend_rect(0, 0, 3, 3, BLACK, 0.5);
        let px = canvas.pixel(1, 1);
        assert!(px.0.iter().all(|&c| c == 128 || c == 127));
    }

    #[test]
    fn test_line_endpoints() {
        let mut canvas = Canvas::new(20, 20, WHITE);
        canvas.draw_line(1, 18, 18, 1, BLACK, 1);
        assert_eq!(canvas.pixel(1, 18), BLACK);
        assert_eq!(canvas.pixel(18, 1), BLACK);
        assert_eq!(canvas.pixel(10, 9), BLACK);
        assert_eq!(canvas.pixel(10, 10), WHITE);
    }

    #[test]
    fn test_text_draws_pixels() {
        let mut canvas = Canvas::new(20, 10, WHITE);
        canvas.draw_text(0, 0, "1", BLACK, 1);
        // Glyph '1' has its stem in the middle column
        assert_eq!(canvas.pixel(1, 0), BLACK);
        assert_eq!(canvas.pixel(0, 0), WHITE);
    }

    #[test]
    fn test_to_png_has_signature() {
        let canvas = Canvas::new(8, 8, WHITE);
        let bytes = canvas.to_png().unwrap();
        assert!(is_png(&bytes));
    }

    #[test]
    fn test_palette_distinct() {
        let colors = generate_palette(2);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
        assert!(generate_palette(0).is_empty());
    }
}
