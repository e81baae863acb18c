//! Frame
//!
//! CPU-side RGBA pixel buffer holding the whole window image. Each redraw
//! clears and repaints it; the renderer uploads it as a texture.

use image::RgbaImage;

use crate::theme::Color;

/// Cell width of the bitmap font at size 10, in glyph units.
const GLYPH_ADVANCE: f32 = 6.0;

pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0u8; buffer_len(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Replace the buffer with a blank one of the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Frame::new(width, height);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2], self.pixels[idx + 3]]
    }

    fn blend(&mut self, x: i32, y: i32, src: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let sa = src[3] as f32 / 255.0;

        if sa >= 1.0 {
            self.pixels[idx..idx + 3].copy_from_slice(&src[..3]);
            self.pixels[idx + 3] = 255;
        } else if sa > 0.0 {
            let da = 1.0 - sa;
            for c in 0..3 {
                self.pixels[idx + c] = (src[c] as f32 * sa + self.pixels[idx + c] as f32 * da) as u8;
            }
            self.pixels[idx + 3] = ((sa + self.pixels[idx + 3] as f32 / 255.0 * da) * 255.0) as u8;
        }
    }

    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Fill a rectangle, optionally with rounded corners.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, corner_radius: f32) {
        let x0 = x.max(0.0) as i32;
        let y0 = y.max(0.0) as i32;
        let x1 = ((x + w) as i32).min(self.width as i32);
        let y1 = ((y + h) as i32).min(self.height as i32);
        let cr = corner_radius.min(w / 2.0).min(h / 2.0);
        let rgba = color.to_rgba8();

        for py in y0..y1 {
            for px in x0..x1 {
                if cr > 0.5 && !inside_rounded(px as f32 - x, py as f32 - y, w, h, cr) {
                    continue;
                }
                self.blend(px, py, rgba);
            }
        }
    }

    /// One-pixel outline.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.fill_rect(x, y, w, 1.0, color, 0.0);
        self.fill_rect(x, y + h - 1.0, w, 1.0, color, 0.0);
        self.fill_rect(x, y, 1.0, h, color, 0.0);
        self.fill_rect(x + w - 1.0, y, 1.0, h, color, 0.0);
    }

    /// Alpha-blend an image with its top-left corner at (x, y), clipped to
    /// the frame.
    pub fn blit(&mut self, image: &RgbaImage, x: f32, y: f32) {
        let ox = x.round() as i32;
        let oy = y.round() as i32;
        for (ix, iy, px) in image.enumerate_pixels() {
            self.blend(ox + ix as i32, oy + iy as i32, px.0);
        }
    }

    /// Draw one line of bitmap text. Returns its width in pixels.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) -> f32 {
        let scale = glyph_scale(size);
        let rgba = color.to_rgba8();
        let mut cx = x;

        for ch in text.chars() {
            if let Some(bitmap) = glyph(ch) {
                for (row, bits) in bitmap.iter().enumerate() {
                    for col in 0..5 {
                        if bits & (1 << (4 - col)) == 0 {
                            continue;
                        }
                        let px0 = (cx + col as f32 * scale) as i32;
                        let py0 = (y + row as f32 * scale) as i32;
                        let px1 = (cx + (col + 1) as f32 * scale) as i32;
                        let py1 = (y + (row + 1) as f32 * scale) as i32;
                        for py in py0..py1 {
                            for px in px0..px1 {
                                self.blend(px, py, rgba);
                            }
                        }
                    }
                }
            }
            cx += GLYPH_ADVANCE * scale;
        }
        cx - x
    }
}

/// Bytes needed for an RGBA buffer, computed in `usize`.
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn inside_rounded(lx: f32, ly: f32, w: f32, h: f32, cr: f32) -> bool {
    let rx = w - lx;
    let ry = h - ly;
    let corner = |dx: f32, dy: f32| dx * dx + dy * dy <= cr * cr;
    if lx < cr && ly < cr {
        corner(cr - lx, cr - ly)
    } else if rx < cr && ly < cr {
        corner(cr - rx, cr - ly)
    } else if lx < cr && ry < cr {
        corner(cr - lx, cr - ry)
    } else if rx < cr && ry < cr {
        corner(cr - rx, cr - ry)
    } else {
        true
    }
}

fn glyph_scale(size: f32) -> f32 {
    (size / 10.0).max(0.5)
}

/// Width of a line of text at `size`.
pub fn measure(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_ADVANCE * glyph_scale(size)
}

/// Word-wrap text into lines no wider than `max_width`. Explicit newlines
/// are kept; words longer than a line are split.
pub fn wrap(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let per_line = ((max_width / (GLYPH_ADVANCE * glyph_scale(size))).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > per_line {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(per_line);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if line.is_empty() { word.len() } else { line.chars().count() + 1 + word.len() };
            if needed > per_line {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }
    lines
}

/// Minimal 5x7 bitmap font for basic ASCII
fn glyph(c: char) -> Option<[u8; 7]> {
    Some(match c {
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '"' => [0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '\'' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '*' => [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        '/' => [0b00001, 0b00010, 0b00100, 0b00100, 0b01000, 0b10000, 0b00000],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        ':' => [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000],
        ';' => [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b01000],
        '?' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100],
        'A' | 'a' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' | 'b' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' | 'c' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' | 'd' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' | 'e' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' | 'f' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' | 'g' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' | 'h' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' | 'i' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' | 'j' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' | 'k' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' | 'l' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' | 'm' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' | 'n' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' | 'o' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' | 'p' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' | 'q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' | 'r' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' | 's' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'T' | 't' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' | 'u' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' | 'v' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'W' | 'w' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' | 'x' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' | 'y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' | 'z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn clear_and_fill() {
        let mut frame = Frame::new(8, 8);
        frame.clear(Color::rgb(1, 2, 3));
        assert_eq!(frame.pixel(7, 7), [1, 2, 3, 255]);

        frame.fill_rect(2.0, 2.0, 3.0, 3.0, RED, 0.0);
        assert_eq!(frame.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(4, 4), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(5, 5), [1, 2, 3, 255]);
    }

    #[test]
    fn buffer_len_does_not_wrap_at_u32() {
        assert_eq!(buffer_len(40_000, 30_000), 4_800_000_000);
        assert_eq!(Frame::new(3, 2).pixels().len(), 24);
    }

    #[test]
    fn rounded_corners_skip_the_corner_pixel() {
        let mut frame = Frame::new(20, 20);
        frame.fill_rect(0.0, 0.0, 20.0, 20.0, RED, 6.0);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(10, 10), [255, 0, 0, 255]);
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut frame = Frame::new(4, 4);
        let image = RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255]));
        frame.blit(&image, 2.0, -1.0);
        assert_eq!(frame.pixel(2, 0), [0, 255, 0, 255]);
        assert_eq!(frame.pixel(3, 1), [0, 255, 0, 255]);
        assert_eq!(frame.pixel(1, 0), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn text_advances_by_cell() {
        let mut frame = Frame::new(100, 20);
        let width = frame.draw_text("Tarot", 0.0, 0.0, 10.0, RED);
        assert_eq!(width, 30.0);
        assert_eq!(measure("Tarot", 20.0), 60.0);
        // Top bar of the T.
        assert_eq!(frame.pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn wrap_respects_width_and_newlines() {
        // 60 px at size 10 fits ten characters.
        let lines = wrap("The Tower falls\nStar", 60.0, 10.0);
        assert_eq!(lines, vec!["The Tower", "falls", "Star"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap("abcdefghijkl", 30.0, 10.0);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn wrap_keeps_blank_lines() {
        let lines = wrap("a\n\nb", 60.0, 10.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }
}
