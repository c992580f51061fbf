//! 5x7 bitmap font for watermark text.
//!
//! Covers upper-case letters, digits, `_ - . :` and space; lower-case input
//! is drawn upper-case and anything else as a blank cell.

use image::GenericImage;

/// Glyph cell width in font pixels
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font pixels
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character in font pixels
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Rows of a glyph, top to bottom; bit 4 is the left-most column
pub fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

/// Rendered width of `text` in image pixels
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * ADVANCE - 1) * scale
}

/// Draw `text` with its baseline-left corner at `(x, baseline)`; clipped to the image
pub fn draw_text_mut<I: GenericImage>(
    image: &mut I,
    text: &str,
    x: i32,
    baseline: i32,
    scale: u32,
    color: I::Pixel,
) {
    let scale = scale.max(1) as i32;
    let (w, h) = image.dimensions();
    let top = baseline - GLYPH_HEIGHT as i32 * scale;

    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let left = x + i as i32 * ADVANCE as i32 * scale;
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..GLYPH_WIDTH as i32 {
                if bits & (0x10 >> gx) == 0 {
                    continue;
                }
                let px0 = left + gx * scale;
                let py0 = top + gy as i32 * scale;
                for py in py0..py0 + scale {
                    for px in px0..px0 + scale {
                        if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, GrayImage};

    #[test]
    fn test_glyph_coverage() {
        for c in "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-.: ".chars() {
            assert!(glyph(c).is_some(), "missing glyph {c:?}");
        }
        assert_eq!(glyph('e'), glyph('E'));
        assert!(glyph('#').is_none());
        assert!(glyph('A').unwrap().iter().all(|r| *r < 0x20));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 4), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("OK", 2), 22);
    }

    #[test]
    fn test_draw_text_sits_on_baseline() {
        let mut img = GrayImage::new(40, 20);
        draw_text_mut(&mut img, "L", 2, 15, 1, Luma([255]));
        // 'L' is a vertical stroke with a foot on the last row
        assert_eq!(img.get_pixel(2, 8)[0], 255);
        assert_eq!(img.get_pixel(2, 14)[0], 255);
        assert_eq!(img.get_pixel(6, 14)[0], 255);
        assert_eq!(img.get_pixel(2, 15)[0], 0);
        assert_eq!(img.get_pixel(2, 7)[0], 0);
    }

    #[test]
    fn test_draw_text_clips() {
        let mut img = GrayImage::new(8, 8);
        draw_text_mut(&mut img, "WIDE TEXT", -3, 4, 3, Luma([200]));
        assert!(img.pixels().any(|p| p[0] == 200));
    }
}
