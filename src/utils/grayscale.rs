/// Luminance conversion
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
///
/// Rows are converted in parallel with rayon.
use crate::models::Frame;
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Blend a channel value over a white background
#[inline]
fn over_white(c: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Convert RGB to grayscale, one row per rayon task
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luma(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
        }
    });

    gray
}

/// Convert RGBA to grayscale after compositing over white
///
/// Transparent pixels become white so they never read as dark.
pub fn rgba_to_grayscale_on_white(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 4;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            let a = rgba[idx + 3];
            *out = luma(
                over_white(rgba[idx], a),
                over_white(rgba[idx + 1], a),
                over_white(rgba[idx + 2], a),
            );
        }
    });

    gray
}

/// Single-channel copy of a frame; empty for invalid frames
pub fn frame_to_grayscale(frame: &Frame) -> Vec<u8> {
    if !frame.is_valid() {
        return Vec::new();
    }
    let (w, h) = (frame.width(), frame.height());
    match frame.channels() {
        1 => frame.as_bytes().to_vec(),
        3 => rgb_to_grayscale(frame.as_bytes(), w, h),
        _ => rgba_to_grayscale_on_white(frame.as_bytes(), w, h),
    }
}

/// Smallest value in a grayscale buffer (255 when empty)
pub fn min_value(gray: &[u8]) -> u8 {
    gray.par_iter().copied().min().unwrap_or(u8::MAX)
}
