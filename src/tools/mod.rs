use crate::error::{LoadError, SaveError};
use crate::models::Frame;
use crate::utils::grayscale::frame_to_grayscale;
use image::{ColorType, DynamicImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image file as a frame, keeping luma, RGB or RGBA layout.
///
/// The bytes are read first and decoded from memory, so the decoder never
/// sees the path itself.
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(LoadError::Unsupported {
            path: path.to_path_buf(),
            reason: "image has no pixels".to_string(),
        });
    }
    Ok(frame_from_dynamic(img))
}

/// Convert a decoded image into the closest 8-bit frame layout.
pub fn frame_from_dynamic(img: DynamicImage) -> Frame {
    match img {
        DynamicImage::ImageLuma8(gray) => Frame::from_gray_image(&gray),
        DynamicImage::ImageRgb8(rgb) => Frame::from_rgb_image(&rgb),
        DynamicImage::ImageRgba8(rgba) => Frame::from_rgba_image(&rgba),
        other @ DynamicImage::ImageLuma16(_) => Frame::from_gray_image(&other.to_luma8()),
        other if other.color().has_alpha() => Frame::from_rgba_image(&other.to_rgba8()),
        other => Frame::from_rgb_image(&other.to_rgb8()),
    }
}

/// Write a frame; the format follows the file extension.
pub fn save_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<(), SaveError> {
    let path = path.as_ref();
    let color = match frame.channels() {
        1 => ColorType::L8,
        3 => ColorType::Rgb8,
        _ => ColorType::Rgba8,
    };
    if !frame.is_valid() {
        return Err(SaveError::InvalidFrame {
            width: frame.width(),
            height: frame.height(),
            channels: frame.channels(),
        });
    }
    image::save_buffer(
        path,
        frame.as_bytes(),
        frame.width() as u32,
        frame.height() as u32,
        color,
    )
    .map_err(|source| SaveError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Summary statistics for the luma of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg of a frame's luma (all zero for invalid frames).
pub fn frame_stats(frame: &Frame) -> GrayStats {
    let gray = frame_to_grayscale(frame);
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in &gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Image files under `root`, recursively, sorted by path.
pub fn collect_images<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff") {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    images
}

/// Single-channel frame with a filled disk of value `pupil` on `background`.
pub fn synthetic_disk(
    width: usize,
    height: usize,
    cx: f32,
    cy: f32,
    radius: f32,
    pupil: u8,
    background: u8,
) -> Frame {
    let mut data = vec![background; width * height];
    paint_disk(&mut data, width, height, 1, cx, cy, radius, pupil);
    Frame::new(width, height, 1, data)
}

/// Copy of `frame` with a filled disk of `value` (a specular highlight).
pub fn with_highlight(frame: &Frame, cx: f32, cy: f32, radius: f32, value: u8) -> Frame {
    let mut data = frame.as_bytes().to_vec();
    if frame.is_valid() {
        paint_disk(
            &mut data,
            frame.width(),
            frame.height(),
            frame.channels(),
            cx,
            cy,
            radius,
            value,
        );
    }
    Frame::new(frame.width(), frame.height(), frame.channels(), data)
}

/// Copy of `frame` with the rectangle `[x0, x1) x [y0, y1)` filled with `value`.
pub fn with_bar(frame: &Frame, x0: usize, y0: usize, x1: usize, y1: usize, value: u8) -> Frame {
    let mut data = frame.as_bytes().to_vec();
    if frame.is_valid() {
        let (w, c) = (frame.width(), frame.channels());
        for y in y0.min(frame.height())..y1.min(frame.height()) {
            for x in x0.min(w)..x1.min(w) {
                let idx = (y * w + x) * c;
                data[idx..idx + c].fill(value);
            }
        }
    }
    Frame::new(frame.width(), frame.height(), frame.channels(), data)
}

/// RGB eye-like test image: sclera, iris ring, pupil and a small highlight.
pub fn synthetic_eye(width: usize, height: usize, pupil_radius: f32) -> Frame {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let mut data = vec![225u8; width * height * 3];
    paint_disk(&mut data, width, height, 3, cx, cy, pupil_radius * 2.2, 120);
    paint_disk(&mut data, width, height, 3, cx, cy, pupil_radius, 25);
    paint_disk(
        &mut data,
        width,
        height,
        3,
        cx - pupil_radius * 0.4,
        cy - pupil_radius * 0.4,
        (pupil_radius * 0.12).max(1.0),
        250,
    );
    Frame::new(width, height, 3, data)
}

#[allow(clippy::too_many_arguments)]
fn paint_disk(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    cx: f32,
    cy: f32,
    radius: f32,
    value: u8,
) {
    if width == 0 || height == 0 {
        return;
    }
    let r2 = radius * radius;
    let y_lo = (cy - radius).floor().max(0.0) as usize;
    let y_hi = ((cy + radius).ceil().max(0.0) as usize).min(height.saturating_sub(1));
    let x_lo = (cx - radius).floor().max(0.0) as usize;
    let x_hi = ((cx + radius).ceil().max(0.0) as usize).min(width.saturating_sub(1));
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r2 {
                let idx = (y * width + x) * channels;
                data[idx..idx + channels].fill(value);
            }
        }
    }
}
