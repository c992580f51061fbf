/// Area-averaging downscale for grayscale buffers
///
/// Every destination pixel is the coverage-weighted mean of the source
/// pixels under its footprint, so thin dark structures fade instead of
/// aliasing. Works for non-integer ratios; upscaling is not supported.
use rayon::prelude::*;

/// Result of fitting an image inside a working-resolution ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct Downscaled {
    /// Resized pixels (or a copy of the input when no resize was needed)
    pub gray: Vec<u8>,
    /// Width after resizing
    pub width: usize,
    /// Height after resizing
    pub height: usize,
    /// Multiply working coordinates by this to get original coordinates
    pub scale: f32,
}

/// Shrink so that the longer side is at most `max_dim`
pub fn fit_within(gray: &[u8], width: usize, height: usize, max_dim: usize) -> Downscaled {
    let longest = width.max(height);
    if max_dim == 0 || longest <= max_dim {
        return Downscaled {
            gray: gray.to_vec(),
            width,
            height,
            scale: 1.0,
        };
    }

    let scale = longest as f64 / max_dim as f64;
    let new_w = ((width as f64 / scale).round() as usize).max(1);
    let new_h = ((height as f64 / scale).round() as usize).max(1);

    Downscaled {
        gray: resize_area(gray, width, height, new_w, new_h),
        width: new_w,
        height: new_h,
        scale: scale as f32,
    }
}

/// Source contributions for every destination index along one axis
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = ((d + 1) as f64 * ratio).min(src_len as f64);
            let mut taps = Vec::with_capacity(ratio.ceil() as usize + 1);
            let mut s = start.floor() as usize;
            while (s as f64) < end && s < src_len {
                let lo = start.max(s as f64);
                let hi = end.min((s + 1) as f64);
                if hi > lo {
                    taps.push((s, ((hi - lo) / ratio) as f32));
                }
                s += 1;
            }
            taps
        })
        .collect()
}

/// Resize with area averaging (separable: rows first, then columns)
pub fn resize_area(gray: &[u8], width: usize, height: usize, new_w: usize, new_h: usize) -> Vec<u8> {
    if new_w == 0 || new_h == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let x_taps = area_weights(width, new_w);
    let y_taps = area_weights(height, new_h);

    // Horizontal pass keeps full height
    let mut horizontal = vec![0.0f32; new_w * height];
    horizontal
        .par_chunks_mut(new_w)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &gray[y * width..(y + 1) * width];
            for (x, out) in row.iter_mut().enumerate() {
                *out = x_taps[x].iter().map(|&(s, w)| src[s] as f32 * w).sum();
            }
        });

    let mut result = vec![0u8; new_w * new_h];
    result.par_chunks_mut(new_w).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let v: f32 = y_taps[y]
                .iter()
                .map(|&(s, w)| horizontal[s * new_w + x] * w)
                .sum();
            *out = v.round().clamp(0.0, 255.0) as u8;
        }
    });

    result
}
