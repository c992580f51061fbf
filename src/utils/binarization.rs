use crate::models::BinaryMask;
use rayon::prelude::*;

/// Inverse binary threshold: pixels `<= threshold` become foreground
///
/// Dark regions (the pupil) end up as foreground, matching the classic
/// `THRESH_BINARY_INV` convention.
pub fn threshold_binarize_inv(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryMask {
    let mut mask = BinaryMask::new(width, height);

    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        for (x, &v) in row.iter().enumerate() {
            if v <= threshold {
                mask.set(x, y, true);
            }
        }
    }

    mask
}

/// Otsu's optimal global threshold (128 when the image has a single class)
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let histogram = gray
        .par_chunks(4096)
        .map(|chunk| {
            let mut h = [0u32; 256];
            for &pixel in chunk {
                h[pixel as usize] += 1;
            }
            h
        })
        .reduce(
            || [0u32; 256],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                a
            },
        );

    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut max_variance = 0.0;
    let mut optimal = 128u8;
    let mut class1_pixels = 0.0f64;
    let mut class1_sum = 0.0f64;

    // Threshold t splits [0, t) from [t, 255]
    for t in 1..=255usize {
        class1_pixels += histogram[t - 1] as f64;
        class1_sum += (t - 1) as f64 * histogram[t - 1] as f64;
        let class2_pixels = total - class1_pixels;
        if class1_pixels == 0.0 || class2_pixels == 0.0 {
            continue;
        }

        let mean1 = class1_sum / class1_pixels;
        let mean2 = (total_sum - class1_sum) / class2_pixels;
        let variance = (class1_pixels / total) * (class2_pixels / total) * (mean1 - mean2).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal = t as u8;
        }
    }

    optimal
}
