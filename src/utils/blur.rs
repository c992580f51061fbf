/// Gaussian blur over `imageproc`
///
/// Odd kernel sizes map to a standard deviation with
/// `0.3 * ((k - 1) / 2 - 1) + 0.8`. Filtering runs on an `f32` copy and the
/// result is rounded back to `u8`.
use image::{ImageBuffer, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Standard deviation for an odd kernel size
pub fn sigma_for_size(size: usize) -> f32 {
    let size = size | 1;
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Blur a grayscale buffer; returns a new buffer of the same size
///
/// Sizes 0 and 1, empty buffers and buffers whose length disagrees with the
/// dimensions come back as a copy.
pub fn gaussian_blur(gray: &[u8], width: usize, height: usize, size: usize) -> Vec<u8> {
    if width == 0 || height == 0 || size <= 1 {
        return gray.to_vec();
    }
    let samples: Vec<f32> = gray.iter().map(|&v| v as f32).collect();
    let Some(image) =
        ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(width as u32, height as u32, samples)
    else {
        return gray.to_vec();
    };

    gaussian_blur_f32(&image, sigma_for_size(size))
        .into_raw()
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}
