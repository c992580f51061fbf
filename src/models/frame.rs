//! Owned pixel buffer handed between the pipeline stages
//!
//! A `Frame` exclusively owns its bytes. Stages never mutate their input;
//! every conversion into or out of an `image` buffer copies.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// Interleaved 8-bit image (1 = luma, 3 = RGB, 4 = RGBA)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap raw bytes; no validation happens here, see [`Frame::is_valid`]
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// A frame filled with a single value in every channel
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Self {
        Self::new(width, height, channels, vec![value; width * height * channels])
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Give up ownership of the bytes
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// True when the buffer can be processed
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
            && self.width > 0
            && self.height > 0
            && matches!(self.channels, 1 | 3 | 4)
            && self
                .width
                .checked_mul(self.height)
                .and_then(|n| n.checked_mul(self.channels))
                == Some(self.data.len())
    }

    /// Pixel bytes at (x, y), or `None` outside the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if !self.is_valid() || x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        Some(&self.data[start..start + self.channels])
    }

    /// Copy into an `image` luma buffer (single-channel frames only)
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        if !self.is_valid() || self.channels != 1 {
            return None;
        }
        ImageBuffer::<Luma<u8>, _>::from_raw(
            self.width as u32,
            self.height as u32,
            self.data.clone(),
        )
    }

    /// Copy into an `image` RGB buffer, promoting luma and dropping alpha
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if !self.is_valid() {
            return None;
        }
        let raw = match self.channels {
            3 => self.data.clone(),
            1 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            _ => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        };
        ImageBuffer::<Rgb<u8>, _>::from_raw(self.width as u32, self.height as u32, raw)
    }

    /// Copy into an `image` RGBA buffer (four-channel frames only)
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if !self.is_valid() || self.channels != 4 {
            return None;
        }
        ImageBuffer::<Rgba<u8>, _>::from_raw(
            self.width as u32,
            self.height as u32,
            self.data.clone(),
        )
    }

    /// Copy a luma buffer into a new frame
    pub fn from_gray_image(img: &GrayImage) -> Self {
        Self::new(
            img.width() as usize,
            img.height() as usize,
            1,
            img.as_raw().clone(),
        )
    }

    /// Copy an RGB buffer into a new frame
    pub fn from_rgb_image(img: &RgbImage) -> Self {
        Self::new(
            img.width() as usize,
            img.height() as usize,
            3,
            img.as_raw().clone(),
        )
    }

    /// Copy an RGBA buffer into a new frame
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        Self::new(
            img.width() as usize,
            img.height() as usize,
            4,
            img.as_raw().clone(),
        )
    }
}
