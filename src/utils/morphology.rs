//! Grayscale morphology with an elliptical structuring element
//!
//! The element is decomposed into horizontal spans (one half-width per
//! kernel row). Each distinct span width gets a sliding-window min/max pass
//! per image row, then every output pixel folds one lookup per kernel row.
//! Pixels outside the image are ignored rather than padded.

use rayon::prelude::*;
use std::collections::VecDeque;

/// Elliptical structuring element described by per-row half-widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipseKernel {
    size: usize,
    half_widths: Vec<usize>,
}

impl EllipseKernel {
    /// Build a `size x size` ellipse (size is forced odd and at least 1)
    pub fn new(size: usize) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size.max(1) };
        let r = (size / 2) as f64;

        let half_widths = (0..size)
            .map(|i| {
                if r == 0.0 {
                    return 0;
                }
                let dy = i as f64 - r;
                let dx = (r * r - dy * dy).max(0.0).sqrt();
                (dx.round() as usize).min(size / 2)
            })
            .collect();

        Self { size, half_widths }
    }

    /// Kernel diameter in pixels
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half-width of each kernel row, top to bottom
    pub fn half_widths(&self) -> &[usize] {
        &self.half_widths
    }

    /// Diameter used for pupil images: `rows / divisor` clamped and made odd
    pub fn size_for_rows(rows: usize, divisor: usize, min: usize, max: usize) -> usize {
        let mut size = (rows / divisor.max(1)).clamp(min, max.max(min));
        if size % 2 == 0 {
            size = if size + 1 > max && size > 1 { size - 1 } else { size + 1 };
        }
        size
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

impl Extreme {
    #[inline]
    fn keeps(self, kept: u8, incoming: u8) -> bool {
        match self {
            Extreme::Min => kept < incoming,
            Extreme::Max => kept > incoming,
        }
    }

    #[inline]
    fn pick(self, a: u8, b: u8) -> u8 {
        match self {
            Extreme::Min => a.min(b),
            Extreme::Max => a.max(b),
        }
    }

    fn identity(self) -> u8 {
        match self {
            Extreme::Min => u8::MAX,
            Extreme::Max => u8::MIN,
        }
    }
}

/// Extreme over the window `[x - d, x + d]` clipped to the row
fn sliding_extreme(row: &[u8], d: usize, out: &mut [u8], op: Extreme) {
    let width = row.len();
    let mut window: VecDeque<usize> = VecDeque::with_capacity(2 * d + 2);
    let mut next = 0usize;

    for x in 0..width {
        let hi = (x + d).min(width - 1);
        while next <= hi {
            let v = row[next];
            while let Some(&back) = window.back() {
                if op.keeps(row[back], v) {
                    break;
                }
                window.pop_back();
            }
            window.push_back(next);
            next += 1;
        }

        let lo = x.saturating_sub(d);
        while let Some(&front) = window.front() {
            if front >= lo {
                break;
            }
            window.pop_front();
        }

        out[x] = row[window[0]];
    }
}

fn morph(gray: &[u8], width: usize, height: usize, kernel: &EllipseKernel, op: Extreme) -> Vec<u8> {
    if width == 0 || height == 0 || gray.len() < width * height {
        return gray.to_vec();
    }

    let radius = kernel.size() / 2;
    let mut spans: Vec<Option<Vec<u8>>> = vec![None; radius + 1];
    for &d in kernel.half_widths() {
        if spans[d].is_some() {
            continue;
        }
        let mut buf = vec![0u8; width * height];
        buf.par_chunks_mut(width).enumerate().for_each(|(y, out)| {
            sliding_extreme(&gray[y * width..(y + 1) * width], d, out, op);
        });
        spans[d] = Some(buf);
    }

    let mut result = vec![0u8; width * height];
    result.par_chunks_mut(width).enumerate().for_each(|(y, out)| {
        out.fill(op.identity());
        for (i, &d) in kernel.half_widths().iter().enumerate() {
            let sy = y as isize + i as isize - radius as isize;
            if sy < 0 || sy >= height as isize {
                continue;
            }
            let Some(span) = spans[d].as_ref() else {
                continue;
            };
            let src = &span[sy as usize * width..(sy as usize + 1) * width];
            for (o, &s) in out.iter_mut().zip(src) {
                *o = op.pick(*o, s);
            }
        }
    });

    result
}

/// Grayscale erosion (local minimum)
pub fn erode(gray: &[u8], width: usize, height: usize, kernel: &EllipseKernel) -> Vec<u8> {
    morph(gray, width, height, kernel, Extreme::Min)
}

/// Grayscale dilation (local maximum)
pub fn dilate(gray: &[u8], width: usize, height: usize, kernel: &EllipseKernel) -> Vec<u8> {
    morph(gray, width, height, kernel, Extreme::Max)
}

/// Grayscale opening: erosion followed by dilation
///
/// Removes bright specks smaller than the kernel (specular highlights inside
/// the pupil) while leaving large dark regions in place.
pub fn open(gray: &[u8], width: usize, height: usize, kernel: &EllipseKernel) -> Vec<u8> {
    let eroded = erode(gray, width, height, kernel);
    dilate(&eroded, width, height, kernel)
}
