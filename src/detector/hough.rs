//! Gradient-voting circle detector.
//!
//! Every Canny edge pixel votes along its gradient toward the darker side at
//! all radii in the allowed window. A dark disk on a brighter background makes
//! those votes converge on its center. The radius is then the distance bin
//! best supported by edge pixels whose gradient points away from that center.

use std::sync::Arc;

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use log::Level;
use rayon::prelude::*;

use super::config::HoughConfig;
use super::{EyeProcessor, transform};
use crate::logging::LogSink;
use crate::models::{Circle, Frame, Point, PointF, pack_circle};
use crate::render;
use crate::utils::blur::gaussian_blur;
use crate::utils::grayscale::frame_to_grayscale;
use crate::utils::resize::fit_within;

/// Edge pixel with its unit gradient (pointing toward brighter values)
#[derive(Debug, Clone, Copy)]
struct EdgeSample {
    x: f32,
    y: f32,
    gx: f32,
    gy: f32,
}

/// Circle detector based on gradient voting
pub struct HoughCircleDetector {
    config: HoughConfig,
    sink: Arc<dyn LogSink>,
}

impl HoughCircleDetector {
    /// Create a detector reporting to `sink`
    pub fn new(config: HoughConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// Best circle in original frame coordinates
    pub fn detect(&self, frame: &Frame) -> Option<Circle> {
        if !frame.is_valid() {
            return None;
        }
        let cfg = &self.config;
        let gray = frame_to_grayscale(frame);
        let work = fit_within(&gray, frame.width(), frame.height(), cfg.max_working_dim);
        let (w, h) = (work.width, work.height);
        if w < 4 || h < 4 {
            return None;
        }
        let blurred = gaussian_blur(&work.gray, w, h, cfg.blur_size);
        let image = GrayImage::from_raw(w as u32, h as u32, blurred)?;

        let samples = edge_samples(&image, cfg.canny_low, cfg.canny_high);
        let (min_r, max_r) = cfg.radius_bounds(h);
        if samples.is_empty() || min_r > max_r {
            self.sink.log(Level::Warn, "no usable edges for circle voting");
            return None;
        }

        let acc = accumulate(&samples, w, h, min_r, max_r);
        let Some((center, votes)) = peak(&acc, w, h) else {
            self.sink.log(Level::Warn, "empty circle accumulator");
            return None;
        };
        if votes < cfg.min_votes {
            self.sink.log(
                Level::Warn,
                &format!("circle center has {votes} votes, need {}", cfg.min_votes),
            );
            return None;
        }

        let Some((radius, support)) = best_radius(&samples, center, min_r, max_r) else {
            self.sink.log(Level::Warn, "no radius bin supported by edges");
            return None;
        };
        if support < cfg.min_support {
            self.sink.log(
                Level::Warn,
                &format!("circle radius {radius} supported by {support:.2} of circumference"),
            );
            return None;
        }

        self.sink.log(
            Level::Info,
            &format!(
                "circle at ({:.1}, {:.1}) radius {radius} with {votes} votes, support {support:.2}",
                center.x, center.y
            ),
        );
        Some(Circle::new(center.x, center.y, radius as f32).rescale(work.scale))
    }
}

fn edge_samples(image: &GrayImage, low: f32, high: f32) -> Vec<EdgeSample> {
    let edges = canny(image, low, high);
    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);
    let (w, h) = image.dimensions();

    (0..h)
        .into_par_iter()
        .flat_map_iter(|y| {
            let edges = &edges;
            let gx = &gx;
            let gy = &gy;
            (0..w).filter_map(move |x| {
                if edges.get_pixel(x, y)[0] == 0 {
                    return None;
                }
                let dx = gx.get_pixel(x, y)[0] as f32;
                let dy = gy.get_pixel(x, y)[0] as f32;
                let mag = (dx * dx + dy * dy).sqrt();
                if mag < 1e-3 {
                    return None;
                }
                Some(EdgeSample {
                    x: x as f32,
                    y: y as f32,
                    gx: dx / mag,
                    gy: dy / mag,
                })
            })
        })
        .collect()
}

/// Center votes: each sample votes at `p - r * g` for every radius
fn accumulate(samples: &[EdgeSample], w: usize, h: usize, min_r: usize, max_r: usize) -> Vec<u32> {
    samples
        .par_iter()
        .fold(
            || vec![0u32; w * h],
            |mut acc, s| {
                for r in min_r..=max_r {
                    let vx = (s.x - s.gx * r as f32).round();
                    let vy = (s.y - s.gy * r as f32).round();
                    if vx >= 0.0 && vy >= 0.0 && (vx as usize) < w && (vy as usize) < h {
                        acc[vy as usize * w + vx as usize] += 1;
                    }
                }
                acc
            },
        )
        .reduce(
            || vec![0u32; w * h],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                a
            },
        )
}

/// Strongest 3x3 neighborhood; center refined by its vote-weighted mean
fn peak(acc: &[u32], w: usize, h: usize) -> Option<(PointF, u32)> {
    let mut best: Option<(usize, usize, u32)> = None;
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    sum += acc[ny * w + nx];
                }
            }
            if sum > 0 && best.is_none_or(|(_, _, b)| sum > b) {
                best = Some((x, y, sum));
            }
        }
    }

    let (bx, by, votes) = best?;
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for ny in by.saturating_sub(1)..=(by + 1).min(h - 1) {
        for nx in bx.saturating_sub(1)..=(bx + 1).min(w - 1) {
            let v = acc[ny * w + nx] as f64;
            sx += v * nx as f64;
            sy += v * ny as f64;
        }
    }
    let total = votes as f64;
    Some((PointF::new((sx / total) as f32, (sy / total) as f32), votes))
}

/// Radius whose `r-1..=r+1` band holds the largest share of its circumference
fn best_radius(
    samples: &[EdgeSample],
    center: PointF,
    min_r: usize,
    max_r: usize,
) -> Option<(usize, f32)> {
    let mut hist = vec![0u32; max_r + 2];
    for s in samples {
        let dx = s.x - center.x;
        let dy = s.y - center.y;
        // Dark inside: the gradient points outward
        if dx * s.gx + dy * s.gy <= 0.0 {
            continue;
        }
        let d = (dx * dx + dy * dy).sqrt().round() as usize;
        if d < hist.len() {
            hist[d] += 1;
        }
    }

    (min_r..=max_r)
        .map(|r| {
            let band = hist[r.saturating_sub(1)] + hist[r] + hist[r + 1];
            let circumference = 2.0 * std::f32::consts::PI * r as f32;
            (r, band as f32 / circumference)
        })
        .filter(|&(_, support)| support > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

impl EyeProcessor for HoughCircleDetector {
    fn find_eye_center(&self, frame: &Frame) -> Option<Point> {
        self.detect(frame).map(|c| c.center.round())
    }

    fn translate_to_center(&self, frame: &Frame, center: Option<Point>) -> Frame {
        transform::translate_to_center(frame, center)
    }

    fn find_pupil_edges(&self, frame: &Frame) -> Vec<Point> {
        self.detect(frame)
            .map(|c| pack_circle(&c))
            .unwrap_or_default()
    }

    fn draw_edges_and_watermark(&self, frame: &Frame, edges: &[Point], watermark: &str) -> Frame {
        render::annotate_circle(frame, edges, watermark)
    }
}
