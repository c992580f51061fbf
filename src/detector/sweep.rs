/// Threshold-sweep pupil detector
///
/// The frame is reduced to a smoothed, highlight-free luma image at a bounded
/// working resolution. Thresholds are then tried from the darkest pixel
/// upward; at each level the external contours are scanned in enumeration
/// order and the first one that is big enough, round enough and of plausible
/// size is the pupil. Darkest-first means the pupil wins over the iris and
/// eyelashes, which only become foreground at higher levels.
use std::sync::Arc;

use log::Level;

use super::config::SweepConfig;
use super::contour::find_external_contours;
use super::{CancelToken, EyeProcessor};
use crate::logging::LogSink;
use crate::models::{Circle, Frame, Point, pack_circle};
use crate::render;
use crate::utils::binarization::threshold_binarize_inv;
use crate::utils::blur::gaussian_blur;
use crate::utils::grayscale::{frame_to_grayscale, min_value};
use crate::utils::morphology::{EllipseKernel, open};
use crate::utils::resize::{Downscaled, fit_within};

/// Accepted contour with the measurements that accepted it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Threshold level at which the contour was accepted
    pub threshold: u8,
    /// Enclosing circle at working resolution
    pub circle: Circle,
    /// `4*pi*area / perimeter^2` of the contour
    pub circularity: f64,
    /// Contour area at working resolution
    pub area: f64,
    /// Working-to-original scale factor
    pub scale: f32,
}

impl SweepHit {
    /// Enclosing circle in original frame coordinates
    pub fn original_circle(&self) -> Circle {
        self.circle.rescale(self.scale)
    }
}

/// Primary pupil detector
pub struct ThresholdSweepDetector {
    config: SweepConfig,
    sink: Arc<dyn LogSink>,
    cancel: Option<CancelToken>,
}

impl ThresholdSweepDetector {
    /// Create a detector reporting to `sink`
    pub fn new(config: SweepConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            sink,
            cancel: None,
        }
    }

    /// Attach a cancellation token checked before every threshold level
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Luma at working resolution after opening and blur
    pub fn preprocess(&self, frame: &Frame) -> Option<Downscaled> {
        if !frame.is_valid() {
            return None;
        }
        let gray = frame_to_grayscale(frame);
        let mut work = fit_within(&gray, frame.width(), frame.height(), self.config.max_working_dim);

        let (w, h) = (work.width, work.height);
        let kernel = EllipseKernel::new(EllipseKernel::size_for_rows(
            h,
            self.config.kernel_divisor,
            self.config.kernel_min,
            self.config.kernel_max,
        ));
        let opened = open(&work.gray, w, h, &kernel);
        work.gray = gaussian_blur(&opened, w, h, self.config.blur_size);
        Some(work)
    }

    /// Run the sweep and report the accepted contour, if any
    pub fn locate(&self, frame: &Frame) -> Option<SweepHit> {
        let work = self.preprocess(frame)?;
        let (w, h) = (work.width, work.height);
        let cfg = &self.config;

        let start = cfg.threshold_floor.max(min_value(&work.gray)) as u32;
        let ceiling = cfg.threshold_ceiling as u32;
        let step = cfg.threshold_step.max(1) as u32;
        let (min_r, max_r) = cfg.radius_bounds(h);

        let mut t = start;
        while t <= ceiling {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                self.sink
                    .log(Level::Warn, &format!("pupil search cancelled at threshold {t}"));
                return None;
            }

            let mask = threshold_binarize_inv(&work.gray, w, h, t as u8);
            for contour in find_external_contours(&mask) {
                let area = contour.area();
                if area < cfg.min_area {
                    continue;
                }
                let perimeter = contour.perimeter();
                if perimeter <= 0.0 {
                    continue;
                }
                let circularity = contour.circularity();
                if circularity < cfg.min_circularity {
                    continue;
                }
                let circle = contour.enclosing_circle();
                if circle.radius < min_r || circle.radius > max_r {
                    continue;
                }

                self.sink.log(
                    Level::Info,
                    &format!(
                        "pupil accepted at threshold {t}: radius {:.1}, circularity {:.3}",
                        circle.radius, circularity
                    ),
                );
                return Some(SweepHit {
                    threshold: t as u8,
                    circle,
                    circularity,
                    area,
                    scale: work.scale,
                });
            }
            t += step;
        }

        self.sink.log(
            Level::Warn,
            &format!("no pupil found for thresholds {start}..={ceiling}"),
        );
        None
    }
}

impl EyeProcessor for ThresholdSweepDetector {
    fn find_eye_center(&self, frame: &Frame) -> Option<Point> {
        self.locate(frame).map(|hit| hit.original_circle().center.round())
    }

    fn translate_to_center(&self, frame: &Frame, _center: Option<Point>) -> Frame {
        frame.clone()
    }

    fn find_pupil_edges(&self, frame: &Frame) -> Vec<Point> {
        let Some(hit) = self.locate(frame) else {
            return Vec::new();
        };
        let packed = pack_circle(&hit.original_circle());
        self.sink.log(
            Level::Info,
            &format!(
                "pupil at ({}, {}) radius {}",
                packed[0].x, packed[0].y, packed[1].x
            ),
        );
        packed
    }

    fn draw_edges_and_watermark(&self, frame: &Frame, edges: &[Point], watermark: &str) -> Frame {
        render::annotate_circle(frame, edges, watermark)
    }
}
