/// Dense contour-trace detector
///
/// Works at full resolution: blur, Otsu threshold capped at a darkness
/// ceiling, then the full boundary of the first external contour of
/// plausible size. No roundness test is applied, so the trace follows the
/// blob even when eyelids clip it.
use std::sync::Arc;

use log::Level;

use super::config::TraceConfig;
use super::contour::{Contour, find_external_contours};
use super::{EyeProcessor, transform};
use crate::logging::LogSink;
use crate::models::{Frame, Point};
use crate::render;
use crate::utils::binarization::{otsu_threshold, threshold_binarize_inv};
use crate::utils::blur::gaussian_blur;
use crate::utils::grayscale::frame_to_grayscale;

/// Detector returning the ordered boundary of the darkest plausible blob
pub struct ContourTraceDetector {
    config: TraceConfig,
    sink: Arc<dyn LogSink>,
}

impl ContourTraceDetector {
    /// Create a detector reporting to `sink`
    pub fn new(config: TraceConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// Threshold used for a grayscale buffer
    pub fn threshold_for(&self, gray: &[u8]) -> u8 {
        otsu_threshold(gray).min(self.config.dark_ceiling)
    }

    /// First accepted contour, in frame coordinates
    pub fn trace(&self, frame: &Frame) -> Option<Contour> {
        if !frame.is_valid() {
            return None;
        }
        let (w, h) = (frame.width(), frame.height());
        let gray = gaussian_blur(&frame_to_grayscale(frame), w, h, self.config.blur_size);
        let t = self.threshold_for(&gray);
        let mask = threshold_binarize_inv(&gray, w, h, t);

        let max_area = self.config.max_area_ratio * (w * h) as f64;
        let found = find_external_contours(&mask).into_iter().find(|c| {
            let area = c.area();
            area >= self.config.min_area && area <= max_area
        });

        match &found {
            Some(c) => self.sink.log(
                Level::Info,
                &format!(
                    "traced {} boundary points at threshold {t}, area {:.0}",
                    c.points.len(),
                    c.area()
                ),
            ),
            None => self
                .sink
                .log(Level::Warn, &format!("no dark blob at threshold {t}")),
        }
        found
    }
}

impl EyeProcessor for ContourTraceDetector {
    fn find_eye_center(&self, frame: &Frame) -> Option<Point> {
        self.trace(frame)
            .and_then(|c| c.centroid())
            .map(|p| p.round())
    }

    fn translate_to_center(&self, frame: &Frame, center: Option<Point>) -> Frame {
        transform::translate_to_center(frame, center)
    }

    fn find_pupil_edges(&self, frame: &Frame) -> Vec<Point> {
        self.trace(frame).map(|c| c.points).unwrap_or_default()
    }

    fn draw_edges_and_watermark(&self, frame: &Frame, edges: &[Point], watermark: &str) -> Frame {
        render::annotate_trace(frame, edges, watermark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::tools::synthetic_disk;

    fn detector() -> ContourTraceDetector {
        ContourTraceDetector::new(TraceConfig::default(), Arc::new(MemorySink::new()))
    }

    #[test]
    fn test_traces_disk_boundary() {
        let frame = synthetic_disk(160, 120, 70.0, 60.0, 25.0, 20, 200);
        let edges = detector().find_pupil_edges(&frame);
        assert!(edges.len() > 100, "only {} points", edges.len());
        for p in &edges {
            let d = ((p.x as f32 - 70.0).powi(2) + (p.y as f32 - 60.0).powi(2)).sqrt();
            assert!((d - 25.0).abs() <= 3.0, "point {:?} at distance {}", p, d);
        }
    }

    #[test]
    fn test_center_is_centroid() {
        let frame = synthetic_disk(160, 120, 70.0, 60.0, 25.0, 20, 200);
        let c = detector().find_eye_center(&frame).unwrap();
        assert!((c.x - 70).abs() <= 1);
        assert!((c.y - 60).abs() <= 1);
    }

    #[test]
    fn test_threshold_is_capped() {
        let d = detector();
        // Two mid-gray classes: Otsu lands between them, above the ceiling
        let mut gray = vec![120u8; 100];
        gray.extend(vec![220u8; 100]);
        assert_eq!(d.threshold_for(&gray), 70);
    }

    #[test]
    fn test_blank_and_invalid_miss() {
        let d = detector();
        assert!(d.find_pupil_edges(&Frame::filled(50, 50, 1, 200)).is_empty());
        assert!(d.find_pupil_edges(&Frame::default()).is_empty());
        assert_eq!(d.find_eye_center(&Frame::default()), None);
    }
}
