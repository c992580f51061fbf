//! Pupil detection modules
//!
//! This module contains all the logic for locating a pupil in a frame:
//! - Contour extraction (connected components and boundary tracing)
//! - The threshold-sweep detector (primary strategy)
//! - A circle-transform detector and a dense contour tracer (legacy strategies)
//! - Recentering by integer translation
//!
//! Every strategy implements [`EyeProcessor`], so callers pick one through
//! [`Strategy`] and never depend on a concrete detector.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logging::LogSink;
use crate::models::{Frame, Point};

/// Tuning knobs and environment overrides
pub mod config;
/// 8-connected component labelling
pub mod connected_components;
/// Boundary tracing and contour measurements
pub mod contour;
/// Gradient-voting circle detector
pub mod hough;
/// Threshold sweep with circularity acceptance
pub mod sweep;
/// Dense dark-blob boundary tracer
pub mod trace;
/// Integer recentering
pub mod transform;

pub use config::{DetectorConfig, HoughConfig, SweepConfig, TraceConfig};
pub use hough::HoughCircleDetector;
pub use sweep::{SweepHit, ThresholdSweepDetector};
pub use trace::ContourTraceDetector;

/// The four operations every detection strategy offers
///
/// All operations are total: invalid input or a miss yields `None`, an empty
/// list, or an unchanged copy of the frame.
pub trait EyeProcessor: Send + Sync {
    /// Estimated eye center, `None` when not implemented or not found
    fn find_eye_center(&self, frame: &Frame) -> Option<Point>;

    /// New frame shifted so `center` lands at the frame center
    fn translate_to_center(&self, frame: &Frame, center: Option<Point>) -> Frame;

    /// Pupil outline; `[center, (radius, 0)]` for circle strategies
    fn find_pupil_edges(&self, frame: &Frame) -> Vec<Point>;

    /// New frame with the outline and `watermark` drawn on it
    fn draw_edges_and_watermark(&self, frame: &Frame, edges: &[Point], watermark: &str) -> Frame;
}

/// Available detection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Opening, blur and a threshold sweep accepting the first round contour
    #[default]
    ThresholdSweep,
    /// Circle fit by gradient voting on an edge map
    HoughCircle,
    /// Full boundary of the first plausible dark blob
    ContourTrace,
}

impl Strategy {
    /// Every strategy, primary first
    pub const ALL: [Strategy; 3] = [
        Strategy::ThresholdSweep,
        Strategy::HoughCircle,
        Strategy::ContourTrace,
    ];

    /// Instantiate the strategy
    pub fn build(self, config: DetectorConfig, sink: Arc<dyn LogSink>) -> Arc<dyn EyeProcessor> {
        match self {
            Strategy::ThresholdSweep => {
                Arc::new(ThresholdSweepDetector::new(config.sweep, sink))
            }
            Strategy::HoughCircle => Arc::new(HoughCircleDetector::new(config.hough, sink)),
            Strategy::ContourTrace => Arc::new(ContourTraceDetector::new(config.trace, sink)),
        }
    }

    /// Short name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Strategy::ThresholdSweep => "sweep",
            Strategy::HoughCircle => "hough",
            Strategy::ContourTrace => "trace",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sweep" | "threshold" => Ok(Strategy::ThresholdSweep),
            "hough" | "circle" => Ok(Strategy::HoughCircle),
            "trace" | "contour" => Ok(Strategy::ContourTrace),
            other => Err(format!("unknown strategy '{other}' (expected sweep, hough or trace)")),
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running sweep
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
