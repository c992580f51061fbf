//! pupil_track - classical pupil localization for still eye images
//!
//! A rule-based detector that finds the pupil in a single frame and returns it
//! as a packed circle `[center, (radius, 0)]`, plus an annotation stage and a
//! fail-soft orchestrator. No learned models; every stage is plain image
//! processing and is total over its inputs.
//!
//! ```
//! use pupil_track::{locate_pupil, tools::synthetic_disk, unpack_circle};
//!
//! let frame = synthetic_disk(320, 240, 160.0, 120.0, 30.0, 20, 210);
//! let edges = locate_pupil(&frame);
//! let (center, radius) = unpack_circle(&edges).unwrap();
//! assert!((center.x - 160).abs() <= 2 && (radius - 30).abs() <= 2);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pupil detection strategies (threshold sweep, circle voting, contour trace)
pub mod detector;
/// Error types for loading and saving frames
#[allow(missing_docs)]
pub mod error;
/// Leveled logging capability shared by the detectors
pub mod logging;
/// Core data structures (Frame, Point, Circle, BinaryMask)
pub mod models;
/// Per-frame orchestration
pub mod recognition;
/// Annotation of detection results
pub mod render;
/// Loading, saving and synthetic test frames
pub mod tools;
/// Utility functions (grayscale, resize, morphology, blur, binarization, geometry)
pub mod utils;
/// Background and batch processing
pub mod worker;

pub use detector::{CancelToken, DetectorConfig, EyeProcessor, Strategy};
pub use error::{LoadError, SaveError};
pub use models::{Circle, Frame, Point, PointF, pack_circle, unpack_circle};
pub use recognition::{DEFAULT_LABEL, Recognition, TargetRecognition};

use detector::{SweepConfig, ThresholdSweepDetector};
use logging::global_sink;

/// Find the pupil with the threshold sweep and default tuning
///
/// Returns `[center, (radius, 0)]` in frame coordinates, or an empty vector
/// when nothing qualifies or the frame is invalid.
pub fn locate_pupil(frame: &Frame) -> Vec<Point> {
    ThresholdSweepDetector::new(SweepConfig::default(), global_sink()).find_pupil_edges(frame)
}

/// Detect and annotate in one call with the default pipeline
pub fn annotate(frame: &Frame) -> Frame {
    TargetRecognition::default().process(frame)
}
