//! Per-frame orchestration of a detection strategy
//!
//! [`TargetRecognition`] runs center, recenter, edges and annotate in that
//! order and always returns a frame. A missing detector or an invalid input
//! yields an unchanged copy of the input.

use std::sync::Arc;

use crate::detector::{DetectorConfig, EyeProcessor, Strategy};
use crate::logging::{LogSink, global_sink};
use crate::models::{Frame, Point};

/// Watermark drawn when no label is configured
pub const DEFAULT_LABEL: &str = "EYE_TRACKING_OK";

/// Fail-soft pipeline around an optional [`EyeProcessor`]
#[derive(Clone)]
pub struct TargetRecognition {
    processor: Option<Arc<dyn EyeProcessor>>,
    label: String,
}

/// Everything one `process` call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Eye center, when the strategy estimates one
    pub center: Option<Point>,
    /// Pupil outline found on the recentered frame
    pub edges: Vec<Point>,
    /// Annotated output
    pub frame: Frame,
}

impl TargetRecognition {
    /// Pipeline around `processor`
    pub fn new(processor: Arc<dyn EyeProcessor>) -> Self {
        Self {
            processor: Some(processor),
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Pipeline that passes every frame through unchanged
    pub fn detached() -> Self {
        Self {
            processor: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Pipeline around a freshly built strategy
    pub fn with_strategy(strategy: Strategy, config: DetectorConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::new(strategy.build(config, sink))
    }

    /// Replace the watermark text
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Current watermark text
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether a detector is attached
    pub fn is_attached(&self) -> bool {
        self.processor.is_some()
    }

    /// Run the full pipeline and keep the intermediate results
    pub fn recognize(&self, frame: &Frame) -> Recognition {
        let Some(processor) = self.processor.as_ref() else {
            return Recognition {
                center: None,
                edges: Vec::new(),
                frame: frame.clone(),
            };
        };
        if !frame.is_valid() {
            return Recognition {
                center: None,
                edges: Vec::new(),
                frame: frame.clone(),
            };
        }

        let center = processor.find_eye_center(frame);
        let centered = processor.translate_to_center(frame, center);
        let edges = processor.find_pupil_edges(&centered);
        let annotated = processor.draw_edges_and_watermark(&centered, &edges, &self.label);

        Recognition {
            center,
            edges,
            frame: annotated,
        }
    }

    /// Annotated frame; an unchanged copy on any failure
    pub fn process(&self, frame: &Frame) -> Frame {
        self.recognize(frame).frame
    }
}

impl Default for TargetRecognition {
    /// Threshold sweep with default tuning, reporting to the global sink
    fn default() -> Self {
        Self::with_strategy(Strategy::ThresholdSweep, DetectorConfig::default(), global_sink())
    }
}

impl std::fmt::Debug for TargetRecognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetRecognition")
            .field("attached", &self.processor.is_some())
            .field("label", &self.label)
            .finish()
    }
}
