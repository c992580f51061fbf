//! Background processing off the caller's thread
//!
//! [`EyeWorker`] owns one thread that receives jobs over a channel and
//! reports each result as a [`WorkerEvent`]. Loading failures are reported as
//! events; the detection core itself never fails.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use rayon::prelude::*;

use crate::models::Frame;
use crate::recognition::TargetRecognition;
use crate::tools::load_frame;

#[derive(Debug)]
enum WorkerMessage {
    Path(PathBuf),
    Frame { source: PathBuf, frame: Frame },
    Exit,
}

/// Result of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// The annotated frame for `source`
    FrameProcessed {
        /// Path or tag the job was submitted with
        source: PathBuf,
        /// Annotated output
        frame: Frame,
    },
    /// `source` could not be loaded
    Error {
        /// Path the job was submitted with
        source: PathBuf,
        /// Rendered load error
        message: String,
    },
}

/// Single background thread running a [`TargetRecognition`]
#[derive(Debug)]
pub struct EyeWorker {
    tx: Sender<WorkerMessage>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl EyeWorker {
    /// Start the worker thread
    pub fn spawn(recognition: TargetRecognition) -> Self {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        let (event_tx, events) = mpsc::channel::<WorkerEvent>();
        let handle = thread::Builder::new()
            .name("pupil-worker".to_string())
            .spawn(move || worker_loop(recognition, rx, event_tx))
            .map_err(|e| warn!("failed to spawn worker thread: {e}"))
            .ok();

        Self { tx, events, handle }
    }

    /// Queue an image file; false when the worker is gone
    pub fn submit_path(&self, path: impl Into<PathBuf>) -> bool {
        self.tx.send(WorkerMessage::Path(path.into())).is_ok()
    }

    /// Queue an in-memory frame tagged with `source`; false when the worker is gone
    pub fn submit_frame(&self, source: impl Into<PathBuf>, frame: Frame) -> bool {
        self.tx
            .send(WorkerMessage::Frame {
                source: source.into(),
                frame,
            })
            .is_ok()
    }

    /// Next event, blocking until one arrives or the worker stops
    pub fn recv(&self) -> Option<WorkerEvent> {
        self.events.recv().ok()
    }

    /// Next event, waiting at most `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Next event if one is ready
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }

    /// Finish queued jobs, stop the thread and return undelivered events
    pub fn shutdown(mut self) -> Vec<WorkerEvent> {
        self.stop();
        self.events.try_iter().collect()
    }

    fn stop(&mut self) {
        let _ = self.tx.send(WorkerMessage::Exit);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("pupil worker thread panicked");
            }
        }
    }
}

impl Drop for EyeWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(recognition: TargetRecognition, rx: Receiver<WorkerMessage>, events: Sender<WorkerEvent>) {
    while let Ok(msg) = rx.recv() {
        let event = match msg {
            WorkerMessage::Exit => break,
            WorkerMessage::Path(path) => match load_frame(&path) {
                Ok(frame) => WorkerEvent::FrameProcessed {
                    frame: recognition.process(&frame),
                    source: path,
                },
                Err(e) => {
                    warn!("{e}");
                    WorkerEvent::Error {
                        message: e.to_string(),
                        source: path,
                    }
                }
            },
            WorkerMessage::Frame { source, frame } => WorkerEvent::FrameProcessed {
                frame: recognition.process(&frame),
                source,
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
    debug!("pupil worker stopped");
}

/// Process independent frames in parallel, preserving order
pub fn process_batch(recognition: &TargetRecognition, frames: &[Frame]) -> Vec<Frame> {
    frames.par_iter().map(|f| recognition.process(f)).collect()
}
