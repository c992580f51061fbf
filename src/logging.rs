//! Leveled message capability used by the detectors
//!
//! Detectors hold an `Arc<dyn LogSink>` instead of calling a global logger
//! from inside the algorithm, so tests can capture messages with
//! [`MemorySink`]. The process-wide default forwards to the `log` facade.

use log::Level;
use std::sync::{Arc, Mutex, OnceLock};

/// Anything that accepts a leveled message
pub trait LogSink: Send + Sync {
    /// Record one message
    fn log(&self, level: Level, message: &str);
}

/// Forwards to the `log` crate under the `pupil_track` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "pupil_track", level, "{}", message);
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded messages
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

static GLOBAL_SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

/// Install the process-wide sink; returns false if one was already set
pub fn install_sink(sink: Arc<dyn LogSink>) -> bool {
    GLOBAL_SINK.set(sink).is_ok()
}

/// The process-wide sink (a [`LogCrateSink`] unless another was installed)
pub fn global_sink() -> Arc<dyn LogSink> {
    GLOBAL_SINK
        .get_or_init(|| Arc::new(LogCrateSink))
        .clone()
}

/// Configure `env_logger` for binaries; `RUST_LOG` overrides `default_level`
pub fn init_logging(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(false)
        .try_init();
}
