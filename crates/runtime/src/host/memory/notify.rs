use std::sync::{Arc, Mutex};

use crate::host::{Notifier, Severity};

/// Keeps every notification for later inspection.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    shown: Arc<Mutex<Vec<(String, Severity)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(String, Severity)> {
        self.shown
            .lock()
            .map(|shown| shown.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.shown()
            .iter()
            .filter(|(_, shown)| *shown == severity)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match self.shown.lock() {
            Ok(mut shown) => shown.push((message.to_owned(), severity)),
            Err(_) => tracing::warn!(target: "tracker::notify", "notification log poisoned"),
        }
    }
}

/// Routes notifications into the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "tracker::notify", "{message}"),
            Severity::Warning => tracing::warn!(target: "tracker::notify", "{message}"),
            Severity::Error => tracing::error!(target: "tracker::notify", "{message}"),
        }
    }
}
