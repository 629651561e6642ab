use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::error::{Result, ShepherdError};

/// Progress events emitted by the export worker and rendered by the CLI.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    PhaseStarted { phase: String },
    Records { phase: String, count: u64 },
    PhaseFinished { phase: String, written: u64, skipped: u64 },
    PhaseFailed { phase: String, message: String },
}

/// Cloneable handle the worker uses to report progress. A sink without a
/// channel swallows events, which keeps translators testable without
/// wiring up a receiver.
#[derive(Clone, Default)]
pub struct ProgressSink {
    tx: Option<Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn discard() -> Self {
        Self::default()
    }

    pub fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // The receiver hanging up just means nobody is watching.
            let _ = tx.send(event);
        }
    }

    pub fn phase_started(&self, phase: &str) {
        self.send(ProgressEvent::PhaseStarted {
            phase: phase.to_string(),
        });
    }

    pub fn records(&self, phase: &str, count: u64) {
        self.send(ProgressEvent::Records {
            phase: phase.to_string(),
            count,
        });
    }

    pub fn phase_finished(&self, phase: &str, written: u64, skipped: u64) {
        self.send(ProgressEvent::PhaseFinished {
            phase: phase.to_string(),
            written,
            skipped,
        });
    }

    pub fn phase_failed(&self, phase: &str, message: &str) {
        self.send(ProgressEvent::PhaseFailed {
            phase: phase.to_string(),
            message: message.to_string(),
        });
    }
}

/// Shared cancellation flag, set from a Ctrl-C handler and checked by the
/// worker at record boundaries.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ShepherdError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Bounded-iteration guard around record loops. Every loop that walks
/// source rows ticks this; tripping it fails the phase instead of letting
/// a malformed input spin forever.
#[derive(Debug)]
pub struct LoopGuard {
    max: u64,
    seen: u64,
}

impl LoopGuard {
    pub fn new(max: u64) -> Self {
        Self { max, seen: 0 }
    }

    pub fn tick(&mut self) -> Result<()> {
        self.seen += 1;
        if self.seen > self.max {
            Err(ShepherdError::LoopThreshold(self.max))
        } else {
            Ok(())
        }
    }
}

/// One row of the export summary: what a phase read, wrote, and skipped,
/// plus any per-record errors. Failed phases stay in the list so a
/// partial package always comes with a manifest of what ran.
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub phase: String,
    pub source_file: String,
    /// SHA-256 of the source file, recorded for provenance.
    pub checksum: String,
    pub written: u64,
    pub skipped: u64,
    /// Total monetary amount written by a financial phase, for checking
    /// the export against source giving reports.
    pub amount: f64,
    pub errors: Vec<RecordError>,
    pub failure: Option<String>,
}

impl PhaseResult {
    pub fn new(phase: &str, source_file: &str, checksum: &str) -> Self {
        Self {
            phase: phase.to_string(),
            source_file: source_file.to_string(),
            checksum: checksum.to_string(),
            written: 0,
            skipped: 0,
            amount: 0.0,
            errors: Vec::new(),
            failure: None,
        }
    }

    pub fn failed(phase: &str, source_file: &str, message: String) -> Self {
        let mut r = Self::new(phase, source_file, "");
        r.failure = Some(message);
        r
    }

    pub fn skip(&mut self, record_id: &str, message: &str) {
        self.skipped += 1;
        self.errors.push(RecordError {
            record_id: record_id.to_string(),
            message: message.to_string(),
        });
    }

    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RecordError {
    pub record_id: String,
    pub message: String,
}
