//! Run observers.
//!
//! An observer receives progress callbacks during a pipeline run so the
//! host can surface status without the library choosing a UI.

use crate::context::RunIdentity;
use crate::errors::CompletionError;
use serde::{Deserialize, Serialize};

/// Trait for observers of pipeline run progress.
///
/// Callbacks must not block and must not fail; they are invoked inline on
/// the run's thread of control.
pub trait RunObserver: Send + Sync {
    /// A run has started.
    fn on_run_started(&self, run: &RunIdentity, stage_count: usize);

    /// A stage is about to execute.
    fn on_stage_started(&self, index: usize, role: &str);

    /// A stage produced its output.
    fn on_stage_completed(&self, index: usize, role: &str, duration_ms: f64);

    /// A stage failed; the run aborts after this callback.
    fn on_stage_failed(&self, index: usize, role: &str, error: &CompletionError);

    /// All stages completed.
    fn on_run_completed(&self, run: &RunIdentity, duration_ms: f64);
}

/// A no-op observer that discards all callbacks.
///
/// Used as the default when no observer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RunObserver for NoOpObserver {
    fn on_run_started(&self, _run: &RunIdentity, _stage_count: usize) {}
    fn on_stage_started(&self, _index: usize, _role: &str) {}
    fn on_stage_completed(&self, _index: usize, _role: &str, _duration_ms: f64) {}
    fn on_stage_failed(&self, _index: usize, _role: &str, _error: &CompletionError) {}
    fn on_run_completed(&self, _run: &RunIdentity, _duration_ms: f64) {}
}

/// An observer that logs progress through the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl RunObserver for LoggingObserver {
    fn on_run_started(&self, run: &RunIdentity, stage_count: usize) {
        tracing::info!(run_id = %run.run_id, stage_count, "run started");
    }

    fn on_stage_started(&self, index: usize, role: &str) {
        tracing::info!(stage = index, role, "stage started");
    }

    fn on_stage_completed(&self, index: usize, role: &str, duration_ms: f64) {
        tracing::info!(stage = index, role, duration_ms, "stage completed");
    }

    fn on_stage_failed(&self, index: usize, role: &str, error: &CompletionError) {
        tracing::error!(stage = index, role, error = %error, "stage failed");
    }

    fn on_run_completed(&self, run: &RunIdentity, duration_ms: f64) {
        tracing::info!(run_id = %run.run_id, duration_ms, "run completed");
    }
}

/// One recorded observer callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    /// Run started with the given stage count.
    RunStarted {
        /// Number of stages in the pipeline.
        stage_count: usize,
    },
    /// Stage started.
    StageStarted {
        /// Zero-based stage index.
        index: usize,
        /// Stage role.
        role: String,
    },
    /// Stage completed.
    StageCompleted {
        /// Zero-based stage index.
        index: usize,
        /// Stage role.
        role: String,
    },
    /// Stage failed.
    StageFailed {
        /// Zero-based stage index.
        index: usize,
        /// Stage role.
        role: String,
        /// Short failure cause label.
        cause: String,
    },
    /// Run completed.
    RunCompleted,
}

/// A collecting observer for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: parking_lot::RwLock<Vec<RunEvent>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl RunObserver for CollectingObserver {
    fn on_run_started(&self, _run: &RunIdentity, stage_count: usize) {
        self.events.write().push(RunEvent::RunStarted { stage_count });
    }

    fn on_stage_started(&self, index: usize, role: &str) {
        self.events.write().push(RunEvent::StageStarted {
            index,
            role: role.to_string(),
        });
    }

    fn on_stage_completed(&self, index: usize, role: &str, _duration_ms: f64) {
        self.events.write().push(RunEvent::StageCompleted {
            index,
            role: role.to_string(),
        });
    }

    fn on_stage_failed(&self, index: usize, role: &str, error: &CompletionError) {
        self.events.write().push(RunEvent::StageFailed {
            index,
            role: role.to_string(),
            cause: error.cause().to_string(),
        });
    }

    fn on_run_completed(&self, _run: &RunIdentity, _duration_ms: f64) {
        self.events.write().push(RunEvent::RunCompleted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collecting_observer_records_in_order() {
        let observer = CollectingObserver::new();
        let run = RunIdentity::new();

        observer.on_run_started(&run, 3);
        observer.on_stage_started(0, "Anthropologist");
        observer.on_stage_completed(0, "Anthropologist", 12.5);
        observer.on_run_completed(&run, 12.5);

        let events = observer.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], RunEvent::RunStarted { stage_count: 3 });
        assert_eq!(
            events[1],
            RunEvent::StageStarted {
                index: 0,
                role: "Anthropologist".to_string()
            }
        );
        assert_eq!(events[3], RunEvent::RunCompleted);
    }

    #[test]
    fn test_stage_failed_records_cause_label() {
        let observer = CollectingObserver::new();
        observer.on_stage_failed(1, "Editor", &CompletionError::auth("status 401"));

        assert_eq!(
            observer.events()[0],
            RunEvent::StageFailed {
                index: 1,
                role: "Editor".to_string(),
                cause: "auth".to_string()
            }
        );
    }

    #[test]
    fn test_noop_observer_does_nothing() {
        let observer = NoOpObserver;
        let run = RunIdentity::new();
        observer.on_run_started(&run, 3);
        observer.on_stage_failed(0, "x", &CompletionError::EmptyResponse);
        observer.on_run_completed(&run, 1.0);
        // Should not panic
    }
}
