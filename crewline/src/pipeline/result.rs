//! Run state machine and the immutable pipeline result.

use crate::context::{ExecutionContext, RunIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

/// The execution state of one pipeline run.
///
/// `Pending` is the only initial state; `Succeeded` and `Failed` are
/// terminal. A run advances through `Running` with strictly increasing
/// stage indices and never re-enters a passed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run has not started.
    Pending,
    /// The stage at this index is executing.
    Running(usize),
    /// Every stage produced an output.
    Succeeded,
    /// The stage at this index failed; no later stage ran.
    Failed(usize),
}

impl Default for RunState {
    fn default() -> Self {
        Self::Pending
    }
}

impl RunState {
    /// Returns true if the state is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Whether moving to `Running(next)` is a legal transition.
    #[must_use]
    pub fn can_start_stage(&self, next: usize) -> bool {
        match self {
            Self::Pending => next == 0,
            Self::Running(current) => next == current + 1,
            Self::Succeeded | Self::Failed(_) => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running(index) => write!(f, "running:{index}"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(index) => write!(f, "failed:{index}"),
        }
    }
}

/// The immutable outcome of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The exit stage's output.
    pub final_text: String,
    /// Every stage's output, in execution order.
    pub per_stage_outputs: Vec<String>,
    /// The run this result belongs to.
    pub run: RunIdentity,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: f64,
}

impl PipelineResult {
    /// Builds a result from a completed run's context.
    #[must_use]
    pub(crate) fn from_context(
        run: RunIdentity,
        context: ExecutionContext,
        duration_ms: f64,
    ) -> Self {
        let per_stage_outputs = context.into_outputs();
        let final_text = per_stage_outputs.last().cloned().unwrap_or_default();
        Self {
            final_text,
            per_stage_outputs,
            run,
            duration_ms,
        }
    }

    /// Writes `final_text` to `path`, byte-identical, no transformation.
    pub fn export_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.final_text.as_bytes())
    }
}
