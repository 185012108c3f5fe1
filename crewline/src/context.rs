//! Run-scoped execution context and run identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used when prior stage outputs are joined into context text.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Ordered record of prior stage outputs within one pipeline run.
///
/// Grows monotonically as stages complete and is discarded when the run
/// ends. Each run owns an independent context; nothing is shared between
/// runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    entries: Vec<(usize, String)>,
}

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed stage's output.
    pub fn record(&mut self, stage_index: usize, output: impl Into<String>) {
        self.entries.push((stage_index, output.into()));
    }

    /// Renders all recorded outputs, in completion order, as one context
    /// string for the next stage.
    #[must_use]
    pub fn joined(&self) -> String {
        self.entries
            .iter()
            .map(|(_, output)| output.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Returns the recorded (stage_index, output) pairs.
    #[must_use]
    pub fn entries(&self) -> &[(usize, String)] {
        &self.entries
    }

    /// Number of completed stages recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no stage has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the context, yielding outputs in completion order.
    #[must_use]
    pub fn into_outputs(self) -> Vec<String> {
        self.entries.into_iter().map(|(_, output)| output).collect()
    }
}

/// Identifies one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,
    /// When the run was created.
    pub started_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// Creates a run identity with a specific run ID.
    #[must_use]
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
        }
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_context_accumulates_in_order() {
        let mut context = ExecutionContext::new();
        assert!(context.is_empty());
        assert_eq!(context.joined(), "");

        context.record(0, "brief");
        context.record(1, "script");

        assert_eq!(context.len(), 2);
        assert_eq!(context.joined(), "brief\n\nscript");
        assert_eq!(context.entries()[1], (1, "script".to_string()));
    }

    #[test]
    fn test_into_outputs_preserves_order() {
        let mut context = ExecutionContext::new();
        context.record(0, "first");
        context.record(1, "second");
        context.record(2, "third");

        assert_eq!(
            context.into_outputs(),
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }

    #[test]
    fn test_joined_does_not_truncate_large_outputs() {
        let mut context = ExecutionContext::new();
        let big = "x".repeat(64 * 1024);
        context.record(0, big.clone());
        context.record(1, "tail");

        let joined = context.joined();
        assert!(joined.starts_with(&big));
        assert!(joined.ends_with("tail"));
        assert_eq!(joined.len(), big.len() + CONTEXT_SEPARATOR.len() + 4);
    }

    #[test]
    fn test_run_identity_is_unique() {
        let a = RunIdentity::new();
        let b = RunIdentity::new();
        assert_ne!(a.run_id, b.run_id);
    }
}
