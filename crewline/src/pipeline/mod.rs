//! The sequential pipeline.
//!
//! An ordered list of stages executed strictly one after another, each
//! stage's output feeding forward as context for the next. The first
//! completion failure aborts the run; there is no meaningful partial
//! result once a stage the rest depend on has failed.

mod result;

pub use result::{PipelineResult, RunState};

#[cfg(test)]
mod integration_tests;

use crate::completion::CompletionClient;
use crate::context::{ExecutionContext, RunIdentity};
use crate::errors::PipelineError;
use crate::events::{NoOpObserver, RunObserver};
use crate::stage::StageSpec;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Builder for a [`SequentialPipeline`].
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl PipelineBuilder {
    /// Creates a builder for a named pipeline.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            observer: None,
        }
    }

    /// Appends a stage; stages execute in append order.
    #[must_use]
    pub fn stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the run observer.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the pipeline against a completion client.
    ///
    /// An empty stage list is rejected; a non-empty ordered list has
    /// exactly one entry stage, one exit stage, and no cycles by
    /// construction.
    pub fn build(
        self,
        client: Arc<dyn CompletionClient>,
    ) -> Result<SequentialPipeline, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::Empty);
        }
        Ok(SequentialPipeline {
            name: self.name,
            stages: self.stages,
            client,
            observer: self.observer.unwrap_or_else(|| Arc::new(NoOpObserver)),
        })
    }
}

/// A linear, single-pass pipeline of persona-bound stages.
///
/// Reusable across runs: `execute` borrows the pipeline immutably and
/// each run owns an independent [`ExecutionContext`].
pub struct SequentialPipeline {
    name: String,
    stages: Vec<StageSpec>,
    client: Arc<dyn CompletionClient>,
    observer: Arc<dyn RunObserver>,
}

impl SequentialPipeline {
    /// The pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// The stage roles, in execution order.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.stages.iter().map(StageSpec::role).collect()
    }

    /// Executes all stages in order.
    ///
    /// On the first completion failure the run aborts immediately, no
    /// later stage executes, and the error is labeled with the failing
    /// stage's role and index.
    pub async fn execute(&self) -> Result<PipelineResult, PipelineError> {
        let run = RunIdentity::new();
        let start = Instant::now();
        let mut state = RunState::Pending;
        let mut context = ExecutionContext::new();

        self.observer.on_run_started(&run, self.stages.len());
        tracing::info!(
            run_id = %run.run_id,
            pipeline = %self.name,
            stages = self.stages.len(),
            "run started"
        );

        for (index, stage) in self.stages.iter().enumerate() {
            debug_assert!(state.can_start_stage(index));
            state = RunState::Running(index);
            self.observer.on_stage_started(index, stage.role());
            tracing::debug!(state = %state, role = stage.role(), "stage started");

            let stage_start = Instant::now();
            let prior = context.joined();

            match stage.run(self.client.as_ref(), &prior).await {
                Ok(output) => {
                    let duration_ms = elapsed_ms(stage_start);
                    self.observer.on_stage_completed(index, stage.role(), duration_ms);
                    tracing::info!(
                        stage = index,
                        role = stage.role(),
                        duration_ms,
                        chars = output.len(),
                        "stage completed"
                    );
                    context.record(index, output);
                }
                Err(error) => {
                    state = RunState::Failed(index);
                    self.observer.on_stage_failed(index, stage.role(), &error);
                    tracing::error!(
                        state = %state,
                        role = stage.role(),
                        cause = error.cause(),
                        "stage failed, aborting run"
                    );
                    return Err(PipelineError::stage_failed(index, stage.role(), error));
                }
            }
        }

        state = RunState::Succeeded;
        let duration_ms = elapsed_ms(start);
        self.observer.on_run_completed(&run, duration_ms);
        tracing::info!(run_id = %run.run_id, state = %state, duration_ms, "run completed");

        Ok(PipelineResult::from_context(run, context, duration_ms))
    }
}

impl fmt::Debug for SequentialPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialPipeline")
            .field("name", &self.name)
            .field("roles", &self.roles())
            .finish()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;
    use crate::testing::ScriptedCompletionClient;

    fn stage(role: &str) -> StageSpec {
        StageSpec::new(
            Persona::new(role, "goal", "backstory"),
            format!("{role} instruction"),
            "output hint",
        )
    }

    #[test]
    fn test_empty_pipeline_is_rejected() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let err = PipelineBuilder::new("empty").build(client).unwrap_err();
        assert_eq!(err, PipelineError::Empty);
    }

    #[tokio::test]
    async fn test_roles_in_append_order() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let pipeline = PipelineBuilder::new("test")
            .stage(stage("first"))
            .stage(stage("second"))
            .build(client)
            .unwrap();

        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.roles(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_pipeline_is_reusable_across_runs() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .then_ok("run one")
                .then_ok("run two"),
        );
        let pipeline = PipelineBuilder::new("test")
            .stage(stage("only"))
            .build(client.clone())
            .unwrap();

        let first = pipeline.execute().await.unwrap();
        let second = pipeline.execute().await.unwrap();

        assert_eq!(first.final_text, "run one");
        assert_eq!(second.final_text, "run two");
        assert_ne!(first.run.run_id, second.run.run_id);
    }
}
