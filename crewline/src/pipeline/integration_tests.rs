//! End-to-end pipeline tests over mock clients and lookups.

use super::{PipelineBuilder, PipelineResult};
use crate::crew;
use crate::errors::{CompletionError, PipelineError};
use crate::events::{CollectingObserver, RunEvent};
use crate::persona::Persona;
use crate::stage::StageSpec;
use crate::testing::{CountingLookup, EchoCompletionClient, ScriptedCompletionClient};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn stage(role: &str) -> StageSpec {
    StageSpec::new(
        Persona::new(role, format!("{role} goal"), format!("{role} backstory")),
        format!("{role} instruction"),
        "output hint",
    )
}

fn three_stage_builder() -> PipelineBuilder {
    PipelineBuilder::new("test")
        .stage(stage("strategist"))
        .stage(stage("director"))
        .stage(stage("editor"))
}

#[tokio::test]
async fn all_success_makes_one_call_per_stage() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .then_ok("brief")
            .then_ok("script")
            .then_ok("treatment"),
    );
    let pipeline = three_stage_builder().build(client.clone()).unwrap();

    let result: PipelineResult = pipeline.execute().await.unwrap();

    assert_eq!(client.call_count(), 3);
    assert_eq!(result.per_stage_outputs.len(), 3);
    assert_eq!(result.final_text, "treatment");
}

#[tokio::test]
async fn middle_stage_failure_skips_the_rest() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .then_ok("brief")
            .then_err(CompletionError::network("connection reset")),
    );
    let lookup = Arc::new(CountingLookup::new("snippet"));
    let pipeline = PipelineBuilder::new("test")
        .stage(stage("strategist"))
        .stage(stage("director"))
        .stage(stage("editor").with_lookup(lookup.clone(), vec!["q".to_string()]))
        .build(client.clone())
        .unwrap();

    let err = pipeline.execute().await.unwrap_err();

    // Stage 3's client and tool were never touched.
    assert_eq!(client.call_count(), 2);
    assert_eq!(lookup.call_count(), 0);
    match err {
        PipelineError::StageFailed { index, role, source } => {
            assert_eq!(index, 1);
            assert_eq!(role, "director");
            assert_eq!(source, CompletionError::network("connection reset"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn context_accumulates_prior_outputs_in_order() {
    let client = Arc::new(EchoCompletionClient::new());
    let pipeline = three_stage_builder().build(client.clone()).unwrap();

    pipeline.execute().await.unwrap();

    let calls = client.calls();
    assert_eq!(calls[0].context, "");
    assert_eq!(calls[1].context, "strategist output");
    assert_eq!(calls[2].context, "strategist output\n\ndirector output");
}

#[tokio::test]
async fn observer_sees_the_full_state_walk() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .then_ok("brief")
            .then_ok("script")
            .then_ok("treatment"),
    );
    let observer = Arc::new(CollectingObserver::new());
    let pipeline = three_stage_builder()
        .observer(observer.clone())
        .build(client)
        .unwrap();

    pipeline.execute().await.unwrap();

    let events = observer.events();
    assert_eq!(events.len(), 8);
    assert_eq!(events[0], RunEvent::RunStarted { stage_count: 3 });
    assert_eq!(
        events[1],
        RunEvent::StageStarted {
            index: 0,
            role: "strategist".to_string()
        }
    );
    assert_eq!(events[7], RunEvent::RunCompleted);

    // Stage indices strictly increase and no stage is re-entered.
    let started: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            RunEvent::StageStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![0, 1, 2]);
}

// Scenario A: credential present, both external calls succeed.
#[tokio::test]
async fn scenario_full_crew_run_succeeds() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .then_ok("the brief")
            .then_ok("the script")
            .then_ok("# Final Treatment"),
    );
    let lookup = Arc::new(CountingLookup::new("live snippet"));
    let pipeline = crew::treatment_crew(client.clone(), lookup).unwrap();

    let result = pipeline.execute().await.unwrap();

    assert_eq!(result.final_text, "# Final Treatment");
    assert_eq!(result.per_stage_outputs.len(), 3);
    assert_eq!(client.call_count(), 3);
}

// Scenario B: the gateway rejects the credential on the first stage.
#[tokio::test]
async fn scenario_auth_failure_on_first_stage_aborts_everything() {
    let client = Arc::new(
        ScriptedCompletionClient::new().then_err(CompletionError::auth("status 401")),
    );
    let lookup = Arc::new(CountingLookup::new("live snippet"));
    let observer = Arc::new(CollectingObserver::new());
    let pipeline = crew::treatment_builder(lookup)
        .observer(observer.clone())
        .build(client.clone())
        .unwrap();

    let err = pipeline.execute().await.unwrap_err();

    assert_eq!(client.call_count(), 1);
    match err {
        PipelineError::StageFailed { index, ref source, .. } => {
            assert_eq!(index, 0);
            assert_eq!(source.cause(), "auth");
        }
        ref other => panic!("unexpected error: {other}"),
    }
    // No result ever reached the export surface.
    assert!(observer
        .events()
        .iter()
        .all(|event| *event != RunEvent::RunCompleted));
}

// Scenario C: the search tool fails, the stage grounds on the fallback
// and the run proceeds normally.
#[tokio::test]
async fn scenario_lookup_fallback_still_completes_the_run() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .then_ok("brief")
            .then_ok("script")
            .then_ok("treatment"),
    );
    // CountingLookup returning the fallback models a degraded scout: the
    // lookup boundary never raises, it substitutes text.
    let lookup = Arc::new(CountingLookup::new(crew::LOOKUP_FALLBACK));
    let pipeline = crew::treatment_crew(client.clone(), lookup.clone()).unwrap();

    let result = pipeline.execute().await.unwrap();

    assert_eq!(result.final_text, "treatment");
    assert!(lookup.call_count() > 0);
    let first_call = &client.calls()[0];
    assert!(first_call.instruction.contains(crew::LOOKUP_FALLBACK));
}
