//! Mock completion clients and lookups.

use crate::completion::CompletionClient;
use crate::errors::CompletionError;
use crate::lookup::InsightLookup;
use crate::persona::Persona;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One recorded completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Persona role the call was framed with.
    pub role: String,
    /// The instruction text, grounding included.
    pub instruction: String,
    /// The prior-stage context the call received.
    pub context: String,
}

/// A completion client that replays a scripted sequence of outcomes and
/// records every call.
///
/// An exhausted script answers with [`CompletionError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCompletionClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a successful outcome to the script.
    #[must_use]
    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(text.into()));
        self
    }

    /// Appends a failure outcome to the script.
    #[must_use]
    pub fn then_err(self, error: CompletionError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Returns the number of completion calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns all recorded calls in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Clears recorded calls without touching the script.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        persona: &Persona,
        instruction: &str,
        context: &str,
    ) -> Result<String, CompletionError> {
        self.calls.lock().push(RecordedCall {
            role: persona.role.clone(),
            instruction: instruction.to_string(),
            context: context.to_string(),
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

/// A completion client that answers every call with a role-stamped echo.
///
/// Handy for benches and context-accumulation assertions.
#[derive(Debug, Default)]
pub struct EchoCompletionClient {
    calls: Mutex<Vec<RecordedCall>>,
}

impl EchoCompletionClient {
    /// Creates an echo client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of completion calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns all recorded calls in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CompletionClient for EchoCompletionClient {
    async fn complete(
        &self,
        persona: &Persona,
        instruction: &str,
        context: &str,
    ) -> Result<String, CompletionError> {
        self.calls.lock().push(RecordedCall {
            role: persona.role.clone(),
            instruction: instruction.to_string(),
            context: context.to_string(),
        });
        Ok(format!("{} output", persona.role))
    }
}

/// A lookup that returns fixed text and counts its invocations.
#[derive(Debug, Default)]
pub struct CountingLookup {
    text: String,
    queries: Mutex<Vec<String>>,
}

impl CountingLookup {
    /// Creates a counting lookup returning the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of lookup calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.queries.lock().len()
    }

    /// Returns the queries received, in arrival order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl InsightLookup for CountingLookup {
    fn name(&self) -> &str {
        "counting_lookup"
    }

    async fn lookup(&self, query: &str) -> String {
        self.queries.lock().push(query.to_string());
        self.text.clone()
    }
}
