//! Stage specifications.
//!
//! A stage binds one persona to one instruction and declares whether it
//! may consult an insight lookup before its single completion call.

use crate::completion::CompletionClient;
use crate::errors::CompletionError;
use crate::lookup::InsightLookup;
use crate::persona::Persona;
use std::sync::Arc;

/// One persona-bound unit of text generation.
///
/// Created at pipeline-definition time and never mutated. Running a stage
/// makes zero or more lookup calls (one per grounding query, each
/// infallible) followed by exactly one completion call, whose output is
/// returned unmodified.
#[derive(Debug, Clone)]
pub struct StageSpec {
    persona: Persona,
    instruction: String,
    expected_output_hint: String,
    lookup: Option<Arc<dyn InsightLookup>>,
    grounding_queries: Vec<String>,
}

impl StageSpec {
    /// Creates a stage with no lookup capability.
    #[must_use]
    pub fn new(
        persona: Persona,
        instruction: impl Into<String>,
        expected_output_hint: impl Into<String>,
    ) -> Self {
        Self {
            persona,
            instruction: instruction.into(),
            expected_output_hint: expected_output_hint.into(),
            lookup: None,
            grounding_queries: Vec::new(),
        }
    }

    /// Grants the stage a lookup capability with the queries to run.
    #[must_use]
    pub fn with_lookup(
        mut self,
        lookup: Arc<dyn InsightLookup>,
        queries: Vec<String>,
    ) -> Self {
        self.lookup = Some(lookup);
        self.grounding_queries = queries;
        self
    }

    /// The role of this stage's persona.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.persona.role
    }

    /// The stage's persona.
    #[must_use]
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// The stage's task description.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Whether the stage may consult a lookup.
    #[must_use]
    pub fn lookup_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Runs the stage against the given client with prior-stage context.
    ///
    /// Lookup failures are already masked at the lookup boundary;
    /// completion failures propagate unchanged.
    pub async fn run(
        &self,
        client: &dyn CompletionClient,
        context: &str,
    ) -> Result<String, CompletionError> {
        let grounding = self.gather_grounding().await;
        let prompt = self.prompt_with_grounding(grounding.as_deref());
        client.complete(&self.persona, &prompt, context).await
    }

    async fn gather_grounding(&self) -> Option<String> {
        let lookup = self.lookup.as_ref()?;
        if self.grounding_queries.is_empty() {
            return None;
        }

        let mut notes = Vec::with_capacity(self.grounding_queries.len());
        for query in &self.grounding_queries {
            tracing::debug!(
                role = %self.persona.role,
                lookup = lookup.name(),
                query,
                "gathering grounding"
            );
            notes.push(lookup.lookup(query).await);
        }
        Some(notes.join("\n"))
    }

    fn prompt_with_grounding(&self, grounding: Option<&str>) -> String {
        let mut prompt = self.instruction.clone();
        if !self.expected_output_hint.is_empty() {
            prompt.push_str("\n\nExpected output: ");
            prompt.push_str(&self.expected_output_hint);
        }
        if let Some(notes) = grounding {
            prompt.push_str("\n\nField notes:\n");
            prompt.push_str(notes);
        }
        prompt
    }
}
