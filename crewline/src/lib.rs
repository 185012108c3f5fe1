//! # Crewline
//!
//! A linear, single-pass, role-specialized text-transformation pipeline.
//!
//! Crewline runs an ordered list of persona-bound stages against an
//! OpenAI-compatible completion gateway. Each stage receives the
//! concatenated outputs of every prior stage as context, makes exactly one
//! completion call, and feeds its output forward. The first stage failure
//! aborts the run.
//!
//! - **Stages**: a persona (role, goal, backstory) bound to one instruction
//! - **Context accumulation**: stage outputs flow strictly forward
//! - **Best-effort grounding**: stages may consult an insight lookup that
//!   degrades to a fallback string instead of failing
//! - **Abort on first failure**: a failed completion ends the run, labeled
//!   with the failing stage's role
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crewline::prelude::*;
//!
//! let config = CompletionConfig::new("sk-...");
//! let client = Arc::new(HttpCompletionClient::new(config)?);
//! let lookup = Arc::new(InsightScout::new("fallback framing"));
//!
//! let pipeline = crew::treatment_crew(client, lookup)?;
//! let result = pipeline.execute().await?;
//! println!("{}", result.final_text);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod completion;
pub mod context;
pub mod crew;
pub mod errors;
pub mod events;
pub mod lookup;
pub mod persona;
pub mod pipeline;
pub mod stage;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::completion::{
        CompletionClient, CompletionConfig, HttpCompletionClient, RetryConfig,
    };
    pub use crate::context::{ExecutionContext, RunIdentity};
    pub use crate::crew;
    pub use crate::errors::{
        CompletionError, LookupFailure, PipelineError, PreconditionError,
    };
    pub use crate::events::{
        CollectingObserver, LoggingObserver, NoOpObserver, RunObserver,
    };
    pub use crate::lookup::{InsightLookup, SearchHit, StaticLookup};
    #[cfg(feature = "websearch")]
    pub use crate::lookup::InsightScout;
    pub use crate::persona::Persona;
    pub use crate::pipeline::{
        PipelineBuilder, PipelineResult, RunState, SequentialPipeline,
    };
    pub use crate::stage::StageSpec;
}
