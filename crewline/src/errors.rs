//! Error taxonomy for crewline pipelines.
//!
//! Completion failures always propagate: a missing stage output breaks the
//! chain of dependent instructions, so there is no fallback for them.
//! Lookup failures never leave the lookup boundary (see [`crate::lookup`]).

use thiserror::Error;

/// Failure to obtain generated text from the completion endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// The endpoint rejected the credential.
    #[error("completion endpoint rejected the credential: {detail}")]
    Auth {
        /// What the endpoint reported.
        detail: String,
    },

    /// The request never produced an HTTP response.
    #[error("transport failure reaching completion endpoint: {detail}")]
    Network {
        /// The underlying transport error.
        detail: String,
    },

    /// The request exceeded its deadline.
    #[error("completion request timed out after {seconds}s")]
    Timeout {
        /// The configured deadline.
        seconds: u64,
    },

    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned status {status}: {detail}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body, truncated.
        detail: String,
    },

    /// The endpoint answered with no generated text.
    #[error("completion endpoint returned an empty response")]
    EmptyResponse,

    /// The response body could not be decoded.
    #[error("could not decode completion response: {detail}")]
    Malformed {
        /// The decode error.
        detail: String,
    },
}

impl CompletionError {
    /// Creates an auth error.
    #[must_use]
    pub fn auth(detail: impl Into<String>) -> Self {
        Self::Auth {
            detail: detail.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// Short machine-readable label for the failure cause.
    #[must_use]
    pub fn cause(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Api { .. } => "api",
            Self::EmptyResponse => "empty_response",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Failure of the underlying search call inside the insight lookup.
///
/// Never observed outside the lookup boundary; the public contract
/// converts every variant to the configured fallback string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupFailure {
    /// The search request failed in transit.
    #[error("search transport failed: {detail}")]
    Transport {
        /// The underlying transport error.
        detail: String,
    },

    /// The search succeeded but carried no usable results.
    #[error("search returned no results")]
    NoResults,

    /// The result page could not be parsed.
    #[error("could not parse search results: {detail}")]
    Malformed {
        /// The parse error.
        detail: String,
    },
}

impl LookupFailure {
    /// Creates a transport failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Creates a malformed-page failure.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

/// Error raised by pipeline construction or execution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A stage's completion call failed; the run was aborted there.
    #[error("stage '{role}' (stage {index}) failed: {source}")]
    StageFailed {
        /// Zero-based index of the failing stage.
        index: usize,
        /// Role of the failing stage's persona.
        role: String,
        /// The completion failure that aborted the run.
        #[source]
        source: CompletionError,
    },

    /// The pipeline was built with no stages.
    #[error("pipeline contains no stages")]
    Empty,
}

impl PipelineError {
    /// Labels a completion failure with the failing stage.
    #[must_use]
    pub fn stage_failed(index: usize, role: impl Into<String>, source: CompletionError) -> Self {
        Self::StageFailed {
            index,
            role: role.into(),
            source,
        }
    }
}

/// Missing credential at startup; the host must stop before any run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing credential: set {variable} in the environment before running")]
pub struct PreconditionError {
    /// The environment variable the host must supply.
    pub variable: String,
}

impl PreconditionError {
    /// Creates a precondition error for a missing variable.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}
