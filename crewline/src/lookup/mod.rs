//! Best-effort insight lookup.
//!
//! Lookups enrich a stage's instruction with short search snippets. The
//! contract is deliberately best-effort: [`InsightLookup::lookup`] is
//! infallible, and any underlying failure degrades to a fallback string so
//! the pipeline stays completable when search is unavailable.

#[cfg(feature = "websearch")]
mod scout;

#[cfg(feature = "websearch")]
pub use scout::InsightScout;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Maximum number of hits a lookup may return for one query.
pub const MAX_HITS: usize = 3;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    pub title: String,
    /// Short body snippet.
    pub snippet: String,
}

impl SearchHit {
    /// Creates a new hit.
    #[must_use]
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Formats hits as `"<title>: <snippet>"` lines, capped at [`MAX_HITS`].
#[must_use]
pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .take(MAX_HITS)
        .map(|hit| format!("{}: {}", hit.title, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Capability interface for keyword lookups.
///
/// A stage holds an optional reference to a lookup value; there is no
/// registry or base type to inherit from.
#[async_trait]
pub trait InsightLookup: Send + Sync + Debug {
    /// Returns the lookup's name for logging.
    fn name(&self) -> &str;

    /// Looks up a free-text query.
    ///
    /// Never fails: implementations convert every underlying failure into
    /// a usable fallback string.
    async fn lookup(&self, query: &str) -> String;
}

/// A lookup that always returns a fixed string.
///
/// Useful offline and as the degenerate lookup in tests.
#[derive(Debug, Clone)]
pub struct StaticLookup {
    name: String,
    text: String,
}

impl StaticLookup {
    /// Creates a static lookup.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl InsightLookup for StaticLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, _query: &str) -> String {
        self.text.clone()
    }
}
