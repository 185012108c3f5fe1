//! Test doubles for pipeline components.
//!
//! Exposed outside `#[cfg(test)]` so downstream crates and benches can
//! exercise pipelines without a live gateway.

mod mocks;

pub use mocks::{
    CountingLookup, EchoCompletionClient, RecordedCall, ScriptedCompletionClient,
};
