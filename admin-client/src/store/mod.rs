//! Client-side stores
//!
//! Stores hold the last authoritative server read. They never merge pushed
//! payloads: every refresh is a full re-fetch.

mod orders;
mod waiter_calls;

pub use orders::{OrderBuckets, OrderStore, ReloadReport};
pub use waiter_calls::WaiterCallStore;

use shared::ListOutcome;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{ClientError, ClientResult, ErrorKind};

/// Outcome of a staff mutation. Errors are reported here, never thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationResult {
    Success,
    Failure { kind: ErrorKind, message: String },
}

impl MutationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationResult::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            MutationResult::Success => None,
            MutationResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            MutationResult::Success => None,
            MutationResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<ClientResult<()>> for MutationResult {
    fn from(result: ClientResult<()>) -> Self {
        match result {
            Ok(()) => MutationResult::Success,
            Err(e) => failure(&e),
        }
    }
}

fn failure(error: &ClientError) -> MutationResult {
    let message = error.to_string();
    MutationResult::Failure {
        kind: error.kind(),
        message: if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        },
    }
}

/// Turn one list fetch into the items to store.
///
/// `None` means keep the previous value; the reason has been logged.
fn settle<T>(what: &str, result: ClientResult<ListOutcome<T>>) -> Option<Vec<T>> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(what, "Fetch failed, keeping previous data: {}", e);
            return None;
        }
    };
    match &outcome {
        ListOutcome::Empty => tracing::debug!(what, "List field absent, treating as empty"),
        ListOutcome::Malformed(reason) => {
            tracing::warn!(what, reason = %reason, "Malformed list response, keeping previous data")
        }
        ListOutcome::Ok(_) => {}
    }
    outcome.into_items()
}

/// Counts one in-flight bulk operation for its lifetime
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
