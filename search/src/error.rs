//! Typed search errors.
//!
//! Ordinary search outcomes (no solution within the bound, dead ends, pruned
//! successors) are not errors: they resolve to [`crate::lazy_search::SearchStatus`]
//! values or local node transitions. `SearchError` covers rejected
//! configuration and internal invariant violations only.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Options were rejected before the search started.
    #[error("invalid search options: {detail}")]
    InvalidOptions { detail: String },

    /// A bookkeeping invariant does not hold. The search cannot continue.
    #[error("search invariant violated: {detail}")]
    InvariantViolation { detail: String },
}
