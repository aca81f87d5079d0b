//! Tessera Search: lazy best-first search with online conjunction learning.
//!
//! This crate provides the search layer. It depends only on `tessera_kernel`;
//! concrete heuristics, strategies, and worlds live in `tessera_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! tessera_kernel  ←  tessera_search  ←  tessera_harness
//! (task, states)     (driver, lists)    (heuristics, worlds, runner)
//! ```
//!
//! # Key types
//!
//! - [`LazySearch`] -- the step-driven search driver
//! - [`HeuristicSet`] / [`ConjunctionsHeuristic`] -- evaluators and the refinable heuristic
//! - [`EvaluationContext`] -- per-node, version-stamped heuristic cache
//! - [`EdgeOpenList`] -- priority container over pending `(state, operator)` edges
//! - [`ConjunctionGenerationStrategy`] -- online heuristic refinement
//! - [`SearchSpace`] -- per-state status, g-values, and parent links
//! - [`LazySearchOptions`] -- bound, reopening, successor ordering

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod digest;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod heuristic;
pub mod lazy_search;
pub mod open_list;
pub mod plan;
pub mod policy;
pub mod progress;
pub mod search_space;
pub mod statistics;
pub mod strategy;
pub mod successors;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SearchError;
pub use evaluation::EvaluationContext;
pub use evaluator::Evaluator;
pub use heuristic::{
    ConjunctionsHeuristic, EvaluationResult, Heuristic, HeuristicId, HeuristicSet, RelaxedPlan,
};
pub use lazy_search::{LazySearch, SearchStatus};
pub use open_list::{Edge, EdgeOpenList};
pub use plan::Plan;
pub use policy::LazySearchOptions;
pub use search_space::{NodeStatus, SearchSpace};
pub use statistics::SearchStatistics;
pub use strategy::{ConjunctionGenerationStrategy, StrategyEvent, StrategyResult};
