//! Conjunction-generation strategy contract.

use tessera_kernel::task::Cost;

use crate::evaluation::EvaluationContext;
use crate::heuristic::HeuristicSet;

/// The point in the search at which a strategy is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyEvent {
    /// Once, on the initial state, before the first step.
    Initialization,
    /// Once per committed, non-dead-end node, before it is expanded.
    Step,
}

/// Verdict of a strategy invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyResult {
    Continue,
    /// The conjunctions heuristic's last relaxed plan solves the real task
    /// from the context's state.
    Solved,
    /// The context's state cannot reach the goal within the budget.
    DeadEnd,
}

/// Online refinement of the conjunctions heuristic.
///
/// # Contract
///
/// - A strategy may add conjunctions through
///   [`HeuristicSet::conjunctions_mut`]. Each addition bumps the heuristic's
///   version, which invalidates cached values everywhere.
/// - When returning [`StrategyResult::Solved`], the conjunctions heuristic's
///   last relaxed plan must have been computed for `ctx.state()`.
pub trait ConjunctionGenerationStrategy {
    fn name(&self) -> &str;

    fn generate(
        &mut self,
        event: StrategyEvent,
        heuristics: &mut HeuristicSet,
        ctx: &mut EvaluationContext,
        allow_expensive: bool,
        remaining_budget: Cost,
    ) -> StrategyResult;
}

/// Strategy that never refines the heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConjunctions;

impl ConjunctionGenerationStrategy for NoConjunctions {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "no_conjunctions"
    }

    fn generate(
        &mut self,
        _event: StrategyEvent,
        _heuristics: &mut HeuristicSet,
        _ctx: &mut EvaluationContext,
        _allow_expensive: bool,
        _remaining_budget: Cost,
    ) -> StrategyResult {
        StrategyResult::Continue
    }
}
