//! `GoalPairsStrategy`: seed with goal-fact pairs, then learn pairs from
//! relaxed-plan conflicts.
//!
//! On initialization every pair of goal facts becomes a conjunction. On each
//! step the current relaxed plan is simulated in the real task; at the first
//! operator whose precondition was falsified (or, if the plan runs through,
//! at the first unsatisfied goal fact) the missing fact is paired with a fact
//! of the same condition that does hold. At most one conjunction is learned
//! per step and the total is capped.

use tessera_kernel::task::{Cost, Fact, Operator, OperatorId, PlanningTask};
use tessera_search::evaluation::EvaluationContext;
use tessera_search::heuristic::{HeuristicId, HeuristicSet};
use tessera_search::strategy::{ConjunctionGenerationStrategy, StrategyEvent, StrategyResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GoalPairsStrategy {
    operators: Vec<Operator>,
    goal: Vec<Fact>,
    max_conjunctions: usize,
}

impl GoalPairsStrategy {
    #[must_use]
    pub fn new(task: &PlanningTask, max_conjunctions: usize) -> Self {
        Self {
            operators: task.operators().to_vec(),
            goal: task.goal().to_vec(),
            max_conjunctions,
        }
    }

    fn is_goal(&self, values: &[u32]) -> bool {
        self.goal.iter().all(|f| f.holds_in(values))
    }

    fn executes_to_goal(&self, values: &[u32], plan: &[OperatorId]) -> bool {
        let mut values = values.to_vec();
        for &id in plan {
            let op = &self.operators[id.index()];
            if !op.is_applicable(&values) {
                return false;
            }
            op.apply_to(&mut values);
        }
        self.is_goal(&values)
    }

    /// Candidate pairs `[missing, holding]` at the plan's first flaw.
    fn conflict_pairs(&self, values: &[u32], plan: &[OperatorId]) -> Vec<[Fact; 2]> {
        let mut values = values.to_vec();
        let mut condition: &[Fact] = &self.goal;
        for &id in plan {
            let op = &self.operators[id.index()];
            if !op.is_applicable(&values) {
                condition = &op.preconditions;
                break;
            }
            op.apply_to(&mut values);
        }
        let Some(&missing) = condition.iter().find(|f| !f.holds_in(&values)) else {
            return Vec::new();
        };
        condition
            .iter()
            .filter(|f| f.var != missing.var && f.holds_in(&values))
            .map(|&holding| [missing, holding])
            .collect()
    }

    fn has_capacity(&self, heuristics: &HeuristicSet) -> bool {
        heuristics.conjunctions().num_conjunctions() < self.max_conjunctions
    }

    /// Evaluate `ctx` and classify it.
    fn verdict(
        &self,
        heuristics: &mut HeuristicSet,
        ctx: &mut EvaluationContext,
        remaining_budget: Cost,
    ) -> StrategyResult {
        if !heuristics
            .conjunctions()
            .is_last_plan_valid_for(ctx.state())
        {
            ctx.forget(HeuristicId::CONJUNCTIONS);
        }
        if ctx.is_heuristic_infinite(heuristics, HeuristicId::CONJUNCTIONS) {
            return StrategyResult::DeadEnd;
        }
        let plan = heuristics.conjunctions().last_relaxed_plan();
        if plan.real_cost <= remaining_budget
            && self.executes_to_goal(ctx.state().values(), &plan.operators)
        {
            return StrategyResult::Solved;
        }
        StrategyResult::Continue
    }
}

impl ConjunctionGenerationStrategy for GoalPairsStrategy {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "goal_pairs"
    }

    fn generate(
        &mut self,
        event: StrategyEvent,
        heuristics: &mut HeuristicSet,
        ctx: &mut EvaluationContext,
        allow_expensive: bool,
        remaining_budget: Cost,
    ) -> StrategyResult {
        if event == StrategyEvent::Initialization {
            for (i, &a) in self.goal.iter().enumerate() {
                for &b in &self.goal[i + 1..] {
                    if !self.has_capacity(heuristics) {
                        break;
                    }
                    heuristics.conjunctions_mut().add_conjunction(&[a, b]);
                }
            }
            debug!(
                conjunctions = heuristics.conjunctions().num_conjunctions(),
                "seeded goal pairs"
            );
        }

        let verdict = self.verdict(heuristics, ctx, remaining_budget);
        if verdict != StrategyResult::Continue
            || event != StrategyEvent::Step
            || !allow_expensive
            || !self.has_capacity(heuristics)
        {
            return verdict;
        }

        let plan = heuristics.conjunctions().last_relaxed_plan().operators.clone();
        let learned = self
            .conflict_pairs(ctx.state().values(), &plan)
            .into_iter()
            .find(|pair| heuristics.conjunctions_mut().add_conjunction(pair));
        match learned {
            Some(pair) => {
                debug!(missing = %pair[0], holding = %pair[1], "learned conjunction");
                self.verdict(heuristics, ctx, remaining_budget)
            }
            None => StrategyResult::Continue,
        }
    }
}
