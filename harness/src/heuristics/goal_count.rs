//! Number of unsatisfied goal facts.

use tessera_kernel::state::State;
use tessera_kernel::task::{Cost, Fact, PlanningTask};
use tessera_search::heuristic::{EvaluationResult, Heuristic};

/// Counts goal facts that do not hold. Never reports a dead end.
#[derive(Debug, Clone)]
pub struct GoalCountHeuristic {
    goal: Vec<Fact>,
}

impl GoalCountHeuristic {
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        Self {
            goal: task.goal().to_vec(),
        }
    }
}

impl Heuristic for GoalCountHeuristic {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "goal_count"
    }

    fn compute(&mut self, state: &State) -> EvaluationResult {
        let unsatisfied = self
            .goal
            .iter()
            .filter(|f| !f.holds_in(state.values()))
            .count();
        EvaluationResult::finite(Cost::try_from(unsatisfied).unwrap_or(Cost::MAX))
    }
}
