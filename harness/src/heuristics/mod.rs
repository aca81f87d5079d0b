//! Concrete heuristics.

pub mod goal_count;
pub mod relaxed_plan;

pub use goal_count::GoalCountHeuristic;
pub use relaxed_plan::RelaxedPlanHeuristic;
