//! World contract: the minimal trait a world must implement.
//!
//! Worlds provide domain data only: a planning task. Worlds may NOT choose
//! heuristics, open lists, strategies, or search options; those are runner
//! concerns configured through [`crate::policy::RunPolicy`].

use tessera_kernel::task::{PlanningTask, TaskError};

/// A planning domain instance the runner can search.
///
/// A world provides:
/// - A unique identifier
/// - A task (variables, operators, initial state, goal)
///
/// A world does NOT provide:
/// - Heuristic values or preferred operators
/// - Search configuration or bounds
pub trait PlanningWorld {
    /// Unique world identifier (e.g., `"gripper_2"`).
    fn world_id(&self) -> String;

    /// Build the task.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] of a malformed task.
    fn build_task(&self) -> Result<PlanningTask, TaskError>;
}
