//! Finite-domain planning tasks: facts, operators, and the task itself.

pub mod fact;
pub mod operator;
pub mod planning_task;

pub use fact::{Fact, VariableId};
pub use operator::{Cost, CostType, Operator, OperatorId};
pub use planning_task::{PlanningTask, TaskError, Variable};
