//! `CounterLine`: a single counter stepped from 0 to `length`.
//!
//! One operator per position, so every state has exactly one applicable
//! operator and the unique plan has `length` steps.

use tessera_kernel::task::{Cost, Fact, Operator, PlanningTask, TaskError, Variable};

use crate::contract::PlanningWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterLine {
    pub length: u32,
    pub step_cost: Cost,
}

impl CounterLine {
    #[must_use]
    pub const fn new(length: u32, step_cost: Cost) -> Self {
        Self { length, step_cost }
    }
}

impl PlanningWorld for CounterLine {
    fn world_id(&self) -> String {
        format!("counter_{}", self.length)
    }

    fn build_task(&self) -> Result<PlanningTask, TaskError> {
        let operators = (0..self.length)
            .map(|i| {
                Operator::new(
                    format!("inc-{i}"),
                    vec![Fact::new(0, i)],
                    vec![Fact::new(0, i + 1)],
                    self.step_cost,
                )
            })
            .collect();
        PlanningTask::new(
            vec![Variable::new("counter", self.length + 1)],
            operators,
            vec![0],
            vec![Fact::new(0, self.length)],
        )
    }
}
