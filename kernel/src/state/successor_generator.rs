//! Applicable-operator enumeration.
//!
//! Operators are bucketed by their first precondition fact so a state only
//! inspects operators whose leading precondition it satisfies. Output is in
//! ascending operator-id order regardless of bucketing, so enumeration order
//! is a pure function of the task and the state.

use std::collections::HashMap;

use crate::state::registry::State;
use crate::task::{Fact, OperatorId, PlanningTask};

#[derive(Debug, Clone)]
pub struct SuccessorGenerator {
    preconditions: Vec<Vec<Fact>>,
    by_first_fact: HashMap<Fact, Vec<OperatorId>>,
    unconditional: Vec<OperatorId>,
}

impl SuccessorGenerator {
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        let mut by_first_fact: HashMap<Fact, Vec<OperatorId>> = HashMap::new();
        let mut unconditional = Vec::new();
        let mut preconditions = Vec::with_capacity(task.operators().len());
        for id in task.operator_ids() {
            let mut pre = task.operator(id).preconditions.clone();
            pre.sort();
            match pre.first() {
                Some(&first) => by_first_fact.entry(first).or_default().push(id),
                None => unconditional.push(id),
            }
            preconditions.push(pre);
        }
        Self {
            preconditions,
            by_first_fact,
            unconditional,
        }
    }

    /// Operators applicable in `state`, ascending by id.
    #[must_use]
    pub fn applicable_operators(&self, state: &State) -> Vec<OperatorId> {
        let values = state.values();
        let mut applicable: Vec<OperatorId> = self.unconditional.clone();
        for (var, &value) in values.iter().enumerate() {
            let Some(bucket) = self.by_first_fact.get(&Fact::new(var, value)) else {
                continue;
            };
            applicable.extend(bucket.iter().copied().filter(|id| {
                self.preconditions[id.index()]
                    .iter()
                    .all(|f| f.holds_in(values))
            }));
        }
        applicable.sort_unstable();
        applicable
    }
}
