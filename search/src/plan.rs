//! The artifact produced by a successful search.

use tessera_kernel::task::{Cost, OperatorId, PlanningTask};

use crate::digest::{canonical_hash, DOMAIN_PLAN};

/// Operator sequence from the initial state to a goal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub operators: Vec<OperatorId>,
    /// Total real cost, always within the search bound.
    pub real_cost: Cost,
    /// Number of trailing operators taken from a relaxed plan rather than
    /// from the search's parent links.
    pub relaxed_suffix_len: usize,
}

impl Plan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Operator names, one per step.
    #[must_use]
    pub fn operator_names<'t>(&self, task: &'t PlanningTask) -> Vec<&'t str> {
        self.operators
            .iter()
            .map(|&id| task.operator(id).name.as_str())
            .collect()
    }

    /// Digest over the newline-terminated operator names.
    #[must_use]
    pub fn digest(&self, task: &PlanningTask) -> String {
        let mut data = Vec::new();
        for name in self.operator_names(task) {
            data.extend_from_slice(name.as_bytes());
            data.push(b'\n');
        }
        canonical_hash(DOMAIN_PLAN, &data)
    }
}
