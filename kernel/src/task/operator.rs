//! Ground operators and cost adjustment.

use crate::task::fact::Fact;

/// Path and operator costs. Signed so that budgets (`bound - g`) can be
/// expressed without a separate type.
pub type Cost = i64;

/// Index of an operator in the task's operator table.
///
/// Operators are immutable for the lifetime of the task, so the index is a
/// stable identity usable as a map or set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(pub usize);

impl OperatorId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A ground operator: conjunctive precondition, unconditional effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Diagnostic name, also used for plan digests.
    pub name: String,
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Fact>,
    /// Real cost. Plan costs and bounds are always measured in real cost.
    pub cost: Cost,
}

impl Operator {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        preconditions: Vec<Fact>,
        effects: Vec<Fact>,
        cost: Cost,
    ) -> Self {
        Self {
            name: name.into(),
            preconditions,
            effects,
            cost,
        }
    }

    /// Whether every precondition holds in `values`.
    #[must_use]
    pub fn is_applicable(&self, values: &[u32]) -> bool {
        self.preconditions.iter().all(|f| f.holds_in(values))
    }

    /// Write this operator's effects into `values`.
    pub fn apply_to(&self, values: &mut [u32]) {
        for effect in &self.effects {
            values[effect.var.index()] = effect.value;
        }
    }

    /// Whether the operator makes `fact` true.
    #[must_use]
    pub fn adds(&self, fact: Fact) -> bool {
        self.effects.contains(&fact)
    }

    /// Whether the operator assigns `fact.var` to a value other than `fact.value`.
    #[must_use]
    pub fn deletes(&self, fact: Fact) -> bool {
        self.effects
            .iter()
            .any(|e| e.var == fact.var && e.value != fact.value)
    }
}

/// Cost transformation applied to operators for the search's g-values.
///
/// Real costs are unaffected; only the adjusted cost that orders the open
/// list changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostType {
    /// Adjusted cost equals real cost.
    #[default]
    Normal,
    /// Every operator costs 1.
    One,
    /// Real cost plus 1, so zero-cost operators still make progress.
    PlusOne,
}

impl CostType {
    #[must_use]
    pub fn adjusted_cost(self, op: &Operator) -> Cost {
        match self {
            Self::Normal => op.cost,
            Self::One => 1,
            Self::PlusOne => op.cost.saturating_add(1),
        }
    }
}
