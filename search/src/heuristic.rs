//! Heuristic traits and the heuristic set shared by the driver, open lists,
//! and strategies.
//!
//! # Versioning
//!
//! Every heuristic reports a structural version. A heuristic whose internal
//! structure changes (e.g. a conjunction is added) must bump its version;
//! evaluation-context cache entries stamped with an older version are then
//! recomputed on next access instead of being trusted.

use tessera_kernel::state::State;
use tessera_kernel::task::{Cost, Fact, OperatorId};

/// Opaque handle to a heuristic inside a [`HeuristicSet`].
///
/// Only the set hands these out, so an id is always valid for the set that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeuristicId(usize);

impl HeuristicId {
    /// The conjunctions heuristic always occupies the first slot.
    pub const CONJUNCTIONS: Self = Self(0);
}

/// Result of evaluating one heuristic on one state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationResult {
    /// `None` means the state was recognized as a dead end.
    pub value: Option<Cost>,
    /// Recommended operators, in the heuristic's detection order.
    pub preferred_operators: Vec<OperatorId>,
}

impl EvaluationResult {
    #[must_use]
    pub fn finite(value: Cost) -> Self {
        Self {
            value: Some(value),
            preferred_operators: Vec::new(),
        }
    }

    #[must_use]
    pub fn infinite() -> Self {
        Self {
            value: None,
            preferred_operators: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_preferred(mut self, preferred: Vec<OperatorId>) -> Self {
        self.preferred_operators = preferred;
        self
    }

    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.value.is_none()
    }
}

/// A state evaluator.
pub trait Heuristic {
    fn name(&self) -> &str;

    /// Called once before the search starts.
    fn notify_initial_state(&mut self, _state: &State) {}

    /// Called whenever the driver commits `child` via `op` from `parent`.
    fn notify_transition(&mut self, _parent: &State, _op: OperatorId, _child: &State) {}

    /// Evaluate `state`.
    fn compute(&mut self, state: &State) -> EvaluationResult;

    /// Structural version; see the module docs.
    fn version(&self) -> u64 {
        0
    }
}

/// A relaxed plan computed by a relaxed-plan heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelaxedPlan {
    /// Operators in an order that is executable in the delete relaxation.
    pub operators: Vec<OperatorId>,
    /// Sum of the operators' real costs.
    pub real_cost: Cost,
}

/// Capability of the heuristic that conjunction-generation strategies refine.
///
/// The driver only ever talks to this interface. Exactly one evaluator in a
/// search implements it.
pub trait ConjunctionsHeuristic: Heuristic {
    /// The relaxed plan of the most recent [`Heuristic::compute`] call.
    fn last_relaxed_plan(&self) -> &RelaxedPlan;

    /// Whether the most recent computation was for `state`.
    fn is_last_plan_valid_for(&self, state: &State) -> bool;

    /// Add a conjunction over `facts`. Returns `false` if it was already
    /// present or is not a proper conjunction (fewer than two facts).
    /// A successful addition must bump [`Heuristic::version`].
    fn add_conjunction(&mut self, facts: &[Fact]) -> bool;

    fn num_conjunctions(&self) -> usize;
}

/// The heuristics of one search: the conjunctions heuristic plus any number
/// of auxiliary evaluators.
pub struct HeuristicSet {
    conjunctions: Box<dyn ConjunctionsHeuristic>,
    others: Vec<Box<dyn Heuristic>>,
    evaluations: u64,
}

impl HeuristicSet {
    #[must_use]
    pub fn new(conjunctions: Box<dyn ConjunctionsHeuristic>) -> Self {
        Self {
            conjunctions,
            others: Vec::new(),
            evaluations: 0,
        }
    }

    /// Register an auxiliary heuristic.
    pub fn push(&mut self, heuristic: Box<dyn Heuristic>) -> HeuristicId {
        self.others.push(heuristic);
        HeuristicId(self.others.len())
    }

    /// Number of heuristics, the conjunctions heuristic included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn contains(&self, id: HeuristicId) -> bool {
        id.0 < self.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = HeuristicId> {
        (0..self.len()).map(HeuristicId)
    }

    #[must_use]
    pub fn conjunctions(&self) -> &dyn ConjunctionsHeuristic {
        self.conjunctions.as_ref()
    }

    pub fn conjunctions_mut(&mut self) -> &mut dyn ConjunctionsHeuristic {
        self.conjunctions.as_mut()
    }

    /// Total `compute` calls issued through this set.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    #[must_use]
    pub fn name(&self, id: HeuristicId) -> &str {
        match id.0 {
            0 => self.conjunctions.name(),
            i => self.others[i - 1].name(),
        }
    }

    #[must_use]
    pub fn version(&self, id: HeuristicId) -> u64 {
        match id.0 {
            0 => self.conjunctions.version(),
            i => self.others[i - 1].version(),
        }
    }

    pub fn compute(&mut self, id: HeuristicId, state: &State) -> EvaluationResult {
        self.evaluations += 1;
        match id.0 {
            0 => self.conjunctions.compute(state),
            i => self.others[i - 1].compute(state),
        }
    }

    pub fn notify_initial_state(&mut self, id: HeuristicId, state: &State) {
        match id.0 {
            0 => self.conjunctions.notify_initial_state(state),
            i => self.others[i - 1].notify_initial_state(state),
        }
    }

    pub fn notify_transition(
        &mut self,
        id: HeuristicId,
        parent: &State,
        op: OperatorId,
        child: &State,
    ) {
        match id.0 {
            0 => self.conjunctions.notify_transition(parent, op, child),
            i => self.others[i - 1].notify_transition(parent, op, child),
        }
    }
}

impl std::fmt::Debug for HeuristicSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.ids().map(|id| self.name(id)).collect();
        f.debug_struct("HeuristicSet")
            .field("heuristics", &names)
            .field("evaluations", &self.evaluations)
            .finish()
    }
}
