//! `StateRegistry`: canonical storage for every state the search touches.
//!
//! Each distinct variable assignment is stored exactly once and receives a
//! dense [`StateId`] in registration order. Ids are stable for the lifetime of
//! the registry, which makes them usable as keys in per-state tables.

use std::collections::HashMap;
use std::rc::Rc;

use crate::task::{Operator, PlanningTask};

/// Dense identity of a registered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

impl StateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A lightweight handle to a canonical state.
///
/// Cloning shares the underlying values. Equality is identity equality:
/// two handles from the same registry are equal iff their ids are.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    values: Rc<[u32]>,
}

impl State {
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}

/// Canonicalizing state store.
#[derive(Debug)]
pub struct StateRegistry {
    states: Vec<Rc<[u32]>>,
    index: HashMap<Rc<[u32]>, StateId>,
}

impl StateRegistry {
    /// Create a registry seeded with the task's initial state (always id 0).
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        let mut registry = Self {
            states: Vec::new(),
            index: HashMap::new(),
        };
        registry.insert(task.initial_values());
        registry
    }

    #[must_use]
    pub fn initial_state(&self) -> State {
        self.lookup(StateId(0))
    }

    /// Apply `op` to `state` and return the canonical successor.
    ///
    /// The caller guarantees applicability; effects are written blindly.
    pub fn successor(&mut self, state: &State, op: &Operator) -> State {
        debug_assert!(op.is_applicable(state.values()), "{} not applicable", op.name);
        let mut values = state.values().to_vec();
        op.apply_to(&mut values);
        self.insert(&values)
    }

    /// Resolve an id handed out by this registry.
    #[must_use]
    pub fn lookup(&self, id: StateId) -> State {
        State {
            id,
            values: Rc::clone(&self.states[id.index()]),
        }
    }

    /// Number of registered states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn insert(&mut self, values: &[u32]) -> State {
        if let Some(&id) = self.index.get(values) {
            return self.lookup(id);
        }
        let id = StateId(u32::try_from(self.states.len()).unwrap_or(u32::MAX));
        let shared: Rc<[u32]> = Rc::from(values);
        self.states.push(Rc::clone(&shared));
        self.index.insert(Rc::clone(&shared), id);
        State { id, values: shared }
    }
}
