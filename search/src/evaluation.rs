//! Per-node evaluation contexts with a version-stamped heuristic cache.

use std::collections::BTreeMap;

use tessera_kernel::state::State;
use tessera_kernel::task::{Cost, OperatorId};

use crate::heuristic::{EvaluationResult, HeuristicId, HeuristicSet};

#[derive(Debug, Clone)]
struct CachedEvaluation {
    result: EvaluationResult,
    version: u64,
}

/// Heuristic results for one state, each stamped with the heuristic version
/// it was computed under.
#[derive(Debug, Clone, Default)]
pub struct HeuristicCache {
    entries: BTreeMap<HeuristicId, CachedEvaluation>,
}

impl HeuristicCache {
    /// Entry for `id` if it was computed under the heuristic's current version.
    fn fresh(&self, id: HeuristicId, heuristics: &HeuristicSet) -> Option<&EvaluationResult> {
        self.entries
            .get(&id)
            .filter(|cached| cached.version == heuristics.version(id))
            .map(|cached| &cached.result)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State, path cost, preferredness, and cached heuristic results of one node.
///
/// Contexts are rebuilt for every node the driver materializes. Edge
/// insertion carries the parent's context forward with the child's g and
/// preferred flag, so open lists rank edges by the parent's heuristic values.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    state: State,
    g: Cost,
    preferred: bool,
    cache: HeuristicCache,
}

impl EvaluationContext {
    #[must_use]
    pub fn new(state: State, g: Cost, preferred: bool) -> Self {
        Self {
            state,
            g,
            preferred,
            cache: HeuristicCache::default(),
        }
    }

    /// A context sharing this one's state and cache but with a different
    /// g-value and preferred flag.
    #[must_use]
    pub fn carried(&self, g: Cost, preferred: bool) -> Self {
        Self {
            state: self.state.clone(),
            g,
            preferred,
            cache: self.cache.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn g(&self) -> Cost {
        self.g
    }

    #[must_use]
    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    /// Result for `id`, computing it if absent or stale.
    pub fn result(&mut self, heuristics: &mut HeuristicSet, id: HeuristicId) -> &EvaluationResult {
        if self.cache.fresh(id, heuristics).is_none() {
            let result = heuristics.compute(id, &self.state);
            let version = heuristics.version(id);
            self.cache
                .entries
                .insert(id, CachedEvaluation { result, version });
        }
        &self.cache.entries[&id].result
    }

    /// Heuristic value for `id`; `None` if infinite.
    pub fn heuristic_value(&mut self, heuristics: &mut HeuristicSet, id: HeuristicId) -> Option<Cost> {
        self.result(heuristics, id).value
    }

    pub fn is_heuristic_infinite(&mut self, heuristics: &mut HeuristicSet, id: HeuristicId) -> bool {
        self.result(heuristics, id).is_infinite()
    }

    pub fn preferred_operators(
        &mut self,
        heuristics: &mut HeuristicSet,
        id: HeuristicId,
    ) -> Vec<OperatorId> {
        self.result(heuristics, id).preferred_operators.clone()
    }

    /// Fresh cached results, without computing anything.
    pub fn fresh_results<'a>(
        &'a self,
        heuristics: &'a HeuristicSet,
    ) -> impl Iterator<Item = (HeuristicId, &'a EvaluationResult)> + 'a {
        self.cache
            .entries
            .keys()
            .filter_map(move |&id| self.cache.fresh(id, heuristics).map(|r| (id, r)))
    }

    /// Store `result` for `id` stamped with the heuristic's current version.
    ///
    /// Used after a structural mutation when the caller knows the previous
    /// result still describes this state.
    pub fn reseed(&mut self, heuristics: &HeuristicSet, id: HeuristicId, result: EvaluationResult) {
        let version = heuristics.version(id);
        self.cache
            .entries
            .insert(id, CachedEvaluation { result, version });
    }

    /// Drop the entry for `id` so the next access recomputes it.
    pub fn forget(&mut self, id: HeuristicId) {
        self.cache.entries.remove(&id);
    }

    #[must_use]
    pub fn cache(&self) -> &HeuristicCache {
        &self.cache
    }
}
