//! Lazy search options.

use std::time::Duration;

use tessera_kernel::task::{Cost, CostType};

use crate::error::SearchError;
use crate::heuristic::{HeuristicId, HeuristicSet};

/// Read-only configuration of one lazy search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazySearchOptions {
    /// Real-cost ceiling on plans. `Cost::MAX` means unbounded.
    pub bound: Cost,
    /// Re-admit reached nodes when a strictly cheaper path is found.
    pub reopen_closed: bool,
    /// Shuffle applicable and preferred operators before ordering.
    pub randomize_successors: bool,
    /// Emit preferred successors before the rest.
    pub preferred_successors_first: bool,
    /// Seed for successor randomization.
    pub random_seed: u64,
    /// Heuristics whose preferred operators mark successors as preferred.
    pub preferred_heuristics: Vec<HeuristicId>,
    /// Accept the conjunctions heuristic's relaxed plan as a solution when it
    /// is executable in the real task.
    pub check_relaxed_plans: bool,
    /// Wall-clock cadence of intermediate statistics lines.
    pub progress_interval: Duration,
    /// Cost transformation for g-values (real costs are unaffected).
    pub cost_type: CostType,
}

impl LazySearchOptions {
    /// Check the options against the heuristics of the search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidOptions`] for a negative bound, a zero
    /// progress interval, or a preferred heuristic not in `heuristics`.
    pub fn validate(&self, heuristics: &HeuristicSet) -> Result<(), SearchError> {
        if self.bound < 0 {
            return Err(SearchError::InvalidOptions {
                detail: format!("bound must be non-negative, got {}", self.bound),
            });
        }
        if self.progress_interval.is_zero() {
            return Err(SearchError::InvalidOptions {
                detail: "progress_interval must be positive".into(),
            });
        }
        if let Some(id) = self
            .preferred_heuristics
            .iter()
            .find(|id| !heuristics.contains(**id))
        {
            return Err(SearchError::InvalidOptions {
                detail: format!("preferred heuristic {id:?} is not registered"),
            });
        }
        Ok(())
    }

    /// `true` when no bound was configured.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.bound == Cost::MAX
    }
}

impl Default for LazySearchOptions {
    fn default() -> Self {
        Self {
            bound: Cost::MAX,
            reopen_closed: false,
            randomize_successors: false,
            preferred_successors_first: false,
            random_seed: 2011,
            preferred_heuristics: Vec::new(),
            check_relaxed_plans: true,
            progress_interval: Duration::from_secs(10),
            cost_type: CostType::Normal,
        }
    }
}
