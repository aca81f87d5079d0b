//! Progress detection: best heuristic values seen and a wall-clock cadence.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tessera_kernel::task::Cost;

use crate::evaluation::EvaluationContext;
use crate::heuristic::{HeuristicId, HeuristicSet};

/// Tracks the best (lowest) finite value each heuristic has produced.
#[derive(Debug, Clone, Default)]
pub struct SearchProgress {
    best: BTreeMap<HeuristicId, Cost>,
}

impl SearchProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the context's fresh cached values. Returns `true` if any of
    /// them improves on the best value seen so far for its heuristic.
    pub fn check_progress(&mut self, ctx: &EvaluationContext, heuristics: &HeuristicSet) -> bool {
        let mut improved = false;
        for (id, result) in ctx.fresh_results(heuristics) {
            let Some(value) = result.value else {
                continue;
            };
            match self.best.get_mut(&id) {
                Some(best) if value < *best => {
                    *best = value;
                    improved = true;
                }
                Some(_) => {}
                None => {
                    self.best.insert(id, value);
                    improved = true;
                }
            }
        }
        improved
    }

    #[must_use]
    pub fn best(&self, id: HeuristicId) -> Option<Cost> {
        self.best.get(&id).copied()
    }
}

/// Fires at most once per interval.
#[derive(Debug, Clone)]
pub struct ProgressTimer {
    interval: Duration,
    last: Instant,
}

impl ProgressTimer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// `true` if the interval elapsed since the last firing (or start).
    pub fn is_due(&mut self) -> bool {
        if self.last.elapsed() >= self.interval {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}
