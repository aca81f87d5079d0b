//! Scalar evaluators that turn an evaluation context into an open-list key.

use std::collections::BTreeSet;

use tessera_kernel::task::Cost;

use crate::evaluation::EvaluationContext;
use crate::heuristic::{HeuristicId, HeuristicSet};

/// A scalar evaluator. `None` from [`Evaluator::evaluate`] means infinite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluator {
    /// The context's g-value.
    G,
    /// A heuristic's value.
    Heuristic(HeuristicId),
    /// `weight * inner`.
    Weighted(Box<Evaluator>, Cost),
    /// Sum of all parts; infinite if any part is.
    Sum(Vec<Evaluator>),
}

impl Evaluator {
    /// `g + weight * h`, the weighted A* key.
    #[must_use]
    pub fn weighted_astar(h: HeuristicId, weight: Cost) -> Self {
        let h = if weight == 1 {
            Self::Heuristic(h)
        } else {
            Self::Weighted(Box::new(Self::Heuristic(h)), weight)
        };
        Self::Sum(vec![Self::G, h])
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet) -> Option<Cost> {
        match self {
            Self::G => Some(ctx.g()),
            Self::Heuristic(id) => ctx.heuristic_value(heuristics, *id),
            Self::Weighted(inner, weight) => inner
                .evaluate(ctx, heuristics)
                .map(|v| v.saturating_mul(*weight)),
            Self::Sum(parts) => {
                let mut total: Cost = 0;
                for part in parts {
                    total = total.saturating_add(part.evaluate(ctx, heuristics)?);
                }
                Some(total)
            }
        }
    }

    /// Heuristics this evaluator reads.
    pub fn collect_heuristics(&self, out: &mut BTreeSet<HeuristicId>) {
        match self {
            Self::G => {}
            Self::Heuristic(id) => {
                out.insert(*id);
            }
            Self::Weighted(inner, _) => inner.collect_heuristics(out),
            Self::Sum(parts) => {
                for part in parts {
                    part.collect_heuristics(out);
                }
            }
        }
    }
}
