//! Successor ordering for lazy expansion.
//!
//! The preferred-operator marker is a set local to one call: it is filled
//! while scanning preferred operators, consulted while emitting, and dropped
//! before returning. Nothing survives between expansions.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use tessera_kernel::task::OperatorId;

/// An operator to insert as an edge, with its preferred flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedSuccessor {
    pub operator: OperatorId,
    pub preferred: bool,
}

/// Order `applicable` operators for insertion.
///
/// `preferred` is the concatenation of every preferred heuristic's
/// recommendations and may contain duplicates; operators not in `applicable`
/// are ignored. With `rng`, both lists are shuffled before deduplication, so
/// an operator recommended several times is more likely to land early.
///
/// With `preferred_first`, deduplicated preferred operators come first in
/// detection order, followed by the remaining applicable operators in
/// enumeration order. Otherwise enumeration order is kept and only the
/// preferred flag differs.
#[must_use]
pub fn order_successors(
    mut applicable: Vec<OperatorId>,
    mut preferred: Vec<OperatorId>,
    preferred_first: bool,
    rng: Option<&mut StdRng>,
) -> Vec<OrderedSuccessor> {
    if let Some(rng) = rng {
        applicable.shuffle(rng);
        preferred.shuffle(rng);
    }

    let is_applicable: HashSet<OperatorId> = applicable.iter().copied().collect();
    let mut marked: HashSet<OperatorId> = HashSet::with_capacity(preferred.len());
    let mut ordered = Vec::with_capacity(applicable.len());

    if preferred_first {
        for op in preferred {
            if is_applicable.contains(&op) && marked.insert(op) {
                ordered.push(OrderedSuccessor {
                    operator: op,
                    preferred: true,
                });
            }
        }
        ordered.extend(
            applicable
                .into_iter()
                .filter(|op| !marked.contains(op))
                .map(|operator| OrderedSuccessor {
                    operator,
                    preferred: false,
                }),
        );
    } else {
        marked.extend(preferred.into_iter().filter(|op| is_applicable.contains(op)));
        ordered.extend(applicable.into_iter().map(|operator| OrderedSuccessor {
            operator,
            preferred: marked.contains(&operator),
        }));
    }
    ordered
}
