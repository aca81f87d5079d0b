//! Edge open lists for lazy search.
//!
//! Entries are pending `(predecessor, operator)` edges. Their priority comes
//! from the context supplied at insertion time, which in lazy search is the
//! predecessor's context carried forward with the child's g-value.
//!
//! Uses `BinaryHeap` with a monotonic insertion counter as the final key
//! component, so equal-priority edges leave in FIFO order and extraction
//! order is a pure function of the insertion sequence.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use tessera_kernel::state::StateId;
use tessera_kernel::task::{Cost, OperatorId};

use crate::evaluation::EvaluationContext;
use crate::evaluator::Evaluator;
use crate::heuristic::{HeuristicId, HeuristicSet};

/// Default preferred-queue boost for lazy search.
pub const DEFAULT_LAZY_BOOST: i64 = 1000;

/// A pending edge: apply `operator` to the registered state `predecessor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub predecessor: StateId,
    pub operator: OperatorId,
}

impl Edge {
    #[must_use]
    pub const fn new(predecessor: StateId, operator: OperatorId) -> Self {
        Self {
            predecessor,
            operator,
        }
    }
}

/// Priority container over pending edges.
pub trait EdgeOpenList {
    /// Insert `edge` ranked by `ctx`. Lists may decline the edge (e.g. a
    /// preferred-only list given a non-preferred context, or an infinite key).
    fn insert(&mut self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet, edge: Edge);

    /// Remove the minimum edge, or `None` when empty.
    fn remove_min(&mut self) -> Option<Edge>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `ctx` is a dead end. The bundled lists report a dead end as
    /// soon as any of their evaluators is infinite, so every heuristic fed to
    /// them must only return infinity for true dead ends.
    fn is_dead_end(&self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet) -> bool;

    /// Reward progress by favouring preferred-only queues.
    fn boost_preferred(&mut self) {}

    /// Heuristics this list evaluates.
    fn involved_heuristics(&self, out: &mut BTreeSet<HeuristicId>);

    /// Whether every entry was inserted through a preferred context.
    fn only_contains_preferred(&self) -> bool {
        false
    }
}

/// Heap ordering key: evaluator values, then insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EdgeKey {
    values: Vec<Cost>,
    insertion: u64,
}

#[derive(Debug)]
struct HeapEntry {
    key: Reverse<EdgeKey>,
    edge: Edge,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Single queue ordered lexicographically by a list of evaluators.
#[derive(Debug)]
pub struct TieBreakingOpenList {
    evaluators: Vec<Evaluator>,
    preferred_only: bool,
    heap: BinaryHeap<HeapEntry>,
    next_insertion: u64,
    high_water: usize,
}

impl TieBreakingOpenList {
    #[must_use]
    pub fn new(evaluators: Vec<Evaluator>, preferred_only: bool) -> Self {
        Self {
            evaluators,
            preferred_only,
            heap: BinaryHeap::new(),
            next_insertion: 0,
            high_water: 0,
        }
    }

    #[must_use]
    pub fn single(evaluator: Evaluator) -> Self {
        Self::new(vec![evaluator], false)
    }

    /// Largest size the queue ever reached.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

impl EdgeOpenList for TieBreakingOpenList {
    fn insert(&mut self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet, edge: Edge) {
        if self.preferred_only && !ctx.is_preferred() {
            return;
        }
        let mut values = Vec::with_capacity(self.evaluators.len());
        for evaluator in &self.evaluators {
            let Some(value) = evaluator.evaluate(ctx, heuristics) else {
                return;
            };
            values.push(value);
        }
        let insertion = self.next_insertion;
        self.next_insertion += 1;
        self.heap.push(HeapEntry {
            key: Reverse(EdgeKey { values, insertion }),
            edge,
        });
        self.high_water = self.high_water.max(self.heap.len());
    }

    fn remove_min(&mut self) -> Option<Edge> {
        self.heap.pop().map(|entry| entry.edge)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_dead_end(&self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet) -> bool {
        self.evaluators
            .iter()
            .any(|e| e.evaluate(ctx, heuristics).is_none())
    }

    fn involved_heuristics(&self, out: &mut BTreeSet<HeuristicId>) {
        for evaluator in &self.evaluators {
            evaluator.collect_heuristics(out);
        }
    }

    fn only_contains_preferred(&self) -> bool {
        self.preferred_only
    }
}

/// Round-robin over sub-queues by priority counter; preferred-only queues
/// gain `boost` priority each time progress is rewarded.
pub struct AlternationOpenList {
    sublists: Vec<Box<dyn EdgeOpenList>>,
    priorities: Vec<i64>,
    boost: i64,
}

impl AlternationOpenList {
    #[must_use]
    pub fn new(sublists: Vec<Box<dyn EdgeOpenList>>, boost: i64) -> Self {
        let priorities = vec![0; sublists.len()];
        Self {
            sublists,
            priorities,
            boost,
        }
    }
}

impl std::fmt::Debug for AlternationOpenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlternationOpenList")
            .field("sublists", &self.sublists.len())
            .field("priorities", &self.priorities)
            .field("boost", &self.boost)
            .finish()
    }
}

impl EdgeOpenList for AlternationOpenList {
    fn insert(&mut self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet, edge: Edge) {
        for sublist in &mut self.sublists {
            sublist.insert(ctx, heuristics, edge);
        }
    }

    fn remove_min(&mut self) -> Option<Edge> {
        let best = self
            .sublists
            .iter()
            .enumerate()
            .filter(|(_, sublist)| !sublist.is_empty())
            .min_by_key(|&(i, _)| (self.priorities[i], i))
            .map(|(i, _)| i)?;
        self.priorities[best] += 1;
        self.sublists[best].remove_min()
    }

    /// Sum of sub-queue sizes; an edge held by several queues counts once per queue.
    fn len(&self) -> usize {
        self.sublists.iter().map(|s| s.len()).sum()
    }

    fn is_dead_end(&self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet) -> bool {
        self.sublists
            .iter()
            .any(|sublist| sublist.is_dead_end(ctx, heuristics))
    }

    fn boost_preferred(&mut self) {
        for (sublist, priority) in self.sublists.iter().zip(&mut self.priorities) {
            if sublist.only_contains_preferred() {
                *priority -= self.boost;
            }
        }
    }

    fn involved_heuristics(&self, out: &mut BTreeSet<HeuristicId>) {
        for sublist in &self.sublists {
            sublist.involved_heuristics(out);
        }
    }
}

/// Lazy greedy best-first open list.
///
/// One evaluator and no preferred heuristics yields a single queue. Otherwise
/// an alternation with one queue per evaluator, plus a preferred-only queue
/// per evaluator when preferred heuristics are in use.
#[must_use]
pub fn greedy(evaluators: Vec<Evaluator>, preferred: &[HeuristicId], boost: i64) -> Box<dyn EdgeOpenList> {
    if evaluators.len() == 1 && preferred.is_empty() {
        let mut evaluators = evaluators;
        return Box::new(TieBreakingOpenList::single(evaluators.remove(0)));
    }
    let mut sublists: Vec<Box<dyn EdgeOpenList>> = Vec::new();
    for evaluator in &evaluators {
        sublists.push(Box::new(TieBreakingOpenList::single(evaluator.clone())));
        if !preferred.is_empty() {
            sublists.push(Box::new(TieBreakingOpenList::new(
                vec![evaluator.clone()],
                true,
            )));
        }
    }
    Box::new(AlternationOpenList::new(sublists, boost))
}

/// Lazy (weighted) A* open list: [`greedy`] over `g + weight * h` per heuristic.
#[must_use]
pub fn weighted_astar(
    heuristics: &[HeuristicId],
    weight: Cost,
    preferred: &[HeuristicId],
    boost: i64,
) -> Box<dyn EdgeOpenList> {
    let evaluators = heuristics
        .iter()
        .map(|&h| Evaluator::weighted_astar(h, weight))
        .collect();
    greedy(evaluators, preferred, boost)
}
