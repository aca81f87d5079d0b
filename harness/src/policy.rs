//! Run policy: the runner-side configuration of one search.
//!
//! Worlds do NOT choose heuristics or search parameters. The runner derives
//! the heuristic set, open list, strategy, and driver options from a
//! [`RunPolicy`], and records the policy in every report through
//! [`RunPolicy::to_json_value`].

use tessera_kernel::task::{Cost, CostType};
use tessera_search::open_list::DEFAULT_LAZY_BOOST;
use tessera_search::policy::LazySearchOptions;

/// Open-list construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenListKind {
    /// Lazy greedy best-first on heuristic values.
    Greedy,
    /// Lazy weighted A* on `g + weight * h`.
    WeightedAStar { weight: Cost },
}

/// Conjunction-generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    None,
    GoalPairs { max_conjunctions: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPolicy {
    pub open_list: OpenListKind,
    /// Alternate with a goal-count queue next to the relaxed-plan queue.
    pub alternate_goal_count: bool,
    /// Use the relaxed-plan heuristic's preferred operators.
    pub use_preferred: bool,
    /// Priority boost for preferred-only queues on progress.
    pub boost: i64,
    pub strategy: StrategyKind,
    /// Driver options. `preferred_heuristics` is derived from `use_preferred`.
    pub search: LazySearchOptions,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            open_list: OpenListKind::Greedy,
            alternate_goal_count: false,
            use_preferred: true,
            boost: DEFAULT_LAZY_BOOST,
            strategy: StrategyKind::GoalPairs {
                max_conjunctions: 64,
            },
            search: LazySearchOptions::default(),
        }
    }
}

impl RunPolicy {
    /// Snapshot for reports. Keys are sorted by `serde_json`'s map.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let open_list = match self.open_list {
            OpenListKind::Greedy => serde_json::json!({ "kind": "greedy" }),
            OpenListKind::WeightedAStar { weight } => {
                serde_json::json!({ "kind": "weighted_astar", "weight": weight })
            }
        };
        let strategy = match self.strategy {
            StrategyKind::None => serde_json::json!({ "kind": "none" }),
            StrategyKind::GoalPairs { max_conjunctions } => {
                serde_json::json!({ "kind": "goal_pairs", "max_conjunctions": max_conjunctions })
            }
        };
        let cost_type = match self.search.cost_type {
            CostType::Normal => "normal",
            CostType::One => "one",
            CostType::PlusOne => "plus_one",
        };
        let bound = if self.search.is_unbounded() {
            serde_json::Value::Null
        } else {
            serde_json::json!(self.search.bound)
        };
        serde_json::json!({
            "alternate_goal_count": self.alternate_goal_count,
            "boost": self.boost,
            "open_list": open_list,
            "search": {
                "bound": bound,
                "check_relaxed_plans": self.search.check_relaxed_plans,
                "cost_type": cost_type,
                "preferred_successors_first": self.search.preferred_successors_first,
                "random_seed": self.search.random_seed,
                "randomize_successors": self.search.randomize_successors,
                "reopen_closed": self.search.reopen_closed,
            },
            "strategy": strategy,
            "use_preferred": self.use_preferred,
        })
    }
}
