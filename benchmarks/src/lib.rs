//! Shared helpers for tessera benchmark suites.

use tessera_harness::contract::PlanningWorld;
use tessera_harness::policy::{OpenListKind, RunPolicy, StrategyKind};
use tessera_harness::runner::build_search;
use tessera_harness::worlds::counter::CounterLine;
use tessera_harness::worlds::gripper::Gripper;
use tessera_harness::worlds::weighted_graph::WeightedGraph;
use tessera_kernel::task::PlanningTask;
use tessera_search::lazy_search::SearchStatus;
use tessera_search::policy::LazySearchOptions;
use tessera_search::statistics::SearchStatistics;

/// A world paired with the policy it is benchmarked under.
pub struct Regime {
    pub name: &'static str,
    pub world: Box<dyn PlanningWorld>,
    pub policy: RunPolicy,
}

/// The benchmarked regimes, smallest first.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "detour_reopen",
            world: Box::new(WeightedGraph::detour()),
            policy: RunPolicy {
                search: LazySearchOptions {
                    reopen_closed: true,
                    ..LazySearchOptions::default()
                },
                ..RunPolicy::default()
            },
        },
        Regime {
            name: "counter_200",
            world: Box::new(CounterLine::new(200, 1)),
            policy: RunPolicy::default(),
        },
        Regime {
            name: "gripper_2_goal_pairs",
            world: Box::new(Gripper::new(2)),
            policy: RunPolicy::default(),
        },
        Regime {
            name: "gripper_4_goal_pairs",
            world: Box::new(Gripper::new(4)),
            policy: RunPolicy::default(),
        },
        Regime {
            name: "gripper_4_no_learning",
            world: Box::new(Gripper::new(4)),
            policy: RunPolicy {
                strategy: StrategyKind::None,
                ..RunPolicy::default()
            },
        },
        Regime {
            name: "gripper_4_wastar_alternation",
            world: Box::new(Gripper::new(4)),
            policy: RunPolicy {
                open_list: OpenListKind::WeightedAStar { weight: 2 },
                alternate_goal_count: true,
                ..RunPolicy::default()
            },
        },
    ]
}

/// Build the regime's task once, outside the timed region.
///
/// # Panics
///
/// Panics if the world is malformed. Benchmark setup failures are fatal.
#[must_use]
pub fn prepare_task(regime: &Regime) -> PlanningTask {
    regime
        .world
        .build_task()
        .unwrap_or_else(|e| panic!("{}: {e}", regime.name))
}

/// Counters of one engine-only run.
#[derive(Debug, Clone, Copy)]
pub struct EngineRun {
    pub status: SearchStatus,
    pub statistics: SearchStatistics,
    pub evaluations: u64,
    pub conjunctions: usize,
}

/// Build and run the search for an already built task, skipping report
/// assembly.
///
/// # Panics
///
/// Panics if the search rejects its options or aborts. Benchmark runs are
/// expected to succeed.
#[must_use]
pub fn run_search_only(task: &PlanningTask, policy: &RunPolicy) -> EngineRun {
    let mut search = build_search(task, policy).expect("policy should build a search");
    let status = search.search().expect("search should not abort in benchmarks");
    EngineRun {
        status,
        statistics: *search.statistics(),
        evaluations: search.heuristics().evaluations(),
        conjunctions: search.heuristics().conjunctions().num_conjunctions(),
    }
}
