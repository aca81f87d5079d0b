//! Lazy search acceptance scenarios: unbounded line, bound below the optimum,
//! initialization dead end, preferred-first edge order, relaxed plan solving
//! the initial state, and reopening on a cheaper path.

use lock_tests::search_test_helpers::{RecordingOpenList, ScriptedStrategy, TableHeuristic};
use tessera_harness::contract::PlanningWorld;
use tessera_harness::heuristics::RelaxedPlanHeuristic;
use tessera_harness::worlds::counter::CounterLine;
use tessera_harness::worlds::gripper::Gripper;
use tessera_harness::worlds::weighted_graph::WeightedGraph;
use tessera_kernel::state::StateId;
use tessera_kernel::task::{Fact, Operator, OperatorId, PlanningTask, Variable};
use tessera_search::evaluator::Evaluator;
use tessera_search::heuristic::{HeuristicId, HeuristicSet};
use tessera_search::lazy_search::{LazySearch, SearchStatus};
use tessera_search::open_list::{EdgeOpenList, TieBreakingOpenList};
use tessera_search::policy::LazySearchOptions;
use tessera_search::strategy::{NoConjunctions, StrategyEvent, StrategyResult};

fn greedy() -> Box<dyn EdgeOpenList> {
    Box::new(TieBreakingOpenList::single(Evaluator::Heuristic(
        HeuristicId::CONJUNCTIONS,
    )))
}

fn table(values: Vec<Option<i64>>) -> HeuristicSet {
    HeuristicSet::new(Box::new(TableHeuristic::new(values)))
}

// ---------------------------------------------------------------------------
// Unit-cost line, unbounded: three actions
// ---------------------------------------------------------------------------

#[test]
fn unbounded_line_solved_with_three_actions() {
    let task = CounterLine::new(3, 1).build_task().unwrap();
    let mut search = LazySearch::new(
        &task,
        table(vec![]),
        greedy(),
        Box::new(NoConjunctions),
        LazySearchOptions::default(),
    )
    .unwrap();

    assert_eq!(search.search().unwrap(), SearchStatus::Solved);
    let plan = search.plan().unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.real_cost, 3);
    assert_eq!(plan.operator_names(&task), vec!["inc-0", "inc-1", "inc-2"]);
    assert!(task.validate_plan_from(task.initial_values(), &plan.operators));
}

// ---------------------------------------------------------------------------
// Bound below the unique optimal cost
// ---------------------------------------------------------------------------

#[test]
fn bound_below_optimum_fails_on_finite_space() {
    let task = CounterLine::new(3, 1).build_task().unwrap();
    let options = LazySearchOptions {
        bound: 2,
        ..LazySearchOptions::default()
    };
    let mut search =
        LazySearch::new(&task, table(vec![]), greedy(), Box::new(NoConjunctions), options)
            .unwrap();

    assert_eq!(search.search().unwrap(), SearchStatus::Failed);
    assert!(search.plan().is_none());
    // The goal state is never even generated.
    assert_eq!(search.registry().len(), 3);
}

// ---------------------------------------------------------------------------
// Strategy reports the initial state dead
// ---------------------------------------------------------------------------

#[test]
fn initialization_dead_end_fails_immediately() {
    let task = CounterLine::new(3, 1).build_task().unwrap();
    let strategy = ScriptedStrategy::new(StrategyResult::DeadEnd);
    let calls = strategy.log();
    let mut search = LazySearch::new(
        &task,
        table(vec![]),
        greedy(),
        Box::new(strategy),
        LazySearchOptions::default(),
    )
    .unwrap();

    assert_eq!(search.step().unwrap(), SearchStatus::Failed);
    assert_eq!(search.statistics().expanded, 0);
    assert!(search.expansion_log().is_empty());
    let events: Vec<StrategyEvent> = calls.borrow().iter().map(|c| c.event).collect();
    assert_eq!(events, vec![StrategyEvent::Initialization]);
}

// ---------------------------------------------------------------------------
// Preferred successors first: two preferred, three others
// ---------------------------------------------------------------------------

/// `x = 0` offers `op-0` .. `op-4`, each leading to its own state.
fn fan_out_task() -> PlanningTask {
    let operators = (0..5)
        .map(|k| {
            Operator::new(
                format!("op-{k}"),
                vec![Fact::new(0, 0)],
                vec![Fact::new(0, k + 1)],
                1,
            )
        })
        .collect();
    PlanningTask::new(
        vec![Variable::new("x", 6)],
        operators,
        vec![0],
        vec![Fact::new(0, 5)],
    )
    .unwrap()
}

#[test]
fn preferred_successors_inserted_first_in_detection_order() {
    let task = fan_out_task();
    let heuristics = HeuristicSet::new(Box::new(
        TableHeuristic::new(vec![]).with_preferred(vec![OperatorId(3), OperatorId(1)]),
    ));
    let open_list = RecordingOpenList::new(greedy());
    let inserted = open_list.log();
    let options = LazySearchOptions {
        preferred_successors_first: true,
        preferred_heuristics: vec![HeuristicId::CONJUNCTIONS],
        ..LazySearchOptions::default()
    };
    let mut search = LazySearch::new(
        &task,
        heuristics,
        Box::new(open_list),
        Box::new(NoConjunctions),
        options,
    )
    .unwrap();

    assert_eq!(search.step().unwrap(), SearchStatus::InProgress);
    let log = inserted.borrow();
    let order: Vec<usize> = log.iter().map(|e| e.edge.operator.index()).collect();
    assert_eq!(order, vec![3, 1, 0, 2, 4]);
    let flags: Vec<bool> = log.iter().map(|e| e.preferred).collect();
    assert_eq!(flags, vec![true, true, false, false, false]);
    assert!(log.iter().all(|e| e.edge.predecessor == StateId(0) && e.g == 1));
}

#[test]
fn default_order_keeps_enumeration_and_flags_preferred() {
    let task = fan_out_task();
    let heuristics = HeuristicSet::new(Box::new(
        TableHeuristic::new(vec![]).with_preferred(vec![OperatorId(3), OperatorId(1)]),
    ));
    let open_list = RecordingOpenList::new(greedy());
    let inserted = open_list.log();
    let options = LazySearchOptions {
        preferred_heuristics: vec![HeuristicId::CONJUNCTIONS],
        ..LazySearchOptions::default()
    };
    let mut search = LazySearch::new(
        &task,
        heuristics,
        Box::new(open_list),
        Box::new(NoConjunctions),
        options,
    )
    .unwrap();

    search.step().unwrap();
    let log = inserted.borrow();
    let order: Vec<usize> = log.iter().map(|e| e.edge.operator.index()).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
    let flags: Vec<bool> = log.iter().map(|e| e.preferred).collect();
    assert_eq!(flags, vec![false, true, false, true, false]);
}

// ---------------------------------------------------------------------------
// Relaxed plan of the initial state is a real plan
// ---------------------------------------------------------------------------

#[test]
fn relaxed_plan_solves_during_initialization() {
    let task = Gripper::new(1).build_task().unwrap();
    let heuristics = HeuristicSet::new(Box::new(RelaxedPlanHeuristic::new(&task)));
    let mut search = LazySearch::new(
        &task,
        heuristics,
        greedy(),
        Box::new(NoConjunctions),
        LazySearchOptions::default(),
    )
    .unwrap();

    search.initialize().unwrap();
    assert!(search.plan().is_some());
    assert_eq!(search.step().unwrap(), SearchStatus::Solved);
    assert_eq!(search.statistics().expanded, 0);

    let plan = search.plan().unwrap();
    assert_eq!(plan.real_cost, 3);
    assert_eq!(plan.relaxed_suffix_len, plan.len());
    assert!(task.validate_plan_from(task.initial_values(), &plan.operators));
    assert!(search
        .heuristics()
        .conjunctions()
        .is_last_plan_valid_for(&search.registry().initial_state()));
}

#[test]
fn relaxed_plan_over_bound_does_not_solve_initialization() {
    let task = Gripper::new(1).build_task().unwrap();
    let heuristics = HeuristicSet::new(Box::new(RelaxedPlanHeuristic::new(&task)));
    let options = LazySearchOptions {
        bound: 2,
        ..LazySearchOptions::default()
    };
    let mut search =
        LazySearch::new(&task, heuristics, greedy(), Box::new(NoConjunctions), options).unwrap();

    search.initialize().unwrap();
    assert!(search.plan().is_none());
    assert_eq!(search.search().unwrap(), SearchStatus::Failed);
}

// ---------------------------------------------------------------------------
// Reopening on a cheaper path
// ---------------------------------------------------------------------------

fn detour_search(task: &PlanningTask, reopen_closed: bool) -> LazySearch<'_> {
    let options = LazySearchOptions {
        reopen_closed,
        ..LazySearchOptions::default()
    };
    LazySearch::new(
        task,
        table(WeightedGraph::detour_estimates()),
        greedy(),
        Box::new(NoConjunctions),
        options,
    )
    .unwrap()
}

#[test]
fn reopening_finds_cheaper_path_through_reached_nodes() {
    let graph = WeightedGraph::detour();
    let task = graph.build_task().unwrap();
    let mut search = detour_search(&task, true);

    assert_eq!(search.search().unwrap(), SearchStatus::Solved);
    let plan = search.plan().unwrap();
    assert_eq!(plan.real_cost, 103);
    assert_eq!(
        plan.operator_names(&task),
        vec!["move-s-a", "move-a-b", "move-b-c", "move-c-g"]
    );
    assert_eq!(search.statistics().reopened, 2);
}

#[test]
fn without_reopening_first_path_is_kept() {
    let graph = WeightedGraph::detour();
    let task = graph.build_task().unwrap();
    let mut search = detour_search(&task, false);

    assert_eq!(search.search().unwrap(), SearchStatus::Solved);
    let plan = search.plan().unwrap();
    assert_eq!(plan.real_cost, 111);
    assert_eq!(
        plan.operator_names(&task),
        vec!["move-s-b", "move-b-c", "move-c-g"]
    );
    assert_eq!(search.statistics().reopened, 0);
}
