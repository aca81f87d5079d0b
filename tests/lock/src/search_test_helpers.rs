//! Instrumented collaborators for driving `LazySearch` in lock tests.
//!
//! Every helper records what the driver handed it through a shared
//! `Rc<RefCell<..>>` log, so a test can keep a handle after boxing the
//! helper into the search.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use tessera_kernel::state::{State, StateId};
use tessera_kernel::task::{Cost, Fact, OperatorId, PlanningTask};
use tessera_search::evaluation::EvaluationContext;
use tessera_search::heuristic::{
    ConjunctionsHeuristic, EvaluationResult, Heuristic, HeuristicId, HeuristicSet, RelaxedPlan,
};
use tessera_search::open_list::{Edge, EdgeOpenList};
use tessera_search::strategy::{ConjunctionGenerationStrategy, StrategyEvent, StrategyResult};

/// Conjunctions heuristic with fixed values indexed by the first variable.
///
/// Its relaxed plan is always empty, so it only describes a real plan in goal
/// states. Values beyond the table are 0.
pub struct TableHeuristic {
    values: Vec<Option<Cost>>,
    preferred: Vec<OperatorId>,
    last_state: Option<StateId>,
    plan: RelaxedPlan,
}

impl TableHeuristic {
    #[must_use]
    pub fn new(values: Vec<Option<Cost>>) -> Self {
        Self {
            values,
            preferred: Vec::new(),
            last_state: None,
            plan: RelaxedPlan::default(),
        }
    }

    /// Recommend `preferred` (in this order) in every state.
    #[must_use]
    pub fn with_preferred(mut self, preferred: Vec<OperatorId>) -> Self {
        self.preferred = preferred;
        self
    }
}

impl Heuristic for TableHeuristic {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "table"
    }

    fn compute(&mut self, state: &State) -> EvaluationResult {
        self.last_state = Some(state.id());
        let value = self
            .values
            .get(state.values()[0] as usize)
            .copied()
            .unwrap_or(Some(0));
        EvaluationResult {
            value,
            preferred_operators: self.preferred.clone(),
        }
    }
}

impl ConjunctionsHeuristic for TableHeuristic {
    fn last_relaxed_plan(&self) -> &RelaxedPlan {
        &self.plan
    }

    fn is_last_plan_valid_for(&self, state: &State) -> bool {
        self.last_state == Some(state.id())
    }

    fn add_conjunction(&mut self, _facts: &[Fact]) -> bool {
        false
    }

    fn num_conjunctions(&self) -> usize {
        0
    }
}

/// An edge as handed to [`EdgeOpenList::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedEdge {
    pub edge: Edge,
    pub g: Cost,
    pub preferred: bool,
}

pub type InsertLog = Rc<RefCell<Vec<InsertedEdge>>>;

/// Delegating open list that records every insertion.
pub struct RecordingOpenList {
    inner: Box<dyn EdgeOpenList>,
    log: InsertLog,
}

impl RecordingOpenList {
    #[must_use]
    pub fn new(inner: Box<dyn EdgeOpenList>) -> Self {
        Self {
            inner,
            log: Rc::default(),
        }
    }

    #[must_use]
    pub fn log(&self) -> InsertLog {
        Rc::clone(&self.log)
    }
}

impl EdgeOpenList for RecordingOpenList {
    fn insert(&mut self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet, edge: Edge) {
        self.log.borrow_mut().push(InsertedEdge {
            edge,
            g: ctx.g(),
            preferred: ctx.is_preferred(),
        });
        self.inner.insert(ctx, heuristics, edge);
    }

    fn remove_min(&mut self) -> Option<Edge> {
        self.inner.remove_min()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_dead_end(&self, ctx: &mut EvaluationContext, heuristics: &mut HeuristicSet) -> bool {
        self.inner.is_dead_end(ctx, heuristics)
    }

    fn boost_preferred(&mut self) {
        self.inner.boost_preferred();
    }

    fn involved_heuristics(&self, out: &mut BTreeSet<HeuristicId>) {
        self.inner.involved_heuristics(out);
    }
}

/// A strategy invocation as seen by [`ScriptedStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyCall {
    pub event: StrategyEvent,
    pub state: StateId,
    pub g: Cost,
    pub remaining_budget: Cost,
}

pub type CallLog = Rc<RefCell<Vec<StrategyCall>>>;

/// Strategy that records every call and answers with a fixed verdict on
/// initialization, `Continue` otherwise.
pub struct ScriptedStrategy {
    on_initialization: StrategyResult,
    log: CallLog,
}

impl ScriptedStrategy {
    #[must_use]
    pub fn new(on_initialization: StrategyResult) -> Self {
        Self {
            on_initialization,
            log: Rc::default(),
        }
    }

    #[must_use]
    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }
}

impl ConjunctionGenerationStrategy for ScriptedStrategy {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(
        &mut self,
        event: StrategyEvent,
        _heuristics: &mut HeuristicSet,
        ctx: &mut EvaluationContext,
        _allow_expensive: bool,
        remaining_budget: Cost,
    ) -> StrategyResult {
        self.log.borrow_mut().push(StrategyCall {
            event,
            state: ctx.state().id(),
            g: ctx.g(),
            remaining_budget,
        });
        match event {
            StrategyEvent::Initialization => self.on_initialization,
            StrategyEvent::Step => StrategyResult::Continue,
        }
    }
}

/// Resolve operator names produced by a run report.
///
/// # Panics
///
/// Panics if a name is not an operator of `task`.
#[must_use]
pub fn operator_ids(task: &PlanningTask, names: &[String]) -> Vec<OperatorId> {
    names
        .iter()
        .map(|name| {
            task.operator_ids()
                .find(|&id| task.operator(id).name == *name)
                .unwrap_or_else(|| panic!("unknown operator {name}"))
        })
        .collect()
}
