//! Fixtures shared by the unit tests of this crate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tessera_kernel::state::{State, StateId};
use tessera_kernel::task::{Cost, Fact, Operator, OperatorId, PlanningTask, Variable};

use crate::evaluation::EvaluationContext;
use crate::heuristic::{
    ConjunctionsHeuristic, EvaluationResult, Heuristic, HeuristicSet, RelaxedPlan,
};
use crate::strategy::{ConjunctionGenerationStrategy, StrategyEvent, StrategyResult};

/// `pos` runs from 0 to `n`; operator `step-i` moves from `i` to `i + 1`.
pub(crate) fn line_task(n: u32, cost: Cost) -> PlanningTask {
    let operators = (0..n)
        .map(|i| {
            Operator::new(
                format!("step-{i}"),
                vec![Fact::new(0, i)],
                vec![Fact::new(0, i + 1)],
                cost,
            )
        })
        .collect();
    PlanningTask::new(
        vec![Variable::new("pos", n + 1)],
        operators,
        vec![0],
        vec![Fact::new(0, n)],
    )
    .unwrap()
}

pub(crate) struct ConstantHeuristic {
    name: String,
    value: Option<Cost>,
}

impl ConstantHeuristic {
    pub(crate) fn new(name: &str, value: Option<Cost>) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

impl Heuristic for ConstantHeuristic {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, _state: &State) -> EvaluationResult {
        EvaluationResult {
            value: self.value,
            preferred_operators: Vec::new(),
        }
    }
}

/// Conjunctions heuristic backed by a table indexed by the first variable's
/// value. Missing entries evaluate to 0.
pub(crate) struct TableConjunctions {
    table: Vec<Option<Cost>>,
    /// Goal and per-step cost of a line task, for line relaxed plans.
    line: Option<(u32, Cost)>,
    forgetful: bool,
    version: u64,
    conjunctions: Vec<Vec<Fact>>,
    last_state: Option<StateId>,
    last_plan: RelaxedPlan,
}

impl TableConjunctions {
    pub(crate) fn new(table: Vec<Option<Cost>>) -> Self {
        Self {
            table,
            line: None,
            forgetful: false,
            version: 0,
            conjunctions: Vec::new(),
            last_state: None,
            last_plan: RelaxedPlan::default(),
        }
    }

    pub(crate) fn zero() -> Self {
        Self::new(Vec::new())
    }

    /// Produce the remaining `step-i` operators of a line task as the
    /// relaxed plan, and recommend the next one.
    pub(crate) fn with_line_plans(mut self, goal: u32, cost: Cost) -> Self {
        self.line = Some((goal, cost));
        self
    }

    /// Never claim the last relaxed plan describes any state.
    pub(crate) fn forgetful(mut self) -> Self {
        self.forgetful = true;
        self
    }
}

impl Heuristic for TableConjunctions {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "table"
    }

    fn compute(&mut self, state: &State) -> EvaluationResult {
        let pos = state.values()[0];
        let value = self.table.get(pos as usize).copied().unwrap_or(Some(0));
        self.last_state = Some(state.id());
        let mut preferred = Vec::new();
        self.last_plan = match self.line {
            Some((goal, cost)) => {
                let operators: Vec<OperatorId> =
                    (pos..goal).map(|i| OperatorId(i as usize)).collect();
                preferred.extend(operators.first().copied());
                RelaxedPlan {
                    real_cost: cost * operators.len() as Cost,
                    operators,
                }
            }
            None => RelaxedPlan::default(),
        };
        EvaluationResult {
            value,
            preferred_operators: preferred,
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl ConjunctionsHeuristic for TableConjunctions {
    fn last_relaxed_plan(&self) -> &RelaxedPlan {
        &self.last_plan
    }

    fn is_last_plan_valid_for(&self, state: &State) -> bool {
        !self.forgetful && self.last_state == Some(state.id())
    }

    fn add_conjunction(&mut self, facts: &[Fact]) -> bool {
        let mut facts = facts.to_vec();
        facts.sort_unstable();
        facts.dedup();
        if facts.len() < 2 || self.conjunctions.contains(&facts) {
            return false;
        }
        self.conjunctions.push(facts);
        self.version += 1;
        true
    }

    fn num_conjunctions(&self) -> usize {
        self.conjunctions.len()
    }
}

pub(crate) type StrategyLog = Rc<RefCell<Vec<(StrategyEvent, Cost)>>>;

/// Strategy that replays fixed verdicts and records its invocations.
pub(crate) struct ScriptedStrategy {
    on_initialization: StrategyResult,
    on_step: VecDeque<StrategyResult>,
    learn: bool,
    learned: u32,
    log: StrategyLog,
}

impl ScriptedStrategy {
    /// Steps beyond the script continue.
    pub(crate) fn new(on_initialization: StrategyResult, on_step: Vec<StrategyResult>) -> Self {
        Self {
            on_initialization,
            on_step: on_step.into(),
            learn: false,
            learned: 0,
            log: Rc::default(),
        }
    }

    /// Add one fresh conjunction on every step.
    pub(crate) fn learning(mut self) -> Self {
        self.learn = true;
        self
    }

    pub(crate) fn log(&self) -> StrategyLog {
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
        heuristics: &mut HeuristicSet,
        _ctx: &mut EvaluationContext,
        _allow_expensive: bool,
        remaining_budget: Cost,
    ) -> StrategyResult {
        self.log.borrow_mut().push((event, remaining_budget));
        match event {
            StrategyEvent::Initialization => self.on_initialization,
            StrategyEvent::Step => {
                if self.learn {
                    let facts = [Fact::new(0, self.learned), Fact::new(1, self.learned)];
                    heuristics.conjunctions_mut().add_conjunction(&facts);
                    self.learned += 1;
                }
                self.on_step.pop_front().unwrap_or(StrategyResult::Continue)
            }
        }
    }
}
