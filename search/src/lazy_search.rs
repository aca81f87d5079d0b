//! Lazy best-first search with online conjunction learning.
//!
//! # Step protocol
//!
//! The driver holds one pending edge at a time (none for the root). Each
//! [`LazySearch::step`] materializes that edge's target, commits it if it is
//! new or reached more cheaply (with reopening enabled), consults the
//! conjunction-generation strategy, and either returns a solution, prunes a
//! dead end, or expands the node. It then pops the next edge.
//!
//! Children are never evaluated at generation time: edges are ranked by the
//! parent's heuristic values and the child's g, and evaluated only when
//! popped.
//!
//! # Invariants
//!
//! - `current_g` / `current_real_g` are the parent node's g-values plus the
//!   incoming operator's adjusted / real cost.
//! - No edge whose real g exceeds the bound is ever inserted or committed.
//!   An edge whose predecessor was reopened at a higher real g is dropped
//!   when popped.
//! - After a node is committed, the conjunctions heuristic's last relaxed
//!   plan describes that node's state. A violation aborts the search with
//!   [`SearchError::InvariantViolation`].

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use tessera_kernel::state::{State, StateId, StateRegistry, SuccessorGenerator};
use tessera_kernel::task::{Cost, PlanningTask};

use crate::digest::{canonical_hash, DOMAIN_EXPANSION_LOG};
use crate::error::SearchError;
use crate::evaluation::EvaluationContext;
use crate::heuristic::{HeuristicId, HeuristicSet};
use crate::open_list::{Edge, EdgeOpenList};
use crate::plan::Plan;
use crate::policy::LazySearchOptions;
use crate::progress::{ProgressTimer, SearchProgress};
use crate::search_space::{IncomingEdge, SearchSpace};
use crate::statistics::SearchStatistics;
use crate::strategy::{ConjunctionGenerationStrategy, StrategyEvent, StrategyResult};
use crate::successors::order_successors;

/// Outcome of one [`LazySearch::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    InProgress,
    /// A plan within the bound was found; see [`LazySearch::plan`].
    Solved,
    /// The open list is exhausted without a plan within the bound.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Running,
    InitialDeadEnd,
    Solved,
    Failed,
}

/// Relaxed plan of the current state judged as a real-task completion.
enum RelaxedCompletion {
    OverBound,
    NotExecutable,
    Plan(Plan),
}

/// The search driver.
pub struct LazySearch<'t> {
    task: &'t PlanningTask,
    registry: StateRegistry,
    successor_generator: SuccessorGenerator,
    search_space: SearchSpace,
    open_list: Box<dyn EdgeOpenList>,
    heuristics: HeuristicSet,
    strategy: Box<dyn ConjunctionGenerationStrategy>,
    options: LazySearchOptions,
    rng: StdRng,
    /// Heuristics notified of initial state and transitions.
    notified: Vec<HeuristicId>,

    current_state: State,
    /// `None` while the current state is the root.
    current_edge: Option<Edge>,
    current_g: Cost,
    current_real_g: Cost,
    current_ctx: EvaluationContext,

    phase: Phase,
    plan: Option<Plan>,
    statistics: SearchStatistics,
    progress: SearchProgress,
    timer: ProgressTimer,
    expansion_log: Vec<StateId>,
}

impl<'t> LazySearch<'t> {
    /// Set up a search over `task`. Nothing is evaluated until the first
    /// [`LazySearch::initialize`] or [`LazySearch::step`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidOptions`] if `options` fail validation.
    pub fn new(
        task: &'t PlanningTask,
        heuristics: HeuristicSet,
        open_list: Box<dyn EdgeOpenList>,
        strategy: Box<dyn ConjunctionGenerationStrategy>,
        options: LazySearchOptions,
    ) -> Result<Self, SearchError> {
        options.validate(&heuristics)?;
        let registry = StateRegistry::new(task);
        let initial = registry.initial_state();
        Ok(Self {
            task,
            successor_generator: SuccessorGenerator::new(task),
            search_space: SearchSpace::new(),
            open_list,
            heuristics,
            strategy,
            rng: StdRng::seed_from_u64(options.random_seed),
            timer: ProgressTimer::new(options.progress_interval),
            options,
            notified: Vec::new(),
            current_ctx: EvaluationContext::new(initial.clone(), 0, true),
            current_state: initial,
            current_edge: None,
            current_g: 0,
            current_real_g: 0,
            registry,
            phase: Phase::Uninitialized,
            plan: None,
            statistics: SearchStatistics::default(),
            progress: SearchProgress::new(),
            expansion_log: Vec::new(),
        })
    }

    /// Notify heuristics of the initial state and run the strategy's
    /// initialization event. Idempotent; [`LazySearch::step`] calls it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvariantViolation`] if the strategy reports a
    /// solution whose relaxed plan is not executable.
    pub fn initialize(&mut self) -> Result<(), SearchError> {
        if self.phase != Phase::Uninitialized {
            return Ok(());
        }
        self.phase = Phase::Running;

        let mut involved = BTreeSet::new();
        self.open_list.involved_heuristics(&mut involved);
        involved.extend(self.options.preferred_heuristics.iter().copied());
        involved.insert(HeuristicId::CONJUNCTIONS);
        self.notified = involved.into_iter().collect();

        let names: Vec<&str> = self
            .notified
            .iter()
            .map(|&id| self.heuristics.name(id))
            .collect();
        info!(
            bound = self.options.bound,
            reopen_closed = self.options.reopen_closed,
            heuristics = ?names,
            strategy = self.strategy.name(),
            "lazy best-first search with online conjunction learning"
        );

        for &id in &self.notified {
            self.heuristics.notify_initial_state(id, &self.current_state);
        }

        let result = self.strategy.generate(
            StrategyEvent::Initialization,
            &mut self.heuristics,
            &mut self.current_ctx,
            true,
            self.options.bound,
        );
        debug!(?result, "strategy initialization");
        match result {
            StrategyResult::Solved => {
                if let Some(plan) = self.strategy_solution()? {
                    self.solve(plan);
                }
            }
            StrategyResult::DeadEnd => self.phase = Phase::InitialDeadEnd,
            StrategyResult::Continue => {}
        }

        // The strategy may have evaluated other states; drop the root's
        // conjunctions entry so its next evaluation refreshes the relaxed plan.
        if !self
            .heuristics
            .conjunctions()
            .is_last_plan_valid_for(&self.current_state)
        {
            self.current_ctx.forget(HeuristicId::CONJUNCTIONS);
        }

        if self.phase == Phase::Running && self.options.check_relaxed_plans {
            self.current_ctx
                .result(&mut self.heuristics, HeuristicId::CONJUNCTIONS);
            if let RelaxedCompletion::Plan(plan) = self.relaxed_completion() {
                self.solve(plan);
            }
        }

        info!(
            conjunctions = self.heuristics.conjunctions().num_conjunctions(),
            evaluations = self.heuristics.evaluations(),
            "finished initialization"
        );
        self.timer.restart();
        Ok(())
    }

    /// Perform one unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvariantViolation`] when the conjunctions
    /// heuristic's relaxed plan does not describe the committed state, when
    /// g-value bookkeeping diverges, or when a strategy reports an
    /// unexecutable solution.
    pub fn step(&mut self) -> Result<SearchStatus, SearchError> {
        self.initialize()?;
        match self.phase {
            Phase::Solved => return Ok(SearchStatus::Solved),
            Phase::Failed => return Ok(SearchStatus::Failed),
            Phase::InitialDeadEnd => {
                self.search_space.mark_dead_end(self.current_state.id());
                self.statistics.dead_ends += 1;
                self.phase = Phase::Failed;
                info!("initial state is a dead end, no solution");
                return Ok(SearchStatus::Failed);
            }
            Phase::Running | Phase::Uninitialized => {}
        }

        let node = self.search_space.node(self.current_state.id());
        let reopen = self.options.reopen_closed
            && !node.is_new()
            && !node.is_dead_end()
            && self.current_g < node.g;

        if node.is_new() || reopen {
            if let Some(status) = self.commit(reopen)? {
                return Ok(status);
            }
        }
        Ok(self.fetch_next_state())
    }

    /// Run [`LazySearch::step`] until it returns a terminal status.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`LazySearch::step`].
    pub fn search(&mut self) -> Result<SearchStatus, SearchError> {
        loop {
            match self.step()? {
                SearchStatus::InProgress => {}
                terminal => return Ok(terminal),
            }
        }
    }

    /// Commit the current node. `Some` carries a terminal status.
    fn commit(&mut self, reopen: bool) -> Result<Option<SearchStatus>, SearchError> {
        let id = self.current_state.id();

        if let Some(edge) = self.current_edge {
            let parent = self.registry.lookup(edge.predecessor);
            for &h in &self.notified {
                self.heuristics
                    .notify_transition(h, &parent, edge.operator, &self.current_state);
            }
        }

        if self.timer.is_due() {
            self.log_intermediate_statistics();
        }
        self.statistics.evaluated_states += 1;

        if self
            .open_list
            .is_dead_end(&mut self.current_ctx, &mut self.heuristics)
        {
            debug!(state = %id, g = self.current_g, "dead end");
            self.search_space.mark_dead_end(id);
            self.statistics.dead_ends += 1;
            return Ok(None);
        }

        match self.current_edge {
            Some(edge) => {
                let incoming = self.incoming(edge);
                if reopen {
                    debug!(
                        state = %id,
                        old_g = self.search_space.node(id).g,
                        new_g = self.current_g,
                        "reopening"
                    );
                    self.search_space.reopen(id, incoming);
                    self.statistics.reopened += 1;
                } else {
                    self.search_space.open(id, incoming);
                }
            }
            None => {
                self.search_space.open_initial(id);
                if self.progress.check_progress(&self.current_ctx, &self.heuristics) {
                    self.log_checkpoint();
                }
            }
        }

        let current_h = self
            .current_ctx
            .result(&mut self.heuristics, HeuristicId::CONJUNCTIONS)
            .clone();
        self.check_commit_invariants()?;

        if self.options.check_relaxed_plans {
            if let RelaxedCompletion::Plan(plan) = self.relaxed_completion() {
                return Ok(Some(self.solve(plan)));
            }
        }

        let remaining = self.options.bound.saturating_sub(self.current_real_g);
        let result = self.strategy.generate(
            StrategyEvent::Step,
            &mut self.heuristics,
            &mut self.current_ctx,
            true,
            remaining,
        );
        match result {
            StrategyResult::Solved => {
                if let Some(plan) = self.strategy_solution()? {
                    return Ok(Some(self.solve(plan)));
                }
            }
            StrategyResult::DeadEnd => {
                debug!(state = %id, "strategy reported dead end");
                self.search_space.mark_dead_end(id);
                self.statistics.dead_ends += 1;
                return Ok(None);
            }
            StrategyResult::Continue => {}
        }

        // Conjunctions added by the strategy invalidate every cached value;
        // the value computed above still describes this node.
        self.current_ctx
            .reseed(&self.heuristics, HeuristicId::CONJUNCTIONS, current_h);

        self.search_space.close(id);
        if self.current_real_g <= self.options.bound
            && self.task.is_goal(self.current_state.values())
        {
            let plan = Plan {
                operators: self.search_space.trace_path(id),
                real_cost: self.current_real_g,
                relaxed_suffix_len: 0,
            };
            return Ok(Some(self.solve(plan)));
        }
        if self.progress.check_progress(&self.current_ctx, &self.heuristics) {
            self.log_checkpoint();
            self.open_list.boost_preferred();
        }

        self.generate_successors();
        self.statistics.expanded += 1;
        self.expansion_log.push(id);
        Ok(None)
    }

    fn generate_successors(&mut self) {
        let task = self.task;
        let id = self.current_state.id();
        let applicable = self
            .successor_generator
            .applicable_operators(&self.current_state);

        let mut preferred = Vec::new();
        for &h in &self.options.preferred_heuristics {
            if !self
                .current_ctx
                .is_heuristic_infinite(&mut self.heuristics, h)
            {
                preferred.extend(self.current_ctx.preferred_operators(&mut self.heuristics, h));
            }
        }

        let rng = if self.options.randomize_successors {
            Some(&mut self.rng)
        } else {
            None
        };
        let ordered = order_successors(
            applicable,
            preferred,
            self.options.preferred_successors_first,
            rng,
        );
        self.statistics.generated += ordered.len() as u64;

        for successor in ordered {
            let op = task.operator(successor.operator);
            let new_g = self
                .current_g
                .saturating_add(self.options.cost_type.adjusted_cost(op));
            let new_real_g = self.current_real_g.saturating_add(op.cost);
            if new_real_g <= self.options.bound {
                let mut child_ctx = self.current_ctx.carried(new_g, successor.preferred);
                self.open_list.insert(
                    &mut child_ctx,
                    &mut self.heuristics,
                    Edge::new(id, successor.operator),
                );
            }
        }
    }

    fn fetch_next_state(&mut self) -> SearchStatus {
        let task = self.task;
        let (edge, op) = loop {
            let Some(edge) = self.open_list.remove_min() else {
                info!(
                    expanded = self.statistics.expanded,
                    "completely explored state space, no solution"
                );
                self.phase = Phase::Failed;
                return SearchStatus::Failed;
            };
            let op = task.operator(edge.operator);
            // A reopened predecessor can carry a larger real g than when the
            // edge was inserted.
            let pred_node = self.search_space.node(edge.predecessor);
            let real_g = pred_node.real_g.saturating_add(op.cost);
            if real_g <= self.options.bound {
                self.current_g = pred_node
                    .g
                    .saturating_add(self.options.cost_type.adjusted_cost(op));
                self.current_real_g = real_g;
                break (edge, op);
            }
            debug!(
                predecessor = %edge.predecessor,
                real_g,
                bound = self.options.bound,
                "dropping edge over bound"
            );
        };

        let predecessor = self.registry.lookup(edge.predecessor);
        self.current_state = self.registry.successor(&predecessor, op);
        self.current_edge = Some(edge);

        // The popped node is marked preferred: it has already been selected,
        // so the flag no longer influences its ranking.
        self.current_ctx = EvaluationContext::new(self.current_state.clone(), self.current_g, true);
        SearchStatus::InProgress
    }

    fn incoming(&self, edge: Edge) -> IncomingEdge {
        let op = self.task.operator(edge.operator);
        IncomingEdge {
            parent: edge.predecessor,
            operator: edge.operator,
            adjusted_cost: self.options.cost_type.adjusted_cost(op),
            real_cost: op.cost,
        }
    }

    fn check_commit_invariants(&self) -> Result<(), SearchError> {
        let id = self.current_state.id();
        if !self
            .heuristics
            .conjunctions()
            .is_last_plan_valid_for(&self.current_state)
        {
            return Err(SearchError::InvariantViolation {
                detail: format!(
                    "relaxed plan of {} does not describe committed state {id}",
                    self.heuristics.name(HeuristicId::CONJUNCTIONS)
                ),
            });
        }
        let node = self.search_space.node(id);
        if node.real_g != self.current_real_g || node.g != self.current_g {
            return Err(SearchError::InvariantViolation {
                detail: format!(
                    "state {id}: node g/real_g {}/{} diverge from path g/real_g {}/{}",
                    node.g, node.real_g, self.current_g, self.current_real_g
                ),
            });
        }
        Ok(())
    }

    /// Path to the current state followed by the last relaxed plan.
    fn relaxed_completion(&self) -> RelaxedCompletion {
        let conjunctions = self.heuristics.conjunctions();
        let relaxed = &conjunctions.last_relaxed_plan().operators;
        let real_cost = self
            .current_real_g
            .saturating_add(self.task.plan_cost(relaxed));
        if real_cost > self.options.bound {
            return RelaxedCompletion::OverBound;
        }
        if !conjunctions.is_last_plan_valid_for(&self.current_state)
            || !self
                .task
                .validate_plan_from(self.current_state.values(), relaxed)
        {
            return RelaxedCompletion::NotExecutable;
        }
        let mut operators = self.search_space.trace_path(self.current_state.id());
        operators.extend_from_slice(relaxed);
        RelaxedCompletion::Plan(Plan {
            operators,
            real_cost,
            relaxed_suffix_len: relaxed.len(),
        })
    }

    /// Plan for a strategy-reported solution. `None` if it exceeds the bound.
    fn strategy_solution(&self) -> Result<Option<Plan>, SearchError> {
        match self.relaxed_completion() {
            RelaxedCompletion::Plan(plan) => Ok(Some(plan)),
            RelaxedCompletion::OverBound => Ok(None),
            RelaxedCompletion::NotExecutable => Err(SearchError::InvariantViolation {
                detail: format!(
                    "strategy {} reported a solution at {} but the relaxed plan is not executable",
                    self.strategy.name(),
                    self.current_state.id()
                ),
            }),
        }
    }

    fn solve(&mut self, plan: Plan) -> SearchStatus {
        info!(
            length = plan.len(),
            cost = plan.real_cost,
            relaxed_suffix = plan.relaxed_suffix_len,
            expanded = self.statistics.expanded,
            "solution found"
        );
        self.plan = Some(plan);
        self.phase = Phase::Solved;
        SearchStatus::Solved
    }

    fn log_checkpoint(&self) {
        info!(
            g = self.current_g,
            expanded = self.statistics.expanded,
            evaluated = self.statistics.evaluated_states,
            generated = self.statistics.generated,
            dead_ends = self.statistics.dead_ends,
            "new best heuristic value"
        );
    }

    fn log_intermediate_statistics(&self) {
        info!(
            expanded = self.statistics.expanded,
            evaluated = self.statistics.evaluated_states,
            evaluations = self.heuristics.evaluations(),
            conjunctions = self.heuristics.conjunctions().num_conjunctions(),
            registered_states = self.registry.len(),
            open = self.open_list.len(),
            "intermediate statistics"
        );
    }

    #[must_use]
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    #[must_use]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Final statistics report, including heuristic-side counters.
    #[must_use]
    pub fn statistics_json(&self) -> serde_json::Value {
        self.statistics.to_json_value(
            self.heuristics.evaluations(),
            self.heuristics.conjunctions().num_conjunctions(),
        )
    }

    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.search_space
    }

    #[must_use]
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    #[must_use]
    pub fn heuristics(&self) -> &HeuristicSet {
        &self.heuristics
    }

    #[must_use]
    pub fn options(&self) -> &LazySearchOptions {
        &self.options
    }

    /// States in the order they were expanded.
    #[must_use]
    pub fn expansion_log(&self) -> &[StateId] {
        &self.expansion_log
    }

    /// Digest of [`LazySearch::expansion_log`].
    #[must_use]
    pub fn expansion_digest(&self) -> String {
        let mut data = Vec::with_capacity(self.expansion_log.len() * 4);
        for id in &self.expansion_log {
            data.extend_from_slice(&id.to_le_bytes());
        }
        canonical_hash(DOMAIN_EXPANSION_LOG, &data)
    }
}

impl std::fmt::Debug for LazySearch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySearch")
            .field("phase", &self.phase)
            .field("current_state", &self.current_state.id())
            .field("current_g", &self.current_g)
            .field("current_real_g", &self.current_real_g)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}
