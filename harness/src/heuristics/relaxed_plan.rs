//! Relaxed-plan heuristic over facts and learned conjunctions.
//!
//! Atoms are single facts plus every learned conjunction. An operator
//! supports an atom when it adds part of it and deletes none of it; the
//! supported atom's condition is the operator's precondition together with
//! the atom's facts the operator does not add. A condition costs the sum of
//! its atoms, where the atoms of a fact set are its facts plus every
//! conjunction it contains.
//!
//! Atom costs are relaxed to a fixpoint from the evaluated state. The relaxed
//! plan is then extracted backwards from the goal through best supporters and
//! ordered so that each operator follows the supporters of its condition,
//! earlier applicability first.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use tessera_kernel::state::{State, StateId};
use tessera_kernel::task::{Cost, Fact, Operator, OperatorId, PlanningTask};
use tessera_search::heuristic::{
    ConjunctionsHeuristic, EvaluationResult, Heuristic, RelaxedPlan,
};

type AtomId = usize;

#[derive(Debug, Clone)]
struct Support {
    operator: OperatorId,
    cost: Cost,
    target: AtomId,
    condition: Vec<AtomId>,
}

/// Additive relaxed-plan heuristic refinable with conjunctions.
#[derive(Debug)]
pub struct RelaxedPlanHeuristic {
    operators: Vec<Operator>,
    goal: Vec<Fact>,
    domain_sizes: Vec<u32>,
    fact_offsets: Vec<usize>,
    num_facts: usize,
    conjunctions: Vec<Vec<Fact>>,
    supports: Vec<Support>,
    goal_atoms: Option<Vec<AtomId>>,
    version: u64,
    last_state: Option<StateId>,
    last_plan: RelaxedPlan,
}

impl RelaxedPlanHeuristic {
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        let domain_sizes: Vec<u32> = task.variables().iter().map(|v| v.domain_size).collect();
        let mut fact_offsets = Vec::with_capacity(domain_sizes.len());
        let mut num_facts = 0;
        for &size in &domain_sizes {
            fact_offsets.push(num_facts);
            num_facts += size as usize;
        }
        let mut heuristic = Self {
            operators: task.operators().to_vec(),
            goal: task.goal().to_vec(),
            domain_sizes,
            fact_offsets,
            num_facts,
            conjunctions: Vec::new(),
            supports: Vec::new(),
            goal_atoms: None,
            version: 0,
            last_state: None,
            last_plan: RelaxedPlan::default(),
        };
        heuristic.rebuild();
        heuristic
    }

    /// The learned conjunctions, each sorted by variable.
    #[must_use]
    pub fn conjunctions(&self) -> &[Vec<Fact>] {
        &self.conjunctions
    }

    fn num_atoms(&self) -> usize {
        self.num_facts + self.conjunctions.len()
    }

    fn fact_atom(&self, fact: Fact) -> AtomId {
        self.fact_offsets[fact.var.index()] + fact.value as usize
    }

    fn atom_holds(&self, atom: AtomId, values: &[u32]) -> bool {
        if atom < self.num_facts {
            let var = self.fact_offsets.partition_point(|&offset| offset <= atom) - 1;
            values[var] as usize == atom - self.fact_offsets[var]
        } else {
            self.conjunctions[atom - self.num_facts]
                .iter()
                .all(|f| f.holds_in(values))
        }
    }

    /// Atoms of a fact set, or `None` if it assigns one variable twice.
    fn condition_atoms(&self, facts: &[Fact]) -> Option<Vec<AtomId>> {
        let mut facts = facts.to_vec();
        facts.sort_unstable();
        facts.dedup();
        if facts.windows(2).any(|w| w[0].var == w[1].var) {
            return None;
        }
        let mut atoms: Vec<AtomId> = facts.iter().map(|&f| self.fact_atom(f)).collect();
        for (k, conjunction) in self.conjunctions.iter().enumerate() {
            if conjunction.iter().all(|f| facts.binary_search(f).is_ok()) {
                atoms.push(self.num_facts + k);
            }
        }
        Some(atoms)
    }

    fn rebuild(&mut self) {
        let mut supports = Vec::new();
        for (index, op) in self.operators.iter().enumerate() {
            let operator = OperatorId(index);
            let Some(precondition) = self.condition_atoms(&op.preconditions) else {
                continue;
            };
            for &effect in &op.effects {
                supports.push(Support {
                    operator,
                    cost: op.cost,
                    target: self.fact_atom(effect),
                    condition: precondition.clone(),
                });
            }
            for (k, conjunction) in self.conjunctions.iter().enumerate() {
                let adds_part = conjunction.iter().any(|&f| op.adds(f));
                let deletes_part = conjunction.iter().any(|&f| op.deletes(f));
                if !adds_part || deletes_part {
                    continue;
                }
                let mut facts = op.preconditions.clone();
                facts.extend(conjunction.iter().copied().filter(|&f| !op.adds(f)));
                if let Some(condition) = self.condition_atoms(&facts) {
                    supports.push(Support {
                        operator,
                        cost: op.cost,
                        target: self.num_facts + k,
                        condition,
                    });
                }
            }
        }
        self.supports = supports;
        self.goal_atoms = self.condition_atoms(&self.goal);
    }

    fn condition_cost(costs: &[Option<Cost>], condition: &[AtomId]) -> Option<Cost> {
        condition
            .iter()
            .try_fold(0, |sum: Cost, &atom| Some(sum.saturating_add(costs[atom]?)))
    }

    /// Atom costs and best supporters from `values`.
    fn relax(&self, values: &[u32]) -> (Vec<Option<Cost>>, Vec<Option<usize>>) {
        let n = self.num_atoms();
        let mut costs: Vec<Option<Cost>> = (0..n)
            .map(|atom| self.atom_holds(atom, values).then_some(0))
            .collect();
        let mut best = vec![None; n];
        loop {
            let mut changed = false;
            for (index, support) in self.supports.iter().enumerate() {
                let Some(condition) = Self::condition_cost(&costs, &support.condition) else {
                    continue;
                };
                let candidate = condition.saturating_add(support.cost);
                if !matches!(costs[support.target], Some(current) if current <= candidate) {
                    costs[support.target] = Some(candidate);
                    best[support.target] = Some(index);
                    changed = true;
                }
            }
            if !changed {
                return (costs, best);
            }
        }
    }

    fn extract_plan(
        &self,
        goal_atoms: &[AtomId],
        costs: &[Option<Cost>],
        best: &[Option<usize>],
    ) -> Vec<OperatorId> {
        let mut level: BTreeMap<OperatorId, Cost> = BTreeMap::new();
        let mut conditions: BTreeMap<OperatorId, Vec<AtomId>> = BTreeMap::new();
        let mut visited = vec![false; costs.len()];
        let mut stack = goal_atoms.to_vec();
        while let Some(atom) = stack.pop() {
            if std::mem::replace(&mut visited[atom], true) {
                continue;
            }
            let Some(index) = best[atom] else {
                continue;
            };
            let support = &self.supports[index];
            let applicable_at = Self::condition_cost(costs, &support.condition).unwrap_or(0);
            level
                .entry(support.operator)
                .and_modify(|l| *l = (*l).min(applicable_at))
                .or_insert(applicable_at);
            conditions
                .entry(support.operator)
                .or_default()
                .extend_from_slice(&support.condition);
            stack.extend_from_slice(&support.condition);
        }

        // Every operator goes after the best supporters of its condition;
        // ties are broken by level, then id.
        let mut blockers: BTreeMap<OperatorId, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<OperatorId, Vec<OperatorId>> = BTreeMap::new();
        for (&op, condition) in &conditions {
            let supporters: BTreeSet<OperatorId> = condition
                .iter()
                .filter_map(|&atom| best[atom])
                .map(|index| self.supports[index].operator)
                .filter(|&supporter| supporter != op)
                .collect();
            blockers.insert(op, supporters.len());
            for supporter in supporters {
                dependents.entry(supporter).or_default().push(op);
            }
        }
        let mut ready: BinaryHeap<Reverse<(Cost, OperatorId)>> = blockers
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&op, _)| Reverse((level[&op], op)))
            .collect();
        let mut ordered = Vec::with_capacity(level.len());
        let mut placed = BTreeSet::new();
        while let Some(Reverse((_, op))) = ready.pop() {
            ordered.push(op);
            placed.insert(op);
            for &dependent in dependents.get(&op).into_iter().flatten() {
                if let Some(count) = blockers.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((level[&dependent], dependent)));
                    }
                }
            }
        }

        // Cyclic best supporters only arise between equal-cost atoms; the
        // remaining operators keep their level order.
        if ordered.len() < level.len() {
            let mut rest: Vec<(Cost, OperatorId)> = level
                .iter()
                .filter(|(op, _)| !placed.contains(*op))
                .map(|(&op, &l)| (l, op))
                .collect();
            rest.sort_unstable();
            ordered.extend(rest.into_iter().map(|(_, op)| op));
        }
        ordered
    }
}

impl Heuristic for RelaxedPlanHeuristic {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "relaxed_plan"
    }

    fn compute(&mut self, state: &State) -> EvaluationResult {
        self.last_state = Some(state.id());
        self.last_plan = RelaxedPlan::default();

        let Some(goal_atoms) = self.goal_atoms.as_deref() else {
            return EvaluationResult::infinite();
        };
        let (costs, best) = self.relax(state.values());
        if goal_atoms.iter().any(|&atom| costs[atom].is_none()) {
            return EvaluationResult::infinite();
        }

        let operators = self.extract_plan(goal_atoms, &costs, &best);
        let real_cost = operators
            .iter()
            .map(|&op| self.operators[op.index()].cost)
            .sum();
        let preferred = operators
            .iter()
            .copied()
            .filter(|&op| self.operators[op.index()].is_applicable(state.values()))
            .collect();
        self.last_plan = RelaxedPlan {
            operators,
            real_cost,
        };
        EvaluationResult::finite(real_cost).with_preferred(preferred)
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl ConjunctionsHeuristic for RelaxedPlanHeuristic {
    fn last_relaxed_plan(&self) -> &RelaxedPlan {
        &self.last_plan
    }

    fn is_last_plan_valid_for(&self, state: &State) -> bool {
        self.last_state == Some(state.id())
    }

    fn add_conjunction(&mut self, facts: &[Fact]) -> bool {
        let mut facts = facts.to_vec();
        facts.sort_unstable();
        facts.dedup();
        let well_formed = facts.len() >= 2
            && facts.windows(2).all(|w| w[0].var != w[1].var)
            && facts.iter().all(|f| {
                self.domain_sizes
                    .get(f.var.index())
                    .is_some_and(|&size| f.value < size)
            });
        if !well_formed || self.conjunctions.contains(&facts) {
            return false;
        }
        self.conjunctions.push(facts);
        self.rebuild();
        self.version += 1;
        true
    }

    fn num_conjunctions(&self) -> usize {
        self.conjunctions.len()
    }
}
