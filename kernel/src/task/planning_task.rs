//! `PlanningTask`: the immutable task the search explores.
//!
//! A task is validated once at construction. Everything downstream (registry,
//! successor generator, heuristics, search) relies on those checks and does
//! not re-validate.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::task::fact::Fact;
use crate::task::operator::{Cost, Operator, OperatorId};

/// A finite-domain state variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Values range over `0..domain_size`.
    pub domain_size: u32,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>, domain_size: u32) -> Self {
        Self {
            name: name.into(),
            domain_size,
        }
    }
}

/// Typed failure for task construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task has no variables")]
    NoVariables,
    #[error("variable {name} has an empty domain")]
    EmptyDomain { name: String },
    #[error("initial state assigns {actual} values for {expected} variables")]
    InitialStateArity { expected: usize, actual: usize },
    #[error("{context}: variable index {var} out of range")]
    UnknownVariable { context: String, var: usize },
    #[error("{context}: value {value} outside the domain of {variable}")]
    ValueOutOfDomain {
        context: String,
        variable: String,
        value: u32,
    },
    #[error("operator {name} has negative cost {cost}")]
    NegativeCost { name: String, cost: Cost },
    #[error("{context}: variable {variable} assigned twice")]
    DuplicateVariable { context: String, variable: String },
}

/// A validated finite-domain planning task.
#[derive(Debug, Clone)]
pub struct PlanningTask {
    variables: Vec<Variable>,
    operators: Vec<Operator>,
    initial: Vec<u32>,
    goal: Vec<Fact>,
}

impl PlanningTask {
    /// Build a task, checking that every fact references a known variable and
    /// an in-domain value, that costs are non-negative, and that no condition
    /// or effect list assigns the same variable twice.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskError`] found.
    pub fn new(
        variables: Vec<Variable>,
        operators: Vec<Operator>,
        initial: Vec<u32>,
        goal: Vec<Fact>,
    ) -> Result<Self, TaskError> {
        if variables.is_empty() {
            return Err(TaskError::NoVariables);
        }
        if let Some(v) = variables.iter().find(|v| v.domain_size == 0) {
            return Err(TaskError::EmptyDomain {
                name: v.name.clone(),
            });
        }
        if initial.len() != variables.len() {
            return Err(TaskError::InitialStateArity {
                expected: variables.len(),
                actual: initial.len(),
            });
        }
        for (var, &value) in variables.iter().zip(&initial) {
            if value >= var.domain_size {
                return Err(TaskError::ValueOutOfDomain {
                    context: "initial state".into(),
                    variable: var.name.clone(),
                    value,
                });
            }
        }
        check_facts(&variables, &goal, "goal")?;
        for op in &operators {
            if op.cost < 0 {
                return Err(TaskError::NegativeCost {
                    name: op.name.clone(),
                    cost: op.cost,
                });
            }
            check_facts(&variables, &op.preconditions, &format!("{} precondition", op.name))?;
            check_facts(&variables, &op.effects, &format!("{} effect", op.name))?;
        }
        Ok(Self {
            variables,
            operators,
            initial,
            goal,
        })
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Look up an operator. Ids come from this task, so the index is in range.
    #[must_use]
    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.index()]
    }

    pub fn operator_ids(&self) -> impl Iterator<Item = OperatorId> {
        (0..self.operators.len()).map(OperatorId)
    }

    #[must_use]
    pub fn initial_values(&self) -> &[u32] {
        &self.initial
    }

    #[must_use]
    pub fn goal(&self) -> &[Fact] {
        &self.goal
    }

    #[must_use]
    pub fn is_goal(&self, values: &[u32]) -> bool {
        self.goal.iter().all(|f| f.holds_in(values))
    }

    /// Total number of facts (sum of domain sizes).
    #[must_use]
    pub fn num_facts(&self) -> usize {
        self.variables.iter().map(|v| v.domain_size as usize).sum()
    }

    /// Sum of real operator costs along `plan`.
    #[must_use]
    pub fn plan_cost(&self, plan: &[OperatorId]) -> Cost {
        plan.iter()
            .map(|&id| self.operator(id).cost)
            .fold(0, Cost::saturating_add)
    }

    /// Whether `plan` is executable from `values` in the real task and ends in
    /// a goal state.
    #[must_use]
    pub fn validate_plan_from(&self, values: &[u32], plan: &[OperatorId]) -> bool {
        let mut current = values.to_vec();
        for &id in plan {
            let op = self.operator(id);
            if !op.is_applicable(&current) {
                return false;
            }
            op.apply_to(&mut current);
        }
        self.is_goal(&current)
    }
}

fn check_facts(variables: &[Variable], facts: &[Fact], context: &str) -> Result<(), TaskError> {
    let mut seen = BTreeSet::new();
    for fact in facts {
        let Some(var) = variables.get(fact.var.index()) else {
            return Err(TaskError::UnknownVariable {
                context: context.to_string(),
                var: fact.var.index(),
            });
        };
        if fact.value >= var.domain_size {
            return Err(TaskError::ValueOutOfDomain {
                context: context.to_string(),
                variable: var.name.clone(),
                value: fact.value,
            });
        }
        if !seen.insert(fact.var) {
            return Err(TaskError::DuplicateVariable {
                context: context.to_string(),
                variable: var.name.clone(),
            });
        }
    }
    Ok(())
}
