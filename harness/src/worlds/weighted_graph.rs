//! `WeightedGraph`: move a token along weighted directed edges.
//!
//! One variable `at` ranges over the nodes; every edge is an operator
//! `move-<from>-<to>` with the edge's weight as its real cost. Operators are
//! numbered in edge declaration order.

use tessera_kernel::task::{Cost, Fact, Operator, PlanningTask, TaskError, Variable};

use crate::contract::PlanningWorld;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedGraph {
    pub name: String,
    pub nodes: Vec<String>,
    /// `(from, to, weight)` as node indices.
    pub edges: Vec<(u32, u32, Cost)>,
    pub start: u32,
    pub goal: u32,
}

impl WeightedGraph {
    /// Graph where the first path found greedily is not the cheapest:
    ///
    /// ```text
    /// s --10--> b --1--> c --100--> g
    /// s --1---> a --1--> b
    /// ```
    ///
    /// [`WeightedGraph::detour_estimates`] makes greedy search reach `b`
    /// and `c` through the expensive edge first.
    #[must_use]
    pub fn detour() -> Self {
        Self {
            name: "detour".into(),
            nodes: ["s", "a", "b", "c", "g"].map(String::from).to_vec(),
            edges: vec![(0, 2, 10), (0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 4, 100)],
            start: 0,
            goal: 4,
        }
    }

    /// Estimates for [`WeightedGraph::detour`], indexed by node.
    #[must_use]
    pub fn detour_estimates() -> Vec<Option<Cost>> {
        vec![Some(5), Some(4), Some(1), Some(6), Some(0)]
    }

    /// Index of the node called `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<u32> {
        self.nodes
            .iter()
            .position(|n| n == name)
            .and_then(|i| u32::try_from(i).ok())
    }
}

impl PlanningWorld for WeightedGraph {
    fn world_id(&self) -> String {
        format!("graph_{}", self.name)
    }

    fn build_task(&self) -> Result<PlanningTask, TaskError> {
        let node_name = |i: u32| {
            self.nodes
                .get(i as usize)
                .cloned()
                .unwrap_or_else(|| i.to_string())
        };
        let operators = self
            .edges
            .iter()
            .map(|&(from, to, weight)| {
                Operator::new(
                    format!("move-{}-{}", node_name(from), node_name(to)),
                    vec![Fact::new(0, from)],
                    vec![Fact::new(0, to)],
                    weight,
                )
            })
            .collect();
        let domain = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        PlanningTask::new(
            vec![Variable::new("at", domain)],
            operators,
            vec![self.start],
            vec![Fact::new(0, self.goal)],
        )
    }
}
