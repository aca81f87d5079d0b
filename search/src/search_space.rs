//! Per-state search bookkeeping: g-values, parent links, and status.
//!
//! Nodes are stored densely by [`StateId`]. A state the space has never
//! touched reads as [`NodeStatus::New`] with no parent.

use tessera_kernel::state::StateId;
use tessera_kernel::task::{Cost, OperatorId};

/// Lifecycle of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    New,
    Open,
    Closed,
    DeadEnd,
}

/// The incoming edge of a non-root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub state: StateId,
    pub operator: OperatorId,
}

/// Mutable record of one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchNodeInfo {
    pub status: NodeStatus,
    /// Path cost under the search's cost type.
    pub g: Cost,
    /// Path cost in real operator costs.
    pub real_g: Cost,
    /// `None` for the root and for nodes never opened.
    pub parent: Option<ParentLink>,
}

impl SearchNodeInfo {
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.status == NodeStatus::New
    }

    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.status == NodeStatus::DeadEnd
    }
}

/// Incoming edge plus its costs, used to open or reopen a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomingEdge {
    pub parent: StateId,
    pub operator: OperatorId,
    pub adjusted_cost: Cost,
    pub real_cost: Cost,
}

/// Dense table of search nodes.
#[derive(Debug, Default)]
pub struct SearchSpace {
    nodes: Vec<SearchNodeInfo>,
}

impl SearchSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the node for `id`.
    #[must_use]
    pub fn node(&self, id: StateId) -> SearchNodeInfo {
        self.nodes.get(id.index()).copied().unwrap_or_default()
    }

    /// Open the root: g = real g = 0, no parent.
    pub fn open_initial(&mut self, id: StateId) {
        let node = self.slot(id);
        debug_assert_eq!(node.status, NodeStatus::New);
        *node = SearchNodeInfo {
            status: NodeStatus::Open,
            g: 0,
            real_g: 0,
            parent: None,
        };
    }

    /// Open a new node reached through `edge`.
    pub fn open(&mut self, id: StateId, edge: IncomingEdge) {
        debug_assert!(self.node(id).is_new());
        self.link(id, edge);
    }

    /// Re-admit an already reached node through a strictly cheaper `edge`.
    pub fn reopen(&mut self, id: StateId, edge: IncomingEdge) {
        debug_assert!(matches!(
            self.node(id).status,
            NodeStatus::Open | NodeStatus::Closed
        ));
        self.link(id, edge);
    }

    pub fn close(&mut self, id: StateId) {
        let node = self.slot(id);
        debug_assert_eq!(node.status, NodeStatus::Open);
        node.status = NodeStatus::Closed;
    }

    pub fn mark_dead_end(&mut self, id: StateId) {
        self.slot(id).status = NodeStatus::DeadEnd;
    }

    /// Operators from the root to `id`, following parent links.
    #[must_use]
    pub fn trace_path(&self, id: StateId) -> Vec<OperatorId> {
        let mut path = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(link) = current {
            path.push(link.operator);
            current = self.node(link.state).parent;
        }
        path.reverse();
        path
    }

    /// All touched nodes, ascending by state id.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &SearchNodeInfo)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_new())
            .map(|(i, node)| (StateId(u32::try_from(i).unwrap_or(u32::MAX)), node))
    }

    /// Number of nodes per status: `(open, closed, dead_end)`.
    #[must_use]
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.nodes.iter().fold((0, 0, 0), |(o, c, d), node| match node.status {
            NodeStatus::Open => (o + 1, c, d),
            NodeStatus::Closed => (o, c + 1, d),
            NodeStatus::DeadEnd => (o, c, d + 1),
            NodeStatus::New => (o, c, d),
        })
    }

    fn link(&mut self, id: StateId, edge: IncomingEdge) {
        let parent = self.node(edge.parent);
        let node = self.slot(id);
        node.status = NodeStatus::Open;
        node.g = parent.g.saturating_add(edge.adjusted_cost);
        node.real_g = parent.real_g.saturating_add(edge.real_cost);
        node.parent = Some(ParentLink {
            state: edge.parent,
            operator: edge.operator,
        });
    }

    fn slot(&mut self, id: StateId) -> &mut SearchNodeInfo {
        if self.nodes.len() <= id.index() {
            self.nodes.resize(id.index() + 1, SearchNodeInfo::default());
        }
        &mut self.nodes[id.index()]
    }
}
