//! Search counters and their JSON report.

/// Counters accumulated over one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStatistics {
    /// Nodes closed and expanded.
    pub expanded: u64,
    /// Nodes committed (new or reopened) and checked against the open list.
    pub evaluated_states: u64,
    /// Successor operators enumerated across all expansions.
    pub generated: u64,
    pub reopened: u64,
    pub dead_ends: u64,
}

impl SearchStatistics {
    /// JSON report; `evaluations` and `conjunctions` come from the heuristic set.
    #[must_use]
    pub fn to_json_value(&self, evaluations: u64, conjunctions: usize) -> serde_json::Value {
        serde_json::json!({
            "conjunctions": conjunctions,
            "dead_ends": self.dead_ends,
            "evaluated_states": self.evaluated_states,
            "evaluations": evaluations,
            "expanded": self.expanded,
            "generated": self.generated,
            "reopened": self.reopened,
        })
    }
}
