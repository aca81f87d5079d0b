//! Variable/value facts.

/// Index of a state variable in the task's variable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(pub usize);

impl VariableId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An atomic assignment `var = value`.
///
/// Ordered by `(var, value)` so fact sets built from sorted vectors are
/// canonical without extra work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact {
    pub var: VariableId,
    pub value: u32,
}

impl Fact {
    #[must_use]
    pub const fn new(var: usize, value: u32) -> Self {
        Self {
            var: VariableId(var),
            value,
        }
    }

    /// Whether this fact holds in the given variable assignment.
    #[must_use]
    pub fn holds_in(&self, values: &[u32]) -> bool {
        values.get(self.var.index()) == Some(&self.value)
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}={}", self.var.0, self.value)
    }
}
