// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Symbolic values: opaque stand-ins for unknowns.
//!
//! Two symbolic values are equal iff their names are equal — the hint and
//! constraint list are descriptive metadata, not part of identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbolic value: a fresh name plus an accumulating constraint trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolicValue {
    /// Unique name, always of the form `sym_N`.
    pub name: String,
    /// Optional hint describing where this symbolic came from
    /// (a parameter name, a field access like `obj_3.x`, a call expression).
    pub type_hint: Option<String>,
    /// Constraints accumulated as the symbolic propagates through arithmetic,
    /// calls, and field accesses.
    pub constraints: Vec<String>,
}

impl SymbolicValue {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

impl PartialEq for SymbolicValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SymbolicValue {}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolicValue;

    #[test]
    fn equality_is_name_only() {
        let a = SymbolicValue::new("sym_0").with_hint("x");
        let b = SymbolicValue::new("sym_0").with_hint("different hint entirely");
        assert_eq!(a, b);

        let c = SymbolicValue::new("sym_1").with_hint("x");
        assert_ne!(a, c);
    }

    #[test]
    fn constraints_accumulate_in_order() {
        let sym = SymbolicValue::new("sym_2")
            .with_constraint("sym_2 > 0")
            .with_constraint("sym_2 < 10");
        assert_eq!(sym.constraints, vec!["sym_2 > 0", "sym_2 < 10"]);
    }
}
