// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Stack frames and closure environments.
//!
//! A closure environment is an explicit, heap-like bindings table shared by
//! every function reference minted from the same enclosing frame — writes
//! to a captured name in one frame are visible to any sibling frame sharing
//! the environment (spec invariant 6).

#[cfg(test)]
mod frame_test;

use crate::value::{Address, Value};
use std::collections::{HashMap, HashSet};

/// A single call-stack frame.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    pub registers: HashMap<String, Value>,
    pub locals: HashMap<String, Value>,
    /// Block label and instruction index to resume at on return.
    pub return_label: String,
    pub return_ip: usize,
    /// Register in the *caller's* frame that should receive the return value.
    pub result_reg: Option<String>,
    pub closure_env_id: Option<Address>,
    pub captured_names: HashSet<String>,
}

impl StackFrame {
    #[must_use]
    pub fn main() -> Self {
        Self {
            function_name: "<main>".to_string(),
            registers: HashMap::new(),
            locals: HashMap::new(),
            return_label: String::new(),
            return_ip: 0,
            result_reg: None,
            closure_env_id: None,
            captured_names: HashSet::new(),
        }
    }

    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            registers: HashMap::new(),
            locals: HashMap::new(),
            return_label: String::new(),
            return_ip: 0,
            result_reg: None,
            closure_env_id: None,
            captured_names: HashSet::new(),
        }
    }

    #[must_use]
    pub fn is_main(&self) -> bool {
        self.function_name == "<main>"
    }
}

/// A closure environment's bindings table.
#[derive(Debug, Clone, Default)]
pub struct ClosureEnv {
    pub bindings: HashMap<String, Value>,
}

/// Address-indexed closure environments, separate from the object heap
/// since their lifecycle (created on first function-reference construction
/// per frame, reused by later ones in the same frame) differs from plain
/// heap objects even though both mint `env_N` addresses from the same
/// counter.
#[derive(Debug, Clone, Default)]
pub struct ClosureTable {
    envs: HashMap<Address, ClosureEnv>,
}

impl ClosureTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            envs: HashMap::new(),
        }
    }

    pub fn create(&mut self, addr: Address, seed: HashMap<String, Value>) {
        self.envs.insert(addr, ClosureEnv { bindings: seed });
    }

    #[must_use]
    pub fn get(&self, addr: Address) -> Option<&ClosureEnv> {
        self.envs.get(&addr)
    }

    pub fn get_mut(&mut self, addr: Address) -> Option<&mut ClosureEnv> {
        self.envs.get_mut(&addr)
    }
}
