// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! [`StateUpdate`]: the sole communication type between the local executor
//! (or an oracle) and the state applier. Every opcode handler produces one
//! of these instead of touching [`crate::state::VmState`] directly.

use crate::value::{Address, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A new frame to push, named by the callee's function name. Return
/// bookkeeping (`return_label`, `return_ip`, `result_reg`) is filled in by
/// the pipeline driver after the applier pushes the frame, since only the
/// driver knows the caller's current `(label, ip)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallPush {
    pub function_name: String,
    pub closure_env_id: Option<crate::value::Address>,
    /// Set for a constructor's implicit `__init__` dispatch: the pipeline
    /// driver pops this frame as usual but does not deliver its return
    /// value anywhere, since the call site already received the new
    /// object's address directly.
    pub discard_return: bool,
}

/// A pure, declarative description of one instruction's effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub register_writes: HashMap<String, Value>,
    pub var_writes: HashMap<String, Value>,
    pub heap_writes: Vec<(crate::value::Address, String, Value)>,
    pub new_objects: Vec<(crate::value::Address, String)>,
    pub next_label: Option<String>,
    pub call_push: Option<CallPush>,
    pub call_pop: bool,
    pub return_value: Option<Value>,
    pub path_condition: Option<String>,
    /// Lines appended to the output buffer by `print`.
    pub output: Vec<String>,
    /// Closure environments to create, seeded from the promoting frame's
    /// locals at the moment of the first `<function:...>` reference built
    /// outside `<main>`.
    pub new_closure_envs: Vec<(Address, HashMap<String, Value>)>,
    /// Sets the *current* (pre-push) frame's `closure_env_id`, when a
    /// `CONST` promotes a plain function reference to a closure for the
    /// first time in that frame.
    pub set_closure_env_id: Option<Address>,
    /// Sets the current frame's `captured_names`, alongside `set_closure_env_id`.
    pub set_captured_names: Option<HashSet<String>>,
    pub reasoning: String,
}

impl StateUpdate {
    #[must_use]
    pub fn new(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn write_register(mut self, reg: impl Into<String>, value: Value) -> Self {
        self.register_writes.insert(reg.into(), value);
        self
    }

    #[must_use]
    pub fn write_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.var_writes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_path_condition(mut self, condition: impl Into<String>) -> Self {
        self.path_condition = Some(condition.into());
        self
    }

    #[must_use]
    pub fn returning(mut self, value: Value) -> Self {
        self.return_value = Some(value);
        self.call_pop = true;
        self
    }

    #[must_use]
    pub fn with_output(mut self, line: impl Into<String>) -> Self {
        self.output.push(line.into());
        self
    }
}
