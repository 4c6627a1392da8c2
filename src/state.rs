// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! VM state: heap, call stack, closure table, path conditions, and the
//! single counter every fresh name is minted from.

#[cfg(test)]
mod state_test;

use crate::frame::{ClosureTable, StackFrame};
use crate::heap::{Heap, HeapObject};
use crate::symbolic::SymbolicValue;
use crate::value::{Address, Value};

/// Monotonically increasing source of uniqueness. `fresh_symbolic`, new
/// heap addresses, and closure environment ids all draw from one `Counter`
/// instance so no two minted names can coincide (spec invariant 4).
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter(u64);

impl Counter {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> u64 {
        let n = self.0;
        self.0 += 1;
        n
    }
}

/// Full interpreter state for one run.
pub struct VmState {
    pub heap: Heap,
    pub call_stack: Vec<StackFrame>,
    pub closures: ClosureTable,
    pub path_conditions: Vec<String>,
    pub output: Vec<String>,
    counter: Counter,
}

impl VmState {
    /// A fresh state with the bottom `<main>` frame already pushed
    /// (spec invariant 1: the call stack is never empty during execution).
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Heap::new(),
            call_stack: vec![StackFrame::main()],
            closures: ClosureTable::new(),
            path_conditions: Vec::new(),
            output: Vec::new(),
            counter: Counter::new(),
        }
    }

    #[must_use]
    pub fn current_frame(&self) -> &StackFrame {
        self.call_stack
            .last()
            .expect("call stack must never be empty")
    }

    pub fn current_frame_mut(&mut self) -> &mut StackFrame {
        self.call_stack
            .last_mut()
            .expect("call stack must never be empty")
    }

    /// Mint a fresh symbolic value with the given hint.
    pub fn fresh_symbolic(&mut self, hint: Option<String>) -> SymbolicValue {
        let n = self.counter.next();
        let sym = SymbolicValue::new(format!("sym_{n}"));
        match hint {
            Some(h) => sym.with_hint(h),
            None => sym,
        }
    }

    /// Mint a fresh object address. Does not touch the heap — the caller
    /// (the local executor) carries it home in a `StateUpdate`'s
    /// `new_objects` list for the applier to actually create.
    pub fn new_object(&mut self) -> Address {
        Address::Obj(self.counter.next())
    }

    /// Mint a fresh array address, same caveat as [`Self::new_object`].
    pub fn new_array(&mut self) -> Address {
        Address::Arr(self.counter.next())
    }

    /// Mint a new closure environment id (not yet populated — callers seed
    /// it). Its numeric id doubles as the `#CLOSURE_ID` tag appended to a
    /// promoted function reference, so recovering the environment from a
    /// parsed [`crate::value::FunctionRef::closure_id`] is just
    /// `Address::Env(id)`.
    pub fn new_env_id(&mut self) -> Address {
        Address::Env(self.counter.next())
    }

    /// Materialize a synthetic heap object at `addr`, hinting its type from
    /// a symbolic value's hint when available (spec invariant 5).
    pub fn materialize(&mut self, addr: Address, hint: Option<&str>) -> &mut HeapObject {
        self.heap.materialize(addr, hint.unwrap_or("object"))
    }

    /// Walk the call stack innermost-first looking for a local variable.
    /// Used by `LOAD_VAR` before falling back to the closure environment
    /// and then to minting a fresh symbolic.
    #[must_use]
    pub fn find_local(&self, name: &str) -> Option<&Value> {
        self.call_stack
            .iter()
            .rev()
            .find_map(|frame| frame.locals.get(name))
    }
}

impl Default for VmState {
    fn default() -> Self {
        Self::new()
    }
}
