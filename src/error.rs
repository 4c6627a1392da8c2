// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Fatal error taxonomy surfaced by the pipeline driver.
//!
//! Non-fatal conditions (incomputable operators, unresolved references)
//! never reach this type — they flow through as symbolic values. This is
//! reserved for the malformed-input taxonomy in `§7`: an opcode no handler
//! claims, a branch to a label the CFG doesn't have, or a call naming a
//! function/method/class the registry never indexed.

use thiserror::Error;

/// A fatal condition that stops the step loop.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// A `BRANCH`/`BRANCH_IF` target, or a call dispatch's resolved function
    /// label, names a block the CFG doesn't have.
    #[error("step {step}: block {block:?} names nonexistent target {target:?}")]
    DanglingTarget {
        step: u64,
        block: String,
        target: String,
    },

    /// Neither the local executor nor the oracle handled this instruction.
    /// Structurally unreachable for this core's own 20 opcodes — surfaces
    /// only if a future extension adds an opcode without a handler.
    #[error("step {step}: block {block:?} ip {ip}: opcode {opcode} was not handled by the executor or oracle")]
    Unhandled {
        step: u64,
        block: String,
        ip: usize,
        opcode: String,
    },
}
