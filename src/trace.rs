// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Execution trace recording (`§6`'s "execution trace interface").
//!
//! The pipeline driver pushes one [`TraceEvent`] per applied step when a
//! [`TraceRecorder`] is enabled. Replay UIs are out of scope for this
//! crate; this is just the concrete sink they'd consume.

#[cfg(test)]
mod trace_test;

use crate::update::StateUpdate;
use serde::{Deserialize, Serialize};

/// One applied step, enough to reconstruct what happened without replaying
/// the whole `StateUpdate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub step: u64,
    pub block: String,
    pub ip: usize,
    pub opcode: String,
    pub register_writes: Vec<String>,
    pub var_writes: Vec<String>,
    pub reasoning: String,
}

/// Collects [`TraceEvent`]s, or discards them — structurally always
/// present so the driver never has to special-case "no tracer", but the
/// `Vec` push (and the cloning it implies) is skipped entirely when
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    enabled: bool,
    events: Vec<TraceEvent>,
}

impl TraceRecorder {
    /// A recorder that keeps every event pushed to it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            events: Vec::new(),
        }
    }

    /// A recorder that silently drops every event — the hot-loop default.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one step. A no-op if disabled.
    pub fn record(&mut self, step: u64, block: &str, ip: usize, opcode: &str, update: &StateUpdate) {
        if !self.enabled {
            return;
        }
        self.events.push(TraceEvent {
            step,
            block: block.to_string(),
            ip,
            opcode: opcode.to_string(),
            register_writes: sorted_keys(update.register_writes.keys()),
            var_writes: sorted_keys(update.var_writes.keys()),
            reasoning: update.reasoning.clone(),
        });
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = keys.cloned().collect();
    out.sort();
    out
}
