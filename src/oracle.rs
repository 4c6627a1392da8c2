// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The oracle interface (`§6`): an external collaborator consulted only
//! when the local executor doesn't handle an instruction. This core
//! handles all 20 opcodes itself, so in practice an [`Oracle`] never
//! fires — the trait exists as the documented extension point, and this
//! module gives its wire contract (a JSON-serializable [`Snapshot`]) a
//! concrete shape so an out-of-process implementation can round-trip it.

#[cfg(test)]
mod oracle_test;

use crate::ir::Instruction;
use crate::state::VmState;
use crate::update::StateUpdate;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;

/// A heap object as seen from outside the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapObjectSnapshot {
    pub type_hint: String,
    pub fields: HashMap<String, Json>,
}

/// The calling frame's registers and locals, the only frame an oracle ever
/// needs — it is consulted mid-instruction, never handed the whole stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub locals: HashMap<String, Json>,
    pub registers: HashMap<String, Json>,
}

/// A serializable snapshot of VM state, handed to an oracle alongside the
/// instruction it's being asked to resolve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub heap: HashMap<String, HeapObjectSnapshot>,
    pub frame: FrameSnapshot,
    pub path_conditions: Vec<String>,
}

impl Snapshot {
    /// Capture the current top frame and the whole heap.
    #[must_use]
    pub fn capture(state: &VmState) -> Self {
        let heap = state
            .heap
            .iter()
            .map(|(addr, obj)| {
                let fields = obj
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), to_wire(v)))
                    .collect();
                (
                    addr.to_string(),
                    HeapObjectSnapshot {
                        type_hint: obj.type_hint.clone(),
                        fields,
                    },
                )
            })
            .collect();

        let frame = state.current_frame();
        let locals = frame.locals.iter().map(|(k, v)| (k.clone(), to_wire(v))).collect();
        let registers = frame
            .registers
            .iter()
            .map(|(k, v)| (k.clone(), to_wire(v)))
            .collect();

        Self {
            heap,
            frame: FrameSnapshot { locals, registers },
            path_conditions: state.path_conditions.clone(),
        }
    }
}

/// Encode a [`Value`] per `§6`'s canonical wire contract: symbolic values
/// become `{"__symbolic__": true, "name", "type_hint", "constraints"}`,
/// everything else is the obvious JSON scalar.
#[must_use]
pub fn to_wire(value: &Value) -> Json {
    match value {
        Value::None => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Addr(a) => Json::String(a.to_string()),
        Value::Symbolic(sym) => serde_json::json!({
            "__symbolic__": true,
            "name": sym.name,
            "type_hint": sym.type_hint,
            "constraints": sym.constraints,
        }),
    }
}

/// Optional fallback consulted when the local executor returns `None`.
/// Never called by this core's own executor (every opcode is handled),
/// but the pipeline driver still asks one if the caller supplied it.
pub trait Oracle {
    /// Resolve `instr` given a snapshot of the calling frame and heap.
    /// Returning `None` means even the oracle couldn't handle it, which
    /// the driver treats as a fatal [`crate::error::DriverError::Unhandled`].
    fn resolve(&self, instr: &Instruction, snapshot: &Snapshot) -> Option<StateUpdate>;
}

/// An oracle that never resolves anything — the default when none is
/// supplied, so the driver can always hold a `&dyn Oracle` uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl Oracle for NullOracle {
    fn resolve(&self, _instr: &Instruction, _snapshot: &Snapshot) -> Option<StateUpdate> {
        None
    }
}
