// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The pipeline driver: the step loop described in `§4.5`. Dispatches one
//! instruction at a time to the local executor, falls back to an oracle,
//! applies the resulting [`StateUpdate`], and interprets its control-flow
//! fields to pick the next instruction.

#[cfg(test)]
mod driver_test;

use crate::applier::apply;
use crate::cfg::{Cfg, ENTRY};
use crate::error::DriverError;
use crate::executor;
use crate::ir::Opcode;
use crate::oracle::{Oracle, Snapshot};
use crate::registry::Registry;
use crate::state::VmState;
use crate::trace::TraceRecorder;
use crate::value::Value;
use log::{debug, trace, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// `false` means the step budget was exhausted before `<main>` returned.
    pub completed: bool,
    /// The value `<main>`'s terminal `RETURN`/`THROW` delivered, if the run completed.
    pub return_value: Option<Value>,
    pub steps: u64,
}

/// Run `state` against `cfg`/`registry` until `<main>` returns or `max_steps`
/// is exhausted.
///
/// # Errors
/// Returns [`DriverError`] on malformed input: an opcode neither the
/// executor nor `oracle` handles, or a `next_label` naming a block `cfg`
/// doesn't have.
pub fn run(
    cfg: &Cfg,
    registry: &Registry,
    state: &mut VmState,
    max_steps: u64,
    oracle: &dyn Oracle,
    tracer: &mut TraceRecorder,
) -> Result<RunOutcome, DriverError> {
    let mut current_label = ENTRY.to_string();
    let mut ip = 0usize;
    let mut step = 0u64;

    loop {
        let Some(block) = cfg.get(&current_label) else {
            return Err(DriverError::DanglingTarget {
                step,
                block: current_label.clone(),
                target: current_label.clone(),
            });
        };

        if ip >= block.instructions.len() {
            let Some(next) = block.successors.first() else {
                debug!("run complete: block {current_label:?} has no successor after {step} steps");
                return Ok(RunOutcome {
                    completed: true,
                    return_value: None,
                    steps: step,
                });
            };
            current_label = next.clone();
            ip = 0;
            continue;
        }

        let instr = &block.instructions[ip];

        if instr.opcode == Opcode::Label {
            ip += 1;
            continue;
        }

        if step >= max_steps {
            warn!("step budget of {max_steps} exhausted at block {current_label:?} ip {ip}");
            return Ok(RunOutcome {
                completed: false,
                return_value: None,
                steps: step,
            });
        }

        trace!("step {step}: {current_label}:{ip} {}", instr.opcode);

        let update = executor::dispatch(registry, state, instr)
            .or_else(|| oracle.resolve(instr, &Snapshot::capture(state)))
            .ok_or_else(|| DriverError::Unhandled {
                step,
                block: current_label.clone(),
                ip,
                opcode: instr.opcode.name().to_string(),
            })?;

        tracer.record(step, &current_label, ip, instr.opcode.name(), &update);
        step += 1;

        let next_label = update.next_label.clone();
        let call_pop = update.call_pop;
        let return_value = update.return_value.clone();
        let discard_return = update.call_push.as_ref().is_some_and(|p| p.discard_return);
        let caller_result_reg = instr.result_reg.clone();
        let caller_label = current_label.clone();
        let return_ip = ip + 1;

        let outcome = apply(state, &update);

        if outcome.pushed {
            let result_reg = if discard_return { None } else { caller_result_reg };
            let frame = state.current_frame_mut();
            frame.return_label = caller_label;
            frame.return_ip = return_ip;
            frame.result_reg = result_reg;
        }

        if call_pop {
            let popped = outcome
                .popped
                .expect("applier pops exactly when call_pop is set");
            if state.call_stack.is_empty() {
                debug!("run complete: <main> returned after {step} steps");
                return Ok(RunOutcome {
                    completed: true,
                    return_value,
                    steps: step,
                });
            }
            if let Some(reg) = popped.result_reg {
                let value = return_value.unwrap_or(Value::None);
                state.current_frame_mut().registers.insert(reg, value);
            }
            current_label = popped.return_label;
            ip = popped.return_ip;
            continue;
        }

        if let Some(label) = next_label {
            if !cfg.contains(&label) {
                return Err(DriverError::DanglingTarget {
                    step,
                    block: caller_label,
                    target: label,
                });
            }
            current_label = label;
            ip = 0;
            continue;
        }

        ip += 1;
    }
}
