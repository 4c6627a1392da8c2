// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The state applier: the *only* routine allowed to mutate [`VmState`].
//! Everything else — the local executor, built-ins, an oracle — produces
//! a [`StateUpdate`] describing what should happen; this module is where
//! it actually happens, in the strict order the spec pins down.

#[cfg(test)]
mod applier_test;

use crate::frame::StackFrame;
use crate::state::VmState;
use crate::update::StateUpdate;

/// What happened while applying an update, for the pipeline driver to act on.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Set when `call_push` ran; the driver fills in the pushed frame's
    /// return bookkeeping immediately after this call.
    pub pushed: bool,
    /// The frame that was popped, if `call_pop` ran. Its `return_label` /
    /// `return_ip` / `result_reg` tell the driver where to resume.
    pub popped: Option<StackFrame>,
}

/// Apply `update` to `state` in the spec's strict seven-step order:
/// new heap objects, register writes (to the pre-push frame), heap writes,
/// path condition, call push, var writes (to the post-push frame, mirrored
/// into the closure environment for captured names), then call pop.
pub fn apply(state: &mut VmState, update: &StateUpdate) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    // 1. Create new heap objects.
    for (addr, type_hint) in &update.new_objects {
        state.heap.insert(*addr, crate::heap::HeapObject::new(type_hint.clone()));
    }

    // Closure environments are created the same way heap objects are: a
    // fresh address the executor minted, materialized here rather than at
    // mint time so the applier stays the sole mutator of VM state.
    for (addr, seed) in &update.new_closure_envs {
        state.closures.create(*addr, seed.clone());
    }

    // 2. Apply register writes to the caller's frame (current top, before
    //    any call_push runs). A `CONST` that just promoted a function
    //    reference to a closure also stamps its env id and captured-names
    //    set onto this same frame here.
    {
        let frame = state.current_frame_mut();
        for (reg, value) in &update.register_writes {
            frame.registers.insert(reg.clone(), value.clone());
        }
        if let Some(env_id) = update.set_closure_env_id {
            frame.closure_env_id = Some(env_id);
        }
        if let Some(names) = &update.set_captured_names {
            frame.captured_names = names.clone();
        }
    }

    // 3. Apply heap writes.
    for (addr, key, value) in &update.heap_writes {
        let object = state.heap.materialize(*addr, "object");
        object.fields.insert(key.clone(), value.clone());
    }

    // 4. Append path condition.
    if let Some(condition) = &update.path_condition {
        state.path_conditions.push(condition.clone());
    }

    // Not part of the spec's numbered steps (print has no equivalent in the
    // original opcode set) but must still land before any call_push/call_pop
    // reorders the frame stack, so it rides along with the path condition.
    state.output.extend(update.output.iter().cloned());

    // 5. Apply call_push. Return info is filled in by the driver after
    //    this call returns, using the caller's current block label and
    //    the next instruction index.
    if let Some(push) = &update.call_push {
        let mut frame = StackFrame::new(push.function_name.clone());
        frame.closure_env_id = push.closure_env_id;
        if let Some(env_id) = push.closure_env_id {
            if let Some(env) = state.closures.get(env_id) {
                frame.locals = env.bindings.clone();
                frame.captured_names = env.bindings.keys().cloned().collect();
            }
        }
        state.call_stack.push(frame);
        outcome.pushed = true;
    }

    // 6. Apply var_writes to the frame now on top (the callee's frame, if
    //    step 5 ran). Mirror captured-name writes into the shared closure
    //    environment.
    {
        let env_id = state.current_frame().closure_env_id;
        let captured: Vec<String> = update
            .var_writes
            .keys()
            .filter(|name| state.current_frame().captured_names.contains(*name))
            .cloned()
            .collect();

        let frame = state.current_frame_mut();
        for (name, value) in &update.var_writes {
            frame.locals.insert(name.clone(), value.clone());
        }

        if let Some(env_id) = env_id {
            for name in captured {
                if let Some(value) = update.var_writes.get(&name) {
                    if let Some(env) = state.closures.get_mut(env_id) {
                        env.bindings.insert(name, value.clone());
                    }
                }
            }
        }
    }

    // 7. Apply call_pop if requested.
    if update.call_pop {
        outcome.popped = state.call_stack.pop();
    }

    outcome
}
