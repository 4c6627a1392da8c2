// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::apply;
use crate::state::VmState;
use crate::update::{CallPush, StateUpdate};
use crate::value::{Address, Value};
use std::collections::HashMap;

#[test]
fn register_writes_land_on_the_frame_active_before_any_push() {
    let mut state = VmState::new();
    let update = StateUpdate::new("const").write_register("%0", Value::Number(3.0));
    apply(&mut state, &update);
    assert_eq!(
        state.current_frame().registers.get("%0"),
        Some(&Value::Number(3.0))
    );
}

#[test]
fn new_objects_are_created_before_heap_writes_referencing_them() {
    let mut state = VmState::new();
    let addr = Address::Obj(0);
    let mut update = StateUpdate::new("new_object");
    update.new_objects.push((addr, "Point".to_string()));
    update
        .heap_writes
        .push((addr, "x".to_string(), Value::Number(1.0)));

    apply(&mut state, &update);

    let object = state.heap.get(addr).unwrap();
    assert_eq!(object.type_hint, "Point");
    assert_eq!(object.fields.get("x"), Some(&Value::Number(1.0)));
}

#[test]
fn path_condition_is_appended_when_present() {
    let mut state = VmState::new();
    let update = StateUpdate::new("branch_if").with_path_condition("sym_0 != 0");
    apply(&mut state, &update);
    assert_eq!(state.path_conditions, vec!["sym_0 != 0".to_string()]);
}

#[test]
fn call_push_lands_var_writes_on_the_new_callee_frame_not_the_caller() {
    let mut state = VmState::new();
    let mut update = StateUpdate::new("call_function");
    update.call_push = Some(CallPush {
        function_name: "func_add_1".to_string(),
        closure_env_id: None,
        discard_return: false,
    });
    update.var_writes.insert("a".to_string(), Value::Number(1.0));
    update.var_writes.insert("b".to_string(), Value::Number(2.0));

    let outcome = apply(&mut state, &update);

    assert!(outcome.pushed);
    assert_eq!(state.call_stack.len(), 2);
    assert_eq!(state.current_frame().function_name, "func_add_1");
    assert_eq!(
        state.current_frame().locals.get("a"),
        Some(&Value::Number(1.0))
    );
    // the caller (main) never saw these var writes
    assert!(state.call_stack[0].locals.get("a").is_none());
}

#[test]
fn var_writes_to_a_captured_name_mirror_into_the_shared_closure_env() {
    let mut state = VmState::new();
    let env_addr = state.new_env_id();
    let mut seed = HashMap::new();
    seed.insert("count".to_string(), Value::Number(0.0));
    state.closures.create(env_addr, seed);

    let mut update = StateUpdate::new("call_function");
    update.call_push = Some(CallPush {
        function_name: "func_increment_1".to_string(),
        closure_env_id: Some(env_addr),
        discard_return: false,
    });
    update
        .var_writes
        .insert("count".to_string(), Value::Number(1.0));

    apply(&mut state, &update);

    assert_eq!(
        state.current_frame().locals.get("count"),
        Some(&Value::Number(1.0))
    );
    assert_eq!(
        state.closures.get(env_addr).unwrap().bindings.get("count"),
        Some(&Value::Number(1.0))
    );
}

#[test]
fn output_lines_are_appended_to_the_output_buffer() {
    let mut state = VmState::new();
    let update = StateUpdate::new("print").with_output("hello");
    apply(&mut state, &update);
    assert_eq!(state.output, vec!["hello".to_string()]);
}

#[test]
fn call_pop_removes_the_top_frame_and_returns_it() {
    let mut state = VmState::new();
    state.call_stack.push(crate::frame::StackFrame::new("func_f_0"));

    let update = StateUpdate::new("return").returning(Value::Number(42.0));
    let outcome = apply(&mut state, &update);

    assert_eq!(state.call_stack.len(), 1);
    let popped = outcome.popped.expect("frame should have been popped");
    assert_eq!(popped.function_name, "func_f_0");
}

#[test]
fn a_single_update_can_push_and_pop_in_the_same_call() {
    // Nothing forbids this combination; the applier must still run steps
    // 5 and 7 in order without panicking on an empty stack.
    let mut state = VmState::new();
    let mut update = StateUpdate::new("degenerate");
    update.call_push = Some(CallPush {
        function_name: "func_g_0".to_string(),
        closure_env_id: None,
        discard_return: false,
    });
    update.call_pop = true;

    let outcome = apply(&mut state, &update);

    assert!(outcome.pushed);
    let popped = outcome.popped.unwrap();
    assert_eq!(popped.function_name, "func_g_0");
    assert_eq!(state.call_stack.len(), 1);
}
