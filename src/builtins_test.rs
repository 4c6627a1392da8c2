// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{call, is_builtin, print_line, BuiltinOutcome};
use crate::state::VmState;
use crate::symbolic::SymbolicValue;
use crate::value::Value;

#[test]
fn recognizes_every_built_in_name() {
    for name in ["len", "range", "print", "int", "float", "bool", "str", "abs", "max", "min"] {
        assert!(is_builtin(name));
    }
    assert!(!is_builtin("not_a_builtin"));
}

#[test]
fn unknown_name_returns_none_not_uncomputable() {
    let state = VmState::new();
    assert_eq!(call(&state, "frobnicate", &[]), None);
}

#[test]
fn len_of_string() {
    let state = VmState::new();
    let out = call(&state, "len", &[Value::Str("hello".to_string())]).unwrap();
    assert_eq!(out, BuiltinOutcome::Value(Value::Number(5.0)));
}

#[test]
fn len_of_symbolic_is_uncomputable() {
    let state = VmState::new();
    let sym = Value::Symbolic(SymbolicValue::new("sym_0"));
    let out = call(&state, "len", &[sym]).unwrap();
    assert_eq!(out, BuiltinOutcome::Uncomputable);
}

#[test]
fn range_produces_a_new_array_descriptor() {
    let state = VmState::new();
    let out = call(&state, "range", &[Value::Number(3.0)]).unwrap();
    assert_eq!(
        out,
        BuiltinOutcome::NewArray(vec![
            Value::Number(0.0),
            Value::Number(1.0),
            Value::Number(2.0)
        ])
    );
}

#[test]
fn range_of_symbolic_is_uncomputable() {
    let state = VmState::new();
    let sym = Value::Symbolic(SymbolicValue::new("sym_0"));
    let out = call(&state, "range", &[sym]).unwrap();
    assert_eq!(out, BuiltinOutcome::Uncomputable);
}

#[test]
fn abs_and_max_and_min() {
    let state = VmState::new();
    assert_eq!(
        call(&state, "abs", &[Value::Number(-4.0)]).unwrap(),
        BuiltinOutcome::Value(Value::Number(4.0))
    );
    assert_eq!(
        call(&state, "max", &[Value::Number(1.0), Value::Number(9.0)]).unwrap(),
        BuiltinOutcome::Value(Value::Number(9.0))
    );
    assert_eq!(
        call(&state, "min", &[Value::Number(1.0), Value::Number(9.0)]).unwrap(),
        BuiltinOutcome::Value(Value::Number(1.0))
    );
}

#[test]
fn print_line_joins_with_spaces() {
    let line = print_line(&[Value::Str("a".to_string()), Value::Number(1.0)]);
    assert_eq!(line, "a 1");
}

#[test]
fn str_coercion_uses_value_display() {
    let state = VmState::new();
    assert_eq!(
        call(&state, "str", &[Value::Number(5.0)]).unwrap(),
        BuiltinOutcome::Value(Value::Str("5".to_string()))
    );
}
