// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{ClosureTable, StackFrame};
use crate::value::{Address, Value};
use std::collections::HashMap;

#[test]
fn main_frame_is_recognized() {
    let frame = StackFrame::main();
    assert!(frame.is_main());
    assert_eq!(frame.function_name, "<main>");
}

#[test]
fn non_main_frame_is_not_main() {
    let frame = StackFrame::new("factorial");
    assert!(!frame.is_main());
}

#[test]
fn closure_table_shares_bindings_across_lookups() {
    let mut table = ClosureTable::new();
    let env_addr = Address::Env(0);
    let mut seed = HashMap::new();
    seed.insert("count".to_string(), Value::Number(0.0));
    table.create(env_addr, seed);

    table
        .get_mut(env_addr)
        .unwrap()
        .bindings
        .insert("count".to_string(), Value::Number(1.0));

    assert_eq!(
        table.get(env_addr).unwrap().bindings.get("count"),
        Some(&Value::Number(1.0))
    );
}
