// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::Registry;
use crate::ir::{Instruction, Opcode, Operand};

fn label(name: &str) -> Instruction {
    Instruction::new(Opcode::Label, vec![]).with_label(name)
}

fn symbolic_param(name: &str) -> Instruction {
    Instruction::new(Opcode::Symbolic, vec![Operand::Str(format!("param:{name}"))])
}

fn konst(text: &str) -> Instruction {
    Instruction::new(Opcode::Const, vec![Operand::Str(text.to_string())])
}

#[test]
fn parameter_scan_collects_leading_symbolic_params_only() {
    let program = vec![
        label("func_add_1"),
        symbolic_param("a"),
        symbolic_param("b"),
        konst("\"not a param\""), // non-symbolic: stops collection
        symbolic_param("c"),     // ignored, collection already stopped
    ];
    let registry = Registry::build(&program);
    assert_eq!(registry.params_for("func_add_1"), &["a", "b"]);
}

#[test]
fn class_and_method_scan_finds_methods_within_scope() {
    let program = vec![
        konst("<class:Point@class_Point_0>"),
        label("class_Point_0"),
        konst("<function:distance_to@func_distance_to_1>"),
        label("end_class_Point_0"),
        // Outside class scope: should not register as a method.
        konst("<function:free_fn@func_free_fn_2>"),
    ];
    let registry = Registry::build(&program);
    assert_eq!(registry.class_label("Point"), Some("class_Point_0"));
    assert_eq!(
        registry.method_label("Point", "distance_to"),
        Some("func_distance_to_1")
    );
    assert_eq!(registry.method_label("Point", "free_fn"), None);
}

#[test]
fn unknown_function_or_class_returns_empty_or_none() {
    let registry = Registry::default();
    assert!(registry.params_for("func_missing_0").is_empty());
    assert_eq!(registry.class_label("Nope"), None);
    assert_eq!(registry.method_label("Nope", "m"), None);
}
