// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Registry builder: two linear scans over the IR that index function
//! parameters and class methods so call dispatch never has to re-scan.

#[cfg(test)]
mod registry_test;

use crate::ir::{Instruction, Opcode};
use crate::value::{ClassRef, FunctionRef};
use std::collections::HashMap;

/// Function labels to parameter lists, and class names to their methods.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// `func_NAME_N` -> ordered parameter names.
    params: HashMap<String, Vec<String>>,
    /// Class name -> class body label (`class_NAME_N`).
    classes: HashMap<String, String>,
    /// Class name -> (method name -> method label).
    methods: HashMap<String, HashMap<String, String>>,
}

impl Registry {
    #[must_use]
    pub fn params_for(&self, func_label: &str) -> &[String] {
        self.params.get(func_label).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn class_label(&self, class_name: &str) -> Option<&str> {
        self.classes.get(class_name).map(String::as_str)
    }

    #[must_use]
    pub fn method_label(&self, class_name: &str, method: &str) -> Option<&str> {
        self.methods.get(class_name)?.get(method).map(String::as_str)
    }

    /// Build a registry from a flat instruction list with two linear scans:
    /// parameter collection, then class/method indexing.
    #[must_use]
    pub fn build(instructions: &[Instruction]) -> Self {
        let mut registry = Self::default();
        scan_parameters(instructions, &mut registry);
        scan_classes_and_methods(instructions, &mut registry);
        registry
    }
}

/// Walk blocks whose label begins with `func_`, collecting operands of
/// leading `SYMBOLIC "param:NAME"` instructions until the first
/// non-`SYMBOLIC` instruction of the function body.
fn scan_parameters(instructions: &[Instruction], registry: &mut Registry) {
    let mut i = 0;
    while i < instructions.len() {
        let instr = &instructions[i];
        if instr.opcode == Opcode::Label {
            if let Some(label) = &instr.label {
                if label.starts_with("func_") {
                    let mut params = Vec::new();
                    let mut j = i + 1;
                    while let Some(body_instr) = instructions.get(j) {
                        if body_instr.opcode != Opcode::Symbolic {
                            break;
                        }
                        let hint = body_instr.operand_str(0);
                        match hint.strip_prefix("param:") {
                            Some(name) => params.push(name.to_string()),
                            None => break,
                        }
                        j += 1;
                    }
                    registry.params.insert(label.clone(), params);
                }
            }
        }
        i += 1;
    }
}

/// First pass: find every `CONST <class:NAME@LABEL>` and record `NAME ->
/// LABEL`. Second pass: walk the IR linearly, entering class scope at a
/// `class_`-labeled block and leaving it at `end_class_*`; every
/// `CONST <function:METHOD@METHOD_LABEL>` seen in scope defines a method.
fn scan_classes_and_methods(instructions: &[Instruction], registry: &mut Registry) {
    let mut label_to_class: HashMap<String, String> = HashMap::new();

    for instr in instructions {
        if instr.opcode == Opcode::Const {
            if let Some(class_ref) = ClassRef::parse(instr.operand_str(0)) {
                registry
                    .classes
                    .insert(class_ref.name.clone(), class_ref.label.clone());
                label_to_class.insert(class_ref.label, class_ref.name);
            }
        }
    }

    let mut current_class: Option<String> = None;
    for instr in instructions {
        if instr.opcode == Opcode::Label {
            if let Some(label) = &instr.label {
                if label.starts_with("end_class_") {
                    current_class = None;
                } else if label.starts_with("class_") {
                    current_class = label_to_class.get(label).cloned();
                }
            }
            continue;
        }

        if instr.opcode == Opcode::Const {
            if let (Some(class_name), Some(func_ref)) =
                (&current_class, FunctionRef::parse(instr.operand_str(0)))
            {
                registry
                    .methods
                    .entry(class_name.clone())
                    .or_default()
                    .insert(func_ref.name, func_ref.label);
            }
        }
    }
}
