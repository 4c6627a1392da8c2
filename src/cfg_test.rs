// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{Cfg, CfgError, ENTRY};
use crate::ir::{Instruction, Opcode, Operand};
use proptest::prelude::*;

fn label(name: &str) -> Instruction {
    Instruction::new(Opcode::Label, vec![]).with_label(name)
}

fn branch(target: &str) -> Instruction {
    Instruction::new(Opcode::Branch, vec![Operand::Label(target.to_string())])
}

fn branch_if(cond: &str, t: &str, f: &str) -> Instruction {
    Instruction::new(
        Opcode::BranchIf,
        vec![
            Operand::Register(cond.to_string()),
            Operand::Str(format!("{t},{f}")),
        ],
    )
}

fn ret() -> Instruction {
    Instruction::new(Opcode::Return, vec![])
}

fn konst(reg: &str) -> Instruction {
    Instruction::new(Opcode::Const, vec![Operand::Number(1.0)]).with_result(reg)
}

#[test]
fn empty_program_is_one_empty_entry_block() {
    let cfg = Cfg::build(&[]).unwrap();
    assert_eq!(cfg.labels_in_order(), &[ENTRY.to_string()]);
    assert!(cfg.get(ENTRY).unwrap().instructions.is_empty());
}

#[test]
fn straight_line_program_is_a_single_synthesized_block() {
    let program = vec![konst("%0"), konst("%1"), ret()];
    let cfg = Cfg::build(&program).unwrap();
    assert_eq!(cfg.labels_in_order().len(), 1);
    assert_eq!(cfg.get("__block_0").unwrap().instructions.len(), 3);
}

#[test]
fn branch_wires_a_single_successor_and_predecessor() {
    let program = vec![branch("target"), label("target"), ret()];
    let cfg = Cfg::build(&program).unwrap();
    let first = cfg.get("__block_0").unwrap();
    assert_eq!(first.successors, vec!["target".to_string()]);
    assert_eq!(
        cfg.get("target").unwrap().predecessors,
        vec!["__block_0".to_string()]
    );
}

#[test]
fn branch_if_wires_both_targets_in_order() {
    let program = vec![
        branch_if("%0", "t", "f"),
        label("t"),
        ret(),
        label("f"),
        ret(),
    ];
    let cfg = Cfg::build(&program).unwrap();
    let first = cfg.get("__block_0").unwrap();
    assert_eq!(first.successors, vec!["t".to_string(), "f".to_string()]);
}

#[test]
fn return_and_throw_are_terminal() {
    let program = vec![ret()];
    let cfg = Cfg::build(&program).unwrap();
    assert!(cfg.get("__block_0").unwrap().successors.is_empty());
}

#[test]
fn fall_through_links_to_the_textually_next_block() {
    let program = vec![label("a"), konst("%0"), label("b"), ret()];
    let cfg = Cfg::build(&program).unwrap();
    assert_eq!(cfg.get("a").unwrap().successors, vec!["b".to_string()]);
}

#[test]
fn dangling_branch_target_is_an_error() {
    let program = vec![branch("nowhere")];
    let err = Cfg::build(&program).unwrap_err();
    assert!(matches!(err, CfgError::DanglingTarget(label) if label == "nowhere"));
}

#[test]
fn build_is_deterministic() {
    let program = vec![
        branch_if("%0", "t", "f"),
        label("t"),
        ret(),
        label("f"),
        ret(),
    ];
    let a = Cfg::build(&program).unwrap();
    let b = Cfg::build(&program).unwrap();
    assert_eq!(a.labels_in_order(), b.labels_in_order());
    for label in a.labels_in_order() {
        assert_eq!(
            a.get(label).unwrap().successors,
            b.get(label).unwrap().successors
        );
    }
}

#[test]
fn entry_is_always_reachable_and_blocks_need_predecessors() {
    let program = vec![label("entry"), konst("%0"), ret()];
    let cfg = Cfg::build(&program).unwrap();
    assert!(cfg.is_reachable(ENTRY));
}

proptest! {
    #[test]
    fn straight_line_build_is_deterministic_for_any_length(n in 0usize..12) {
        let program: Vec<Instruction> = (0..n).map(|i| konst(&format!("%{i}"))).collect();
        let a = Cfg::build(&program).unwrap();
        let b = Cfg::build(&program).unwrap();
        prop_assert_eq!(a.labels_in_order(), b.labels_in_order());
        for label in a.labels_in_order() {
            prop_assert_eq!(
                a.get(label).unwrap().successors.clone(),
                b.get(label).unwrap().successors.clone()
            );
        }
    }

    #[test]
    fn branching_build_is_deterministic_for_any_label_names(
        cond in "[a-z]{1,6}",
        t in "[a-z]{1,6}",
        f in "[a-z]{1,6}",
    ) {
        prop_assume!(t != f);
        let program = vec![branch_if(&cond, &t, &f), label(&t), ret(), label(&f), ret()];
        let a = Cfg::build(&program).unwrap();
        let b = Cfg::build(&program).unwrap();
        prop_assert_eq!(a.labels_in_order(), b.labels_in_order());
        for label in a.labels_in_order() {
            prop_assert_eq!(
                a.get(label).unwrap().successors.clone(),
                b.get(label).unwrap().successors.clone()
            );
        }
    }
}
