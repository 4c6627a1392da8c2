// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Control-flow graph construction over a flat [`Instruction`] list.
//!
//! Mirrors the block-partitioning scheme a real flow-graph builder uses —
//! mark starts, cut blocks, wire successors/predecessors — the same shape
//! as a traditional basic-block builder, generalized to the four
//! instruction opcodes that end a block here (`BRANCH`, `BRANCH_IF`,
//! `RETURN`, `THROW`) instead of a target-specific terminator set.

#[cfg(test)]
mod cfg_test;

use crate::ir::{Instruction, Opcode};
use std::collections::BTreeMap;

/// One basic block: its instructions (the leading `LABEL`, if any, is
/// stripped and becomes the block's key in the [`Cfg`]) plus successor and
/// predecessor labels.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub successors: Vec<String>,
    pub predecessors: Vec<String>,
}

/// Label-indexed control-flow graph. Block order is preserved via
/// [`Cfg::order`] so "the textually next block" (used for fall-through
/// edges) is well defined.
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    blocks: BTreeMap<String, BasicBlock>,
    order: Vec<String>,
}

/// Entry label every CFG is rooted at.
pub const ENTRY: &str = "entry";

/// Error building a CFG from a malformed instruction stream.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CfgError {
    #[error("branch targets nonexistent label {0:?}")]
    DanglingTarget(String),
}

impl Cfg {
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.get(label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.blocks.contains_key(label)
    }

    #[must_use]
    pub fn labels_in_order(&self) -> &[String] {
        &self.order
    }

    /// The block immediately following `label` in program order, if any.
    #[must_use]
    pub fn next_block_label(&self, label: &str) -> Option<&str> {
        let idx = self.order.iter().position(|l| l == label)?;
        self.order.get(idx + 1).map(String::as_str)
    }

    /// A block is reachable iff it is `entry` or has a non-empty
    /// predecessor list (spec invariant 3).
    #[must_use]
    pub fn is_reachable(&self, label: &str) -> bool {
        label == ENTRY
            || self
                .blocks
                .get(label)
                .is_some_and(|b| !b.predecessors.is_empty())
    }

    /// Build a CFG from a flat instruction list.
    ///
    /// # Errors
    /// Returns [`CfgError::DanglingTarget`] if a `BRANCH`/`BRANCH_IF` names
    /// a label that doesn't exist anywhere in the instruction stream.
    pub fn build(instructions: &[Instruction]) -> Result<Self, CfgError> {
        if instructions.is_empty() {
            let mut cfg = Self::default();
            cfg.blocks.insert(ENTRY.to_string(), BasicBlock::default());
            cfg.order.push(ENTRY.to_string());
            return Ok(cfg);
        }

        let starts = mark_block_starts(instructions);
        let (labels, bodies) = cut_blocks(instructions, &starts);

        let mut cfg = Self::default();
        for (label, body) in labels.iter().zip(bodies) {
            cfg.blocks.insert(
                label.clone(),
                BasicBlock {
                    instructions: body,
                    successors: Vec::new(),
                    predecessors: Vec::new(),
                },
            );
            cfg.order.push(label.clone());
        }

        wire_edges(&mut cfg)?;
        Ok(cfg)
    }
}

/// Mark every instruction index that starts a new block.
fn mark_block_starts(instructions: &[Instruction]) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, instr) in instructions.iter().enumerate() {
        if instr.opcode == Opcode::Label && i != 0 {
            starts.push(i);
        }
        if matches!(
            instr.opcode,
            Opcode::Branch | Opcode::BranchIf | Opcode::Return | Opcode::Throw
        ) && i + 1 < instructions.len()
        {
            starts.push(i + 1);
        }
    }
    starts.sort_unstable();
    starts.dedup();
    starts
}

/// Slice the instruction stream at each start, naming blocks from a
/// leading `LABEL` or synthesizing `__block_N`.
fn cut_blocks(
    instructions: &[Instruction],
    starts: &[usize],
) -> (Vec<String>, Vec<Vec<Instruction>>) {
    let mut labels = Vec::with_capacity(starts.len());
    let mut bodies = Vec::with_capacity(starts.len());
    let mut synthetic = 0;

    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(instructions.len());
        let slice = &instructions[start..end];

        let (label, body) = if let Some(first) = slice.first() {
            if first.opcode == Opcode::Label {
                let label = first
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("__block_{synthetic}"));
                (label, slice[1..].to_vec())
            } else {
                let label = format!("__block_{synthetic}");
                (label, slice.to_vec())
            }
        } else {
            (format!("__block_{synthetic}"), Vec::new())
        };

        if instructions[start].opcode != Opcode::Label {
            synthetic += 1;
        }
        labels.push(label);
        bodies.push(body);
    }

    (labels, bodies)
}

/// Wire successor/predecessor edges by looking at each block's last
/// instruction.
fn wire_edges(cfg: &mut Cfg) -> Result<(), CfgError> {
    let order = cfg.order.clone();
    let mut edges: Vec<(String, Vec<String>)> = Vec::with_capacity(order.len());

    for (idx, label) in order.iter().enumerate() {
        let block = cfg.blocks.get(label).expect("label came from cfg.order");
        let targets = match block.instructions.last() {
            Some(instr) if instr.opcode == Opcode::Branch => {
                vec![instr.operand_str(0).to_string()]
            }
            Some(instr) if instr.opcode == Opcode::BranchIf => {
                let (t, f) = instr
                    .operand_str(1)
                    .split_once(',')
                    .unwrap_or((instr.operand_str(1), ""));
                vec![t.to_string(), f.to_string()]
            }
            Some(instr) if matches!(instr.opcode, Opcode::Return | Opcode::Throw) => Vec::new(),
            _ => order
                .get(idx + 1)
                .cloned()
                .into_iter()
                .collect::<Vec<_>>(),
        };
        edges.push((label.clone(), targets));
    }

    for (label, targets) in &edges {
        for target in targets {
            if !cfg.blocks.contains_key(target) {
                return Err(CfgError::DanglingTarget(target.clone()));
            }
        }
        cfg.blocks.get_mut(label).unwrap().successors = targets.clone();
    }

    for (label, targets) in edges {
        for target in targets {
            let preds = &mut cfg.blocks.get_mut(&target).unwrap().predecessors;
            if !preds.contains(&label) {
                preds.push(label.clone());
            }
        }
    }

    Ok(())
}
