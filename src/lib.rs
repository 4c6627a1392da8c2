// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # symvm
//!
//! A deterministic symbolic virtual machine over a flattened three-address
//! IR.
//!
//! This crate provides:
//! - A control-flow graph builder over the flat [`ir::Instruction`] stream
//! - A local executor covering all 20 opcodes, each producing a pure
//!   [`update::StateUpdate`] instead of touching state directly
//! - A state applier enforcing the strict seven-step apply order
//! - An [`oracle::Oracle`] extension point and its JSON wire contract, for
//!   instructions an embedder wants resolved out of process
//! - The [`driver::run`] step loop tying all of the above together
//!
//! Every value an expression can't resolve concretely becomes a
//! [`value::Value::Symbolic`] stand-in rather than a hard failure; the only
//! way this crate stops early is a malformed instruction stream
//! ([`error::DriverError`]).

pub mod applier;
pub mod builtins;
pub mod cfg;
pub mod error;
pub mod executor;
pub mod frame;
pub mod heap;
pub mod ir;
pub mod operators;
pub mod oracle;
pub mod registry;
pub mod state;
pub mod symbolic;
pub mod trace;
pub mod update;
pub mod value;

pub mod driver;

pub use cfg::{Cfg, CfgError};
pub use driver::{run, RunOutcome};
pub use error::DriverError;
pub use oracle::{NullOracle, Oracle, Snapshot};
pub use registry::Registry;
pub use state::VmState;
pub use trace::{TraceEvent, TraceRecorder};
pub use value::Value;
