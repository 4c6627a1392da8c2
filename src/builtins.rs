// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Name-indexed table of primitive functions reachable from `CALL_FUNCTION`
//! without a user or class definition: `len`, `range`, `print`, the numeric
//! coercions, `abs`, `max`, `min`.

#[cfg(test)]
mod builtins_test;

use crate::state::VmState;
use crate::value::Value;

/// All names this table answers to. The executor's built-in lookup checks
/// this before anything else in call dispatch.
pub const NAMES: &[&str] = &[
    "len", "range", "print", "int", "float", "bool", "str", "abs", "max", "min",
];

#[must_use]
pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

/// A built-in's result. `NewArray` is special-cased by the caller: building
/// the backing heap object requires minting an address and a `StateUpdate`,
/// which only the executor (not this read-only table) is allowed to do.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinOutcome {
    Value(Value),
    Uncomputable,
    NewArray(Vec<Value>),
}

/// Invoke built-in `name` with already-resolved `args`. Returns `None` if
/// `name` doesn't name a built-in at all (distinct from `Uncomputable`,
/// which means it is a built-in but couldn't evaluate these args).
#[must_use]
pub fn call(state: &VmState, name: &str, args: &[Value]) -> Option<BuiltinOutcome> {
    let outcome = match name {
        "len" => len(state, args),
        "range" => range(args),
        "print" => BuiltinOutcome::Value(Value::None), // output line is handled by the caller
        "int" => coerce_int(args),
        "float" => coerce_float(args),
        "bool" => coerce_bool(args),
        "str" => coerce_str(args),
        "abs" => abs(args),
        "max" => extremum(args, true),
        "min" => extremum(args, false),
        _ => return None,
    };
    Some(outcome)
}

/// Render `args` as the text `print` would emit, joined by a single space.
#[must_use]
pub fn print_line(args: &[Value]) -> String {
    args.iter()
        .map(std::string::ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn len(state: &VmState, args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Str(s)) => BuiltinOutcome::Value(Value::Number(s.chars().count() as f64)),
        Some(Value::Addr(addr)) => state
            .heap
            .get(*addr)
            .map_or(BuiltinOutcome::Value(Value::Number(0.0)), |obj| {
                BuiltinOutcome::Value(Value::Number(obj.fields.len() as f64))
            }),
        Some(Value::Symbolic(_)) | None => BuiltinOutcome::Uncomputable,
        Some(_) => BuiltinOutcome::Uncomputable,
    }
}

fn range(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Number(n)) if *n >= 0.0 => {
            let count = *n as u64;
            BuiltinOutcome::NewArray((0..count).map(|i| Value::Number(i as f64)).collect())
        }
        _ => BuiltinOutcome::Uncomputable,
    }
}

fn coerce_int(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Number(n)) => BuiltinOutcome::Value(Value::Number(n.trunc())),
        Some(Value::Bool(b)) => BuiltinOutcome::Value(Value::Number(f64::from(*b))),
        Some(Value::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(BuiltinOutcome::Uncomputable, |n| {
                BuiltinOutcome::Value(Value::Number(n.trunc()))
            }),
        _ => BuiltinOutcome::Uncomputable,
    }
}

fn coerce_float(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Number(n)) => BuiltinOutcome::Value(Value::Number(*n)),
        Some(Value::Bool(b)) => BuiltinOutcome::Value(Value::Number(f64::from(*b))),
        Some(Value::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(BuiltinOutcome::Uncomputable, |n| {
                BuiltinOutcome::Value(Value::Number(n))
            }),
        _ => BuiltinOutcome::Uncomputable,
    }
}

fn coerce_bool(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Symbolic(_)) | None => BuiltinOutcome::Uncomputable,
        Some(v) => BuiltinOutcome::Value(Value::Bool(v.is_truthy())),
    }
}

fn coerce_str(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Symbolic(_)) | None => BuiltinOutcome::Uncomputable,
        Some(v) => BuiltinOutcome::Value(Value::Str(v.to_string())),
    }
}

fn abs(args: &[Value]) -> BuiltinOutcome {
    match args.first() {
        Some(Value::Number(n)) => BuiltinOutcome::Value(Value::Number(n.abs())),
        _ => BuiltinOutcome::Uncomputable,
    }
}

fn extremum(args: &[Value], want_max: bool) -> BuiltinOutcome {
    let mut numbers = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::Number(n) => numbers.push(*n),
            _ => return BuiltinOutcome::Uncomputable,
        }
    }
    let picked = if want_max {
        numbers.into_iter().fold(f64::NEG_INFINITY, f64::max)
    } else {
        numbers.into_iter().fold(f64::INFINITY, f64::min)
    };
    if picked.is_finite() {
        BuiltinOutcome::Value(Value::Number(picked))
    } else {
        BuiltinOutcome::Uncomputable
    }
}
