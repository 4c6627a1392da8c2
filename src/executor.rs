// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The local executor: one handler per opcode, each producing a
//! [`StateUpdate`] instead of touching [`VmState`] directly. Dispatch never
//! fails — every opcode this core defines is handled locally — but the
//! return type stays `Option` so an oracle fallback and a not-handled path
//! remain meaningful extension points.

#[cfg(test)]
mod executor_test;

use crate::builtins::{self, BuiltinOutcome};
use crate::ir::{Instruction, Opcode, Operand};
use crate::operators::{eval_binop, eval_unop, Evaluated};
use crate::registry::Registry;
use crate::state::VmState;
use crate::update::{CallPush, StateUpdate};
use crate::value::{parse_literal, Address, ClassRef, FunctionRef, Value};

/// Dispatch one instruction. Returns `None` only for `LABEL`, which the
/// pipeline driver never routes here in the first place (it advances past
/// labels itself) — kept handled regardless so a direct call is still safe.
pub fn dispatch(registry: &Registry, state: &mut VmState, instr: &Instruction) -> Option<StateUpdate> {
    match instr.opcode {
        Opcode::Const => Some(exec_const(state, instr)),
        Opcode::LoadVar => Some(exec_load_var(state, instr)),
        Opcode::StoreVar => Some(exec_store_var(state, instr)),
        Opcode::LoadField => Some(exec_load_field(state, instr)),
        Opcode::StoreField => Some(exec_store_field(state, instr)),
        Opcode::LoadIndex => Some(exec_load_index(state, instr)),
        Opcode::StoreIndex => Some(exec_store_index(state, instr)),
        Opcode::NewObject => Some(exec_new_object(state, instr)),
        Opcode::NewArray => Some(exec_new_array(state, instr)),
        Opcode::BinOp => Some(exec_binop(state, instr)),
        Opcode::UnOp => Some(exec_unop(state, instr)),
        Opcode::Branch => Some(exec_branch(instr)),
        Opcode::BranchIf => Some(exec_branch_if(state, instr)),
        Opcode::Return => Some(exec_return(state, instr)),
        Opcode::Throw => Some(exec_throw(state, instr)),
        Opcode::Symbolic => Some(exec_symbolic(state, instr)),
        Opcode::CallFunction => Some(exec_call_function(registry, state, instr)),
        Opcode::CallMethod => Some(exec_call_method(registry, state, instr)),
        Opcode::CallUnknown => Some(exec_call_unknown(registry, state, instr)),
        Opcode::Label => None,
    }
}

fn result_reg(instr: &Instruction) -> &str {
    instr.result_reg.as_deref().unwrap_or("%_")
}

fn resolve(state: &VmState, reg: &str) -> Value {
    state
        .current_frame()
        .registers
        .get(reg)
        .cloned()
        .unwrap_or(Value::None)
}

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(std::string::ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn symbolic_call_result(state: &mut VmState, callee: &str, args: &[Value]) -> Value {
    let constraint = format!("{callee}({})", join_args(args));
    Value::Symbolic(state.fresh_symbolic(None).with_constraint(constraint))
}

// --- CONST -----------------------------------------------------------

fn literal_value(operand: &Operand) -> Value {
    match operand {
        Operand::Number(n) => Value::Number(*n),
        other => parse_literal(other.as_str()),
    }
}

fn exec_const(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let rr = result_reg(instr);
    let value = instr.operands.first().map_or(Value::None, literal_value);

    let Value::Str(text) = &value else {
        return StateUpdate::new("const").write_register(rr, value);
    };
    let Some(func_ref) = FunctionRef::parse(text) else {
        return StateUpdate::new("const").write_register(rr, value);
    };
    if state.current_frame().is_main() {
        return StateUpdate::new("const").write_register(rr, value);
    }

    let mut update = StateUpdate::new("const promotes a function reference to a closure");
    let existing_env = state.current_frame().closure_env_id;
    let env_id = match existing_env {
        Some(id) => id,
        None => {
            let id = state.new_env_id();
            let seed = state.current_frame().locals.clone();
            update.new_closure_envs.push((id, seed.clone()));
            update.set_closure_env_id = Some(id);
            update.set_captured_names = Some(seed.keys().cloned().collect());
            id
        }
    };

    let tagged = FunctionRef {
        name: func_ref.name,
        label: func_ref.label,
        closure_id: Some(env_id.id()),
    };
    update.register_writes.insert(rr.to_string(), Value::Str(tagged.to_string()));
    update
}

// --- LOAD_VAR / STORE_VAR ----------------------------------------------

fn exec_load_var(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let name = instr.operand_str(0);
    let rr = result_reg(instr);

    let from_stack = state.find_local(name).cloned();
    let from_closure = from_stack.clone().or_else(|| {
        state
            .current_frame()
            .closure_env_id
            .and_then(|env_id| state.closures.get(env_id))
            .and_then(|env| env.bindings.get(name).cloned())
    });

    let value = from_closure.unwrap_or_else(|| {
        Value::Symbolic(state.fresh_symbolic(Some(name.to_string())))
    });
    StateUpdate::new(format!("load_var {name}")).write_register(rr, value)
}

fn exec_store_var(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let name = instr.operand_str(0);
    let value = resolve(state, instr.operand_str(1));
    StateUpdate::new(format!("store_var {name}")).write_var(name, value)
}

// --- LOAD_FIELD / STORE_FIELD / LOAD_INDEX / STORE_INDEX ---------------

fn load_keyed(state: &mut VmState, target: &Value, key: &str, reasoning: String, rr: &str) -> StateUpdate {
    let Some(addr) = target.as_addr() else {
        let hint = format!("{target}.{key}");
        let value = Value::Symbolic(state.fresh_symbolic(Some(hint)));
        return StateUpdate::new(reasoning).write_register(rr, value);
    };

    if let Some(existing) = state.heap.get(addr).and_then(|obj| obj.fields.get(key)) {
        return StateUpdate::new(reasoning).write_register(rr, existing.clone());
    }

    let hint = format!("{addr}.{key}");
    let value = Value::Symbolic(state.fresh_symbolic(Some(hint)));
    let mut update = StateUpdate::new(reasoning).write_register(rr, value.clone());
    if !state.heap.contains(addr) {
        update.new_objects.push((addr, "object".to_string()));
    }
    update.heap_writes.push((addr, key.to_string(), value));
    update
}

fn store_keyed(state: &mut VmState, target: &Value, key: &str, value: Value, reasoning: String) -> StateUpdate {
    let mut update = StateUpdate::new(reasoning);
    let Some(addr) = target.as_addr() else {
        return update;
    };
    if !state.heap.contains(addr) {
        update.new_objects.push((addr, "object".to_string()));
    }
    update.heap_writes.push((addr, key.to_string(), value));
    update
}

fn exec_load_field(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let obj = resolve(state, instr.operand_str(0));
    let field = instr.operand_str(1).to_string();
    let rr = result_reg(instr).to_string();
    load_keyed(state, &obj, &field, format!("load_field {field}"), &rr)
}

fn exec_store_field(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let obj = resolve(state, instr.operand_str(0));
    let field = instr.operand_str(1).to_string();
    let value = resolve(state, instr.operand_str(2));
    store_keyed(state, &obj, &field, value, format!("store_field {field}"))
}

fn exec_load_index(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let obj = resolve(state, instr.operand_str(0));
    let index = resolve(state, instr.operand_str(1)).to_string();
    let rr = result_reg(instr).to_string();
    load_keyed(state, &obj, &index, format!("load_index {index}"), &rr)
}

fn exec_store_index(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let obj = resolve(state, instr.operand_str(0));
    let index = resolve(state, instr.operand_str(1)).to_string();
    let value = resolve(state, instr.operand_str(2));
    store_keyed(state, &obj, &index, value, format!("store_index {index}"))
}

// --- NEW_OBJECT / NEW_ARRAY ---------------------------------------------

fn exec_new_object(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let type_hint = instr.operand_str(0);
    let type_hint = if type_hint.is_empty() { "object" } else { type_hint }.to_string();
    let addr = state.new_object();
    let mut update = StateUpdate::new(format!("new_object {type_hint}"));
    update.new_objects.push((addr, type_hint));
    update.register_writes.insert(result_reg(instr).to_string(), Value::Addr(addr));
    update
}

fn exec_new_array(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let addr = state.new_array();
    let mut update = StateUpdate::new("new_array");
    update.new_objects.push((addr, "list".to_string()));
    update.register_writes.insert(result_reg(instr).to_string(), Value::Addr(addr));
    update
}

// --- BINOP / UNOP --------------------------------------------------------

fn exec_binop(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let op = instr.operand_str(0);
    let lhs = resolve(state, instr.operand_str(1));
    let rhs = resolve(state, instr.operand_str(2));
    let rr = result_reg(instr);

    let value = if lhs.is_symbolic() || rhs.is_symbolic() {
        let constraint = format!("{lhs} {op} {rhs}");
        Value::Symbolic(state.fresh_symbolic(None).with_constraint(constraint))
    } else {
        match eval_binop(op, &lhs, &rhs) {
            Evaluated::Value(v) => v,
            Evaluated::Uncomputable => {
                let constraint = format!("{lhs} {op} {rhs}");
                Value::Symbolic(state.fresh_symbolic(None).with_constraint(constraint))
            }
        }
    };
    StateUpdate::new(format!("binop {op}")).write_register(rr, value)
}

fn exec_unop(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let op = instr.operand_str(0);
    let arg = resolve(state, instr.operand_str(1));
    let rr = result_reg(instr);

    let value = if arg.is_symbolic() {
        let constraint = format!("{op} {arg}");
        Value::Symbolic(state.fresh_symbolic(None).with_constraint(constraint))
    } else {
        match eval_unop(op, &arg) {
            Evaluated::Value(v) => v,
            Evaluated::Uncomputable => {
                let constraint = format!("{op} {arg}");
                Value::Symbolic(state.fresh_symbolic(None).with_constraint(constraint))
            }
        }
    };
    StateUpdate::new(format!("unop {op}")).write_register(rr, value)
}

// --- BRANCH / BRANCH_IF --------------------------------------------------

fn exec_branch(instr: &Instruction) -> StateUpdate {
    StateUpdate::new("branch").with_next_label(instr.operand_str(0))
}

fn exec_branch_if(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let cond = resolve(state, instr.operand_str(0));
    let (true_label, false_label) = instr
        .operand_str(1)
        .split_once(',')
        .unwrap_or((instr.operand_str(1), ""));

    if let Value::Symbolic(sym) = &cond {
        let description = if sym.constraints.is_empty() {
            sym.name.clone()
        } else {
            sym.constraints.join(", ")
        };
        return StateUpdate::new("branch_if takes the true arm on a symbolic condition")
            .with_next_label(true_label)
            .with_path_condition(format!("assuming ({description}) is True"));
    }

    let label = if cond.is_truthy() { true_label } else { false_label };
    StateUpdate::new("branch_if").with_next_label(label)
}

// --- RETURN / THROW -------------------------------------------------------

fn exec_return(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let value = if instr.operands.is_empty() {
        Value::None
    } else {
        resolve(state, instr.operand_str(0))
    };
    StateUpdate::new("return").returning(value)
}

fn exec_throw(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let value = if instr.operands.is_empty() {
        Value::None
    } else {
        resolve(state, instr.operand_str(0))
    };
    let condition = format!("raised {value}");
    StateUpdate::new("throw").returning(value).with_path_condition(condition)
}

// --- SYMBOLIC --------------------------------------------------------------

fn exec_symbolic(state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let hint = instr.operand_str(0);
    let rr = result_reg(instr);

    if let Some(name) = hint.strip_prefix("param:") {
        if let Some(bound) = state.current_frame().locals.get(name).cloned() {
            return StateUpdate::new(format!("symbolic {hint} pre-bound by the caller"))
                .write_register(rr, bound);
        }
    }

    let value = Value::Symbolic(state.fresh_symbolic(Some(hint.to_string())));
    StateUpdate::new(format!("symbolic {hint}")).write_register(rr, value)
}

// --- Call dispatch -----------------------------------------------------

fn call_args(state: &VmState, instr: &Instruction, skip: usize) -> Vec<Value> {
    instr.operands[skip..]
        .iter()
        .map(|op| resolve(state, op.as_str()))
        .collect()
}

fn dispatch_user_function(func_ref: &FunctionRef, args: &[Value], registry: &Registry, reasoning: String) -> StateUpdate {
    let params = registry.params_for(&func_ref.label).to_vec();
    let mut update = StateUpdate::new(reasoning);
    update.next_label = Some(func_ref.label.clone());
    update.call_push = Some(CallPush {
        function_name: func_ref.name.clone(),
        closure_env_id: func_ref.closure_id.map(Address::Env),
        discard_return: false,
    });
    for (param, arg) in params.iter().zip(args.iter()) {
        update.var_writes.insert(param.clone(), arg.clone());
    }
    update
}

fn dispatch_constructor(class_ref: &ClassRef, args: &[Value], rr: &str, registry: &Registry, state: &mut VmState) -> StateUpdate {
    let addr = state.new_object();
    let mut update = StateUpdate::new(format!("construct {}", class_ref.name));
    update.new_objects.push((addr, class_ref.name.clone()));
    update.register_writes.insert(rr.to_string(), Value::Addr(addr));

    if let Some(init_label) = registry.method_label(&class_ref.name, "__init__") {
        let params = registry.params_for(init_label).to_vec();
        update.next_label = Some(init_label.to_string());
        update.call_push = Some(CallPush {
            function_name: format!("{}.__init__", class_ref.name),
            closure_env_id: None,
            discard_return: true,
        });
        let mut param_iter = params.iter();
        if let Some(self_param) = param_iter.next() {
            update.var_writes.insert(self_param.clone(), Value::Addr(addr));
        }
        for (param, arg) in param_iter.zip(args.iter()) {
            update.var_writes.insert(param.clone(), arg.clone());
        }
    }
    update
}

fn exec_call_function(registry: &Registry, state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let name = instr.operand_str(0);
    let rr = result_reg(instr).to_string();
    let args = call_args(state, instr, 1);

    if builtins::is_builtin(name) {
        return call_builtin(state, name, &args, &rr);
    }

    let resolved = state.find_local(name).and_then(Value::as_str).map(str::to_string);
    match resolved {
        None => {
            let value = symbolic_call_result(state, name, &args);
            StateUpdate::new(format!("call_function {name} has no definition")).write_register(rr, value)
        }
        Some(text) => {
            if let Some(class_ref) = ClassRef::parse(&text) {
                dispatch_constructor(&class_ref, &args, &rr, registry, state)
            } else if let Some(func_ref) = FunctionRef::parse(&text) {
                dispatch_user_function(&func_ref, &args, registry, format!("call_function {name}"))
            } else {
                let value = symbolic_call_result(state, name, &args);
                StateUpdate::new(format!("call_function {name} does not resolve to a callable")).write_register(rr, value)
            }
        }
    }
}

fn call_builtin(state: &mut VmState, name: &str, args: &[Value], rr: &str) -> StateUpdate {
    if name == "print" {
        let line = builtins::print_line(args);
        return StateUpdate::new("print")
            .write_register(rr, Value::None)
            .with_output(line);
    }

    match builtins::call(state, name, args) {
        Some(BuiltinOutcome::Value(v)) => StateUpdate::new(format!("builtin {name}")).write_register(rr, v),
        Some(BuiltinOutcome::Uncomputable) | None => {
            let value = symbolic_call_result(state, name, args);
            StateUpdate::new(format!("builtin {name} is uncomputable on these args")).write_register(rr, value)
        }
        Some(BuiltinOutcome::NewArray(values)) => {
            let addr = state.new_array();
            let mut update = StateUpdate::new(format!("builtin {name}"));
            update.new_objects.push((addr, "list".to_string()));
            for (i, v) in values.into_iter().enumerate() {
                update.heap_writes.push((addr, i.to_string(), v));
            }
            update.register_writes.insert(rr.to_string(), Value::Addr(addr));
            update
        }
    }
}

fn exec_call_method(registry: &Registry, state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let obj = resolve(state, instr.operand_str(0));
    let method = instr.operand_str(1);
    let rr = result_reg(instr).to_string();
    let args = call_args(state, instr, 2);

    let Some(addr) = obj.as_addr() else {
        let value = symbolic_call_result(state, &format!("{obj}.{method}"), &args);
        return StateUpdate::new(format!("call_method {method} on a non-address target")).write_register(rr, value);
    };

    let type_hint = state.heap.get(addr).map(|o| o.type_hint.clone());
    let method_label = type_hint
        .as_deref()
        .and_then(|class_name| registry.method_label(class_name, method))
        .map(str::to_string);

    let Some(method_label) = method_label else {
        let value = symbolic_call_result(state, &format!("{addr}.{method}"), &args);
        return StateUpdate::new(format!("call_method {method} has no definition")).write_register(rr, value);
    };

    let params = registry.params_for(&method_label).to_vec();
    let mut update = StateUpdate::new(format!("call_method {method}"));
    update.next_label = Some(method_label);
    update.call_push = Some(CallPush {
        function_name: format!("{}.{method}", type_hint.unwrap_or_default()),
        closure_env_id: None,
        discard_return: false,
    });
    let mut param_iter = params.iter();
    if let Some(self_param) = param_iter.next() {
        update.var_writes.insert(self_param.clone(), Value::Addr(addr));
    }
    for (param, arg) in param_iter.zip(args.iter()) {
        update.var_writes.insert(param.clone(), arg.clone());
    }
    update
}

fn exec_call_unknown(registry: &Registry, state: &mut VmState, instr: &Instruction) -> StateUpdate {
    let target = resolve(state, instr.operand_str(0));
    let rr = result_reg(instr).to_string();
    let args = call_args(state, instr, 1);

    let Value::Str(text) = &target else {
        let value = symbolic_call_result(state, &target.to_string(), &args);
        return StateUpdate::new("call_unknown target is not callable").write_register(rr, value);
    };

    if let Some(func_ref) = FunctionRef::parse(text) {
        dispatch_user_function(&func_ref, &args, registry, "call_unknown resolves to a function".to_string())
    } else if let Some(class_ref) = ClassRef::parse(text) {
        dispatch_constructor(&class_ref, &args, &rr, registry, state)
    } else {
        let value = symbolic_call_result(state, text, &args);
        StateUpdate::new("call_unknown target does not resolve to a callable").write_register(rr, value)
    }
}
