//! Variables, functions and branching: VAR, FUNC, FUNCALL, BRANCH.

use crate::error::{Error, Result};
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Deterministic, Func, Operator, Val};
use crate::reql::{Datum, RawTerm, TermType};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct VarTerm {
    var: u64,
}

impl Operator for VarTerm {
    fn name(&self) -> &'static str {
        "var"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, _args: &Args<'_>) -> Result<Val> {
        env.lookup(self.var)
            .cloned()
            .map(Val::from)
            .ok_or_else(|| Error::Internal(format!("Variable {} is unbound at runtime", self.var)))
    }
}

#[derive(Debug)]
struct FuncTerm {
    func: Arc<Func>,
}

impl Operator for FuncTerm {
    fn name(&self) -> &'static str {
        "func"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(2)
    }

    fn intrinsic_determinism(&self) -> Deterministic {
        self.func.is_deterministic()
    }

    fn eval(&self, env: &mut ScopeEnv, _args: &Args<'_>) -> Result<Val> {
        if env.depth() == 0 {
            return Ok(Val::Func(self.func.clone()));
        }
        Ok(Val::Func(Arc::new(self.func.capture(env.bindings()))))
    }
}

#[derive(Debug)]
struct FuncallTerm;

impl Operator for FuncallTerm {
    fn name(&self) -> &'static str {
        "funcall"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::at_least(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let func = args.arg(env, 0)?;
        let func = func.as_func()?;

        let mut call_args = Vec::with_capacity(args.len() - 1);
        for i in 1..args.len() {
            call_args.push(args.arg(env, i)?.into_datum()?);
        }
        func.call(env, call_args)
    }
}

#[derive(Debug)]
struct BranchTerm;

impl Operator for BranchTerm {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(3)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        // Only `false` and `null` are falsy.
        let condition = args.arg(env, 0)?.into_datum()?;
        let taken = match condition {
            Datum::Null | Datum::Boolean(false) => 2,
            _ => 1,
        };
        args.arg(env, taken)
    }
}

/// Read a variable id from a literal number term.
fn var_id(raw: &RawTerm) -> Result<u64> {
    raw.as_datum()
        .and_then(Datum::as_number)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as u64)
        .ok_or_else(|| {
            Error::Compile("Variable ids must be non-negative integers.".to_string())
        })
}

/// Parameter ids of a function, given as MAKE_ARRAY of literals or as a
/// literal array.
fn param_ids(raw: &RawTerm) -> Result<Vec<u64>> {
    match (raw.term_type, raw.as_datum()) {
        (TermType::MakeArray, _) => raw.args.iter().map(var_id).collect(),
        (TermType::Datum, Some(Datum::Array(items))) => items
            .iter()
            .map(|item| var_id(&RawTerm::datum(item.clone())))
            .collect(),
        _ => Err(Error::Compile(
            "FUNC parameters must be an array of variable ids.".to_string(),
        )),
    }
}

pub fn make_var_term(
    _registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    ArgSpec::exact(1).check("var", raw.args.len())?;
    let var = var_id(&raw.args[0])?;
    if !env.is_visible(var) {
        return Err(Error::Compile("Variable name not found.".to_string()));
    }
    CompiledTerm::new(Box::new(VarTerm { var }), Vec::new(), BTreeMap::new())
}

pub fn make_func_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    ArgSpec::exact(2).check("func", raw.args.len())?;
    let params = param_ids(&raw.args[0])?;
    let body = env.with_vars(&params, |env| registry.compile_term(env, &raw.args[1]))?;

    debug!(params = ?params, body = body.name(), "Compiled function");
    let func = Arc::new(Func::new(params, body));
    CompiledTerm::new(Box::new(FuncTerm { func }), Vec::new(), BTreeMap::new())
}

pub fn make_funcall_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, FuncallTerm)
}

pub fn make_branch_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, BranchTerm)
}
