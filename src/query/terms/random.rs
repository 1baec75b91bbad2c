//! UUID generation.

use crate::error::Result;
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Deterministic, Operator, Val};
use crate::reql::{Datum, RawTerm};
use uuid::Uuid;

#[derive(Debug)]
struct UuidTerm;

impl Operator for UuidTerm {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(0)
    }

    fn intrinsic_determinism(&self) -> Deterministic {
        Deterministic::Nondeterministic
    }

    fn eval(&self, _env: &mut ScopeEnv, _args: &Args<'_>) -> Result<Val> {
        Ok(Val::from(Datum::from(Uuid::new_v4().to_string())))
    }
}

pub fn make_uuid_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, UuidTerm)
}
