//! Literal and constructor terms: DATUM, MAKE_ARRAY, MAKE_OBJ.

use crate::error::{Error, Result};
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Operator, Val};
use crate::reql::{Datum, DatumArrayBuilder, DatumObjectBuilder, RawTerm};

#[derive(Debug)]
struct DatumTerm {
    datum: Datum,
}

impl Operator for DatumTerm {
    fn name(&self) -> &'static str {
        "datum"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(0)
    }

    fn eval(&self, _env: &mut ScopeEnv, _args: &Args<'_>) -> Result<Val> {
        Ok(Val::from(self.datum.clone()))
    }
}

#[derive(Debug)]
struct MakeArrayTerm;

impl Operator for MakeArrayTerm {
    fn name(&self) -> &'static str {
        "make_array"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::at_least(0)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let mut builder = DatumArrayBuilder::new(env.limits());
        for i in 0..args.len() {
            builder.push(args.arg(env, i)?.into_datum()?)?;
        }
        Ok(Val::from(builder.into_datum()))
    }
}

#[derive(Debug)]
struct MakeObjTerm;

impl Operator for MakeObjTerm {
    fn name(&self) -> &'static str {
        "make_obj"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(0)
    }

    fn accepts_optargs(&self) -> bool {
        true
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let mut builder = DatumObjectBuilder::new();
        for name in args.optarg_names() {
            if let Some(value) = args.optarg(env, name)? {
                builder.add(name, value.into_datum()?);
            }
        }
        builder.into_datum(env.limits()).map(Val::from)
    }
}

pub fn make_datum_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    let datum = raw
        .as_datum()
        .cloned()
        .ok_or_else(|| Error::Compile("DATUM term requires a value.".to_string()))?;
    registry.compile_op(env, raw, DatumTerm { datum })
}

pub fn make_make_array_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, MakeArrayTerm)
}

pub fn make_make_obj_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, MakeObjTerm)
}
