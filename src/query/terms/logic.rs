//! EQ, NOT and TYPE_OF.

use crate::error::Result;
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Operator, Val};
use crate::reql::{Datum, RawTerm};

#[derive(Debug)]
struct EqTerm;

impl Operator for EqTerm {
    fn name(&self) -> &'static str {
        "eq"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::at_least(2)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let first = args.arg(env, 0)?.into_datum()?;
        for i in 1..args.len() {
            if args.arg(env, i)?.into_datum()? != first {
                return Ok(Val::from(Datum::Boolean(false)));
            }
        }
        Ok(Val::from(Datum::Boolean(true)))
    }
}

#[derive(Debug)]
struct NotTerm;

impl Operator for NotTerm {
    fn name(&self) -> &'static str {
        "not"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let value = args.arg(env, 0)?.as_bool()?;
        Ok(Val::from(Datum::Boolean(!value)))
    }
}

#[derive(Debug)]
struct TypeOfTerm;

impl Operator for TypeOfTerm {
    fn name(&self) -> &'static str {
        "type_of"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let value = args.arg(env, 0)?;
        Ok(Val::from(Datum::from(value.type_name())))
    }
}

pub fn make_eq_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, EqTerm)
}

pub fn make_not_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, NotTerm)
}

pub fn make_type_of_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, TypeOfTerm)
}

#[cfg(test)]
mod tests {
    use crate::query::{ScopeEnv, TermRegistry};
    use crate::reql::{Datum, RawTerm};

    fn eval(raw: &RawTerm) -> crate::error::Result<Datum> {
        let term = TermRegistry::global().compile(raw)?;
        term.eval(&mut ScopeEnv::default())?.into_datum()
    }

    #[test]
    fn test_eq() {
        let raw = RawTerm::eq(
            RawTerm::datum(Datum::from(5)),
            RawTerm::datum(Datum::Number(5.0)),
        );
        assert_eq!(eval(&raw).unwrap(), Datum::Boolean(true));

        let raw = RawTerm::eq(
            RawTerm::datum(Datum::from(5)),
            RawTerm::datum(Datum::from("5")),
        );
        assert_eq!(eval(&raw).unwrap(), Datum::Boolean(false));
    }

    #[test]
    fn test_not() {
        let raw = RawTerm::not(RawTerm::datum(Datum::Boolean(false)));
        assert_eq!(eval(&raw).unwrap(), Datum::Boolean(true));

        let err = eval(&RawTerm::not(RawTerm::datum(Datum::Null))).unwrap_err();
        assert_eq!(err.to_string(), "Expected type BOOL but found NULL.");
    }

    #[test]
    fn test_type_of() {
        let raw = RawTerm::type_of(RawTerm::datum(Datum::from("x")));
        assert_eq!(eval(&raw).unwrap(), Datum::from("STRING"));

        let raw = RawTerm::type_of(RawTerm::func(&[], RawTerm::datum(Datum::Null)));
        assert_eq!(eval(&raw).unwrap(), Datum::from("FUNCTION"));
    }
}
