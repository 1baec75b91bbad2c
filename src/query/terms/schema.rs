//! SCHEMA and VALIDATE.
//!
//! `schema` tags a mapping (given directly or as JSON text) as a
//! `PTYPE<SCHEMA>` pseudo-value. `validate` checks a value against such a
//! schema and accepts its two arguments in either order.

use super::json::parse_json_text;
use crate::error::{Error, Result};
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Deterministic, Operator, Val};
use crate::query::validator::CompiledSchema;
use crate::reql::datum::map_to_json;
use crate::reql::pseudo::{self, schema::SCHEMA_STRING};
use crate::reql::{Datum, DatumObjectBuilder, PseudoType, RawTerm, REQL_TYPE_FIELD};
use tracing::debug;

#[derive(Debug)]
struct SchemaTerm;

impl Operator for SchemaTerm {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let source = args.arg(env, 0)?.into_datum()?;
        let base = match source {
            Datum::String(text) => parse_json_text(env, &text)?,
            other => other,
        };

        let mut builder = DatumObjectBuilder::from_datum(&base)?;
        if builder.add(REQL_TYPE_FIELD, Datum::from(SCHEMA_STRING)) {
            return Err(Error::logic(
                "Schema object already had a $reql_type$ field.",
            ));
        }
        builder.into_datum(env.limits()).map(Val::from)
    }
}

#[derive(Debug)]
struct ValidateTerm;

impl Operator for ValidateTerm {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(2)
    }

    fn intrinsic_determinism(&self) -> Deterministic {
        Deterministic::SingleServer
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let first = args.arg(env, 0)?.into_datum()?;
        let second = args.arg(env, 1)?.into_datum()?;

        let (data, schema) = if pseudo::is_ptype(&first, PseudoType::Schema) {
            (&second, pseudo::sanitize(&first, PseudoType::Schema))
        } else {
            (&first, pseudo::as_ptype(&second, PseudoType::Schema)?)
        };

        let compiled = CompiledSchema::compile(&serde_json::Value::Object(map_to_json(schema)))?;
        let instance = data.to_json();
        let conforms = compiled.check(&instance);
        if !conforms {
            if let Some(violation) = compiled.first_violation(&instance) {
                debug!(violation = %violation, "Value does not conform to schema");
            }
        }
        Ok(Val::from(Datum::Boolean(conforms)))
    }
}

pub fn make_schema_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, SchemaTerm)
}

pub fn make_validate_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, ValidateTerm)
}
