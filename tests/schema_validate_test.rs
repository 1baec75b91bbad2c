//! SCHEMA / VALIDATE behavior through the public API

use photondb_reql::error::Error;
use photondb_reql::query::{
    ArgSpec, Args, CompileEnv, CompiledTerm, Operator, ScopeEnv, TermRegistry, Val,
};
use photondb_reql::reql::pseudo::{self, schema::sanitize_schema};
use photondb_reql::reql::{Datum, Limits, RawTerm, ReqlVersion, TermType};
use photondb_reql::{Deterministic, PseudoType};
use serde_json::json;
use std::sync::Arc;

fn literal(value: serde_json::Value) -> RawTerm {
    RawTerm::datum(Datum::from_json(&value, &Limits::default()).expect("valid literal"))
}

fn eval(raw: &RawTerm) -> Result<Datum, Error> {
    let term = TermRegistry::global().compile(raw)?;
    let mut env = ScopeEnv::new(Limits::default(), ReqlVersion::LATEST);
    term.eval(&mut env)?.into_datum()
}

#[test]
fn test_fresh_mapping_is_tagged() {
    let result = eval(&RawTerm::schema(literal(json!({"type": "object"})))).unwrap();
    assert!(pseudo::is_ptype(&result, PseudoType::Schema));
    assert_eq!(
        sanitize_schema(&result).get("type"),
        Some(&Datum::from("object"))
    );
}

#[test]
fn test_tagging_is_guarded() {
    // Literal already carrying the tag
    let tagged = literal(json!({"$reql_type$": "SCHEMA", "type": "number"}));
    let err = eval(&RawTerm::schema(tagged)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Schema object already had a $reql_type$ field."
    );

    // Same through JSON text
    let text = RawTerm::datum(Datum::from(r#"{"$reql_type$": "SCHEMA"}"#));
    let err = eval(&RawTerm::schema(text)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Schema object already had a $reql_type$ field."
    );
}

#[test]
fn test_string_and_object_paths_agree() {
    let text = RawTerm::datum(Datum::from(r#"{"a": 1, "b": {"c": [true]}}"#));
    let object = literal(json!({"a": 1, "b": {"c": [true]}}));
    assert_eq!(
        eval(&RawTerm::schema(text)).unwrap(),
        eval(&RawTerm::schema(object)).unwrap()
    );
}

#[test]
fn test_nul_rejected_before_parsing() {
    // Not valid JSON either; the NUL check must win.
    let text = format!("{{\"a\": 1\0{}", "x".repeat(60));
    let err = eval(&RawTerm::schema(RawTerm::datum(Datum::from(text)))).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Encountered unescaped null byte in JSON string: "));
    assert!(message.ends_with("..."));
}

#[test]
fn test_parse_error_is_truncated() {
    let text = format!("[{}", "1,".repeat(100));
    let err = eval(&RawTerm::schema(RawTerm::datum(Datum::from(text.clone())))).unwrap_err();
    let expected_prefix = format!("Failed to parse \"{}...\" as JSON: ", &text[..37]);
    assert!(
        err.to_string().starts_with(&expected_prefix),
        "unexpected message: {}",
        err
    );
}

#[test]
fn test_validate_correctness_and_symmetry() {
    let schema = || RawTerm::schema(literal(json!({"type": "number"})));

    for (value, expected) in [(json!(5), true), (json!("x"), false), (json!(null), false)] {
        let forward = eval(&RawTerm::validate(schema(), literal(value.clone()))).unwrap();
        let backward = eval(&RawTerm::validate(literal(value), schema())).unwrap();
        assert_eq!(forward, Datum::Boolean(expected));
        assert_eq!(forward, backward);
    }
}

#[test]
fn test_validate_with_two_schemas_checks_second_against_first() {
    let accepts_objects = RawTerm::schema(literal(json!({"type": "object"})));
    let other = RawTerm::schema(literal(json!({"type": "string"})));
    // The second schema is data here and is seen as an object with its tag.
    let result = eval(&RawTerm::validate(accepts_objects, other)).unwrap();
    assert_eq!(result, Datum::Boolean(true));
}

#[test]
fn test_determinism_propagation() {
    let registry = TermRegistry::global();

    let plain = registry
        .compile(&RawTerm::schema(literal(json!({}))))
        .unwrap();
    assert_eq!(plain.is_deterministic(), Deterministic::Always);

    let nested = RawTerm::not(RawTerm::validate(
        RawTerm::schema(literal(json!({}))),
        RawTerm::datum(Datum::Null),
    ));
    let term = registry.compile(&nested).unwrap();
    assert_eq!(term.is_deterministic(), Deterministic::SingleServer);

    let with_uuid = RawTerm::eq(
        RawTerm::validate(RawTerm::schema(literal(json!({}))), RawTerm::uuid()),
        RawTerm::datum(Datum::Boolean(true)),
    );
    let term = registry.compile(&with_uuid).unwrap();
    assert_eq!(term.is_deterministic(), Deterministic::Nondeterministic);
}

#[test]
fn test_arity_enforced_at_compile_time() {
    let registry = TermRegistry::global();
    let one = || RawTerm::datum(Datum::from("{}"));

    for args in [vec![], vec![one(), one()]] {
        let raw = RawTerm::new(TermType::Schema).with_args(args);
        let err = registry.compile(&raw).unwrap_err();
        assert!(err.is_compile_time());
    }
    for args in [vec![one()], vec![one(), one(), one()]] {
        let raw = RawTerm::new(TermType::Validate).with_args(args);
        let err = registry.compile(&raw).unwrap_err();
        assert!(err.is_compile_time());
        assert!(err.to_string().starts_with("Expected 2 arguments but found"));
    }
}

#[test]
fn test_object_limit_applies_to_schema() {
    let raw = RawTerm::schema(literal(json!({"a": 1, "b": 2})));
    let term = TermRegistry::global().compile(&raw).unwrap();
    let limits = Limits {
        object_size: 2,
        ..Limits::default()
    };
    // Two fields plus the tag exceed the quota before normalisation.
    let err = term
        .eval(&mut ScopeEnv::new(limits, ReqlVersion::LATEST))
        .unwrap_err();
    assert!(matches!(err.root(), Error::ResourceLimit(_)));
}

/// Term that tags its argument as a schema and reports whether it was one.
#[derive(Debug)]
struct IsSchemaTerm;

impl Operator for IsSchemaTerm {
    fn name(&self) -> &'static str {
        "is_schema"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> photondb_reql::error::Result<Val> {
        let value = args.arg(env, 0)?.into_datum()?;
        Ok(Val::from(Datum::Boolean(pseudo::is_ptype(
            &value,
            PseudoType::Schema,
        ))))
    }
}

fn make_is_schema_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> photondb_reql::error::Result<CompiledTerm> {
    registry.compile_op(env, raw, IsSchemaTerm)
}

#[test]
fn test_registry_accepts_external_operators() {
    let mut registry = TermRegistry::with_builtins();
    assert!(registry
        .register(TermType::TypeOf, make_is_schema_term)
        .is_err());

    registry.unregister(TermType::TypeOf).unwrap();
    registry
        .register(TermType::TypeOf, make_is_schema_term)
        .unwrap();

    let registry = Arc::new(registry);
    let raw = RawTerm::type_of(RawTerm::schema(literal(json!({}))));
    let term = registry.compile(&raw).unwrap();
    let result = term.eval(&mut ScopeEnv::default()).unwrap().into_datum().unwrap();
    assert_eq!(result, Datum::Boolean(true));
}
