//! End-to-end tests for ReQL query execution

use photondb_reql::query::{QueryCompiler, QueryExecutor};
use photondb_reql::reql::{Datum, Limits, ReqlVersion, ResponseType, TermType};
use photondb_reql::{Deterministic, PseudoType};
use serde_json::json;

#[test]
fn test_query_compilation_and_execution() {
    let executor = QueryExecutor::default();

    // Test 1: DATUM
    // Wire protocol format: [TermType, value]
    let datum_query = json!([0, 42]);
    let raw = QueryCompiler::compile(&datum_query, &Limits::default())
        .expect("Failed to parse DATUM");
    assert_eq!(raw.term_type, TermType::Datum);

    let term = executor.compile(&datum_query).expect("Failed to compile DATUM");
    let result = executor.execute(&term).expect("Failed to execute DATUM");
    match result {
        Datum::Number(n) => {
            assert_eq!(n, 42.0, "Expected 42");
            println!("✓ DATUM query returned: {}", n);
        }
        _ => panic!("Expected number from datum, got: {:?}", result),
    }

    // Test 2: SCHEMA from JSON text
    let schema_query = json!([200, ["{\"type\": \"string\"}"]]);
    let term = executor.compile(&schema_query).expect("Failed to compile SCHEMA");
    let schema = executor.execute(&term).expect("Failed to execute SCHEMA");
    assert_eq!(schema.pseudo_type(), Some(PseudoType::Schema));
    assert_eq!(
        schema.to_json(),
        json!({"type": "string", "$reql_type$": "SCHEMA"})
    );
    println!("✓ SCHEMA query returned: {}", schema);

    // Test 3: VALIDATE, data first
    let validate_query = json!([201, ["hello", [200, [{"type": "string"}]]]]);
    let term = executor.compile(&validate_query).expect("Failed to compile VALIDATE");
    assert_eq!(term.is_deterministic(), Deterministic::SingleServer);
    let result = executor.execute(&term).expect("Failed to execute VALIDATE");
    assert_eq!(result, Datum::Boolean(true));
    println!("✓ VALIDATE(\"hello\", schema) = {}", result);

    println!("\n✓ All query execution tests passed!");
}

#[test]
fn test_schema_literal_round_trip() {
    let executor = QueryExecutor::default();

    // A schema produced by one query can be sent back as a literal.
    let response = executor.run(&json!([200, [{"type": "number", "minimum": 0}]]));
    assert!(response.is_success());
    let schema_json = response.result[0].to_json();

    let response = executor.run(&json!([201, [schema_json.clone(), 3]]));
    assert_eq!(response.to_json(), json!({"t": 1, "r": [true]}));

    let response = executor.run(&json!([201, [-1, schema_json]]));
    assert_eq!(response.to_json(), json!({"t": 1, "r": [false]}));
}

#[test]
fn test_functions_and_branches() {
    let executor = QueryExecutor::default();

    // r.do(5, x => r.branch(r.validate(x, schema), "ok", "bad"))
    let query = json!([64, [
        [103, [[1, [1]],
            [99, [
                [201, [[3, [1]], [200, [{"type": "integer"}]]]],
                "ok",
                "bad"
            ]]
        ]],
        5
    ]]);
    let response = executor.run(&query);
    assert_eq!(response.to_json(), json!({"t": 1, "r": ["ok"]}));

    let term = executor.compile(&query).expect("Failed to compile");
    assert_eq!(term.is_deterministic(), Deterministic::SingleServer);
    let explain = term.explain();
    assert!(explain.starts_with("funcall [single_server]\n"));
    assert!(explain.contains("  func [single_server]\n"));
}

#[test]
fn test_returned_function_closes_over_scope() {
    let executor = QueryExecutor::default();

    // r.do(5, x => (y => x))(6)
    let query = json!([64, [[64, [[103, [[1, [1]], [103, [[1, [2]], [3, [1]]]]]], 5]], 6]]);
    let response = executor.run(&query);
    assert_eq!(response.to_json(), json!({"t": 1, "r": [5]}));
}

#[test]
fn test_error_responses() {
    let executor = QueryExecutor::default();

    let response = executor.run(&json!([201, [5]]));
    assert_eq!(response.response_type, ResponseType::CompileError);
    assert_eq!(
        response.result,
        vec![Datum::from("Expected 2 arguments but found 1 in `validate`.")]
    );

    let response = executor.run(&json!([201, [5, {"type": "number"}]]));
    assert_eq!(
        response.to_json(),
        json!({
            "t": 18,
            "r": ["Expected type PTYPE<SCHEMA> but found OBJECT."],
            "e": 3000000,
            "b": ["validate"]
        })
    );

    let response = executor.run(&json!([3, [1]]));
    assert_eq!(response.response_type, ResponseType::CompileError);

    let response = executor.run(&json!({"$reql_type$": "NOPE"}));
    assert_eq!(response.response_type, ResponseType::RuntimeError);
    assert_eq!(
        response.result,
        vec![Datum::from("Unknown $reql_type$ `NOPE`.")]
    );
}

#[test]
fn test_limits_from_executor() {
    let limits = Limits {
        nesting_depth: 2,
        ..Limits::default()
    };
    let executor = QueryExecutor::new(limits, ReqlVersion::V2_0);

    let response = executor.run(&json!([98, ["[[[1]]]"]]));
    assert_eq!(
        response.to_json(),
        json!({
            "t": 18,
            "r": ["Maximum nesting depth `2` exceeded."],
            "e": 2000000,
            "b": ["json"]
        })
    );

    let response = executor.run(&json!([98, ["[[1]]"]]));
    assert!(response.is_success());
}

#[test]
fn test_deep_json_text_honours_configured_depth() {
    let deep = format!("{}1{}", "[".repeat(200), "]".repeat(200));

    let executor = QueryExecutor::new(
        Limits {
            nesting_depth: 1000,
            ..Limits::default()
        },
        ReqlVersion::LATEST,
    );
    let response = executor.run(&json!([98, [deep.clone()]]));
    assert!(response.is_success(), "unexpected response: {}", response.to_json());

    let executor = QueryExecutor::default();
    let response = executor.run(&json!([98, [deep]]));
    assert_eq!(response.response_type, ResponseType::RuntimeError);
    assert_eq!(response.to_json()["e"], json!(2000000));
}
