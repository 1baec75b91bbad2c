//! ReQL Query Executor.
//!
//! Runs a wire query end to end: parse, compile against a
//! [`TermRegistry`], evaluate in a fresh [`ScopeEnv`] and wrap the outcome
//! in a [`Response`] envelope.
//!
//! # Example
//!
//! ```rust
//! use photondb_reql::query::QueryExecutor;
//! use serde_json::json;
//!
//! let executor = QueryExecutor::default();
//! let response = executor.run(&json!([201, [[200, [{"type": "number"}]], 5]]));
//! assert_eq!(response.to_json(), json!({"t": 1, "r": [true]}));
//! ```

use super::compiler::QueryCompiler;
use super::env::ScopeEnv;
use super::metrics;
use super::registry::TermRegistry;
use super::term::CompiledTerm;
use crate::config::ReqlConfig;
use crate::error::{Error, Result};
use crate::reql::{Datum, ErrorType, Limits, ReqlVersion, ResponseType};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Outcome of one query, in the shape clients expect on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub response_type: ResponseType,
    /// The value on success, the error message otherwise.
    pub result: Vec<Datum>,
    pub error_type: Option<ErrorType>,
    /// Term names from the outermost frame to the failing term.
    pub backtrace: Vec<String>,
}

impl Response {
    pub fn success(value: Datum) -> Self {
        Self {
            response_type: ResponseType::SuccessAtom,
            result: vec![value],
            error_type: None,
            backtrace: Vec::new(),
        }
    }

    pub fn error(err: &Error) -> Self {
        let (response_type, error_type) = match err.root() {
            Error::Compile(_) | Error::Arity { .. } => (ResponseType::CompileError, None),
            Error::Query(_) => (ResponseType::ClientError, None),
            Error::Logic(_) => (ResponseType::RuntimeError, Some(ErrorType::QueryLogic)),
            Error::ResourceLimit(_) => {
                (ResponseType::RuntimeError, Some(ErrorType::ResourceLimit))
            }
            _ => (ResponseType::RuntimeError, Some(ErrorType::Internal)),
        };

        Self {
            response_type,
            result: vec![Datum::from(err.root().to_string())],
            error_type,
            backtrace: err.backtrace().into_iter().map(String::from).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::SuccessAtom
    }

    /// `{"t": .., "r": [..], "e": .., "b": [..]}`; `e` and `b` only when set.
    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "t": self.response_type.code(),
            "r": self.result.iter().map(Datum::to_json).collect::<Vec<_>>(),
        });
        if let Some(error_type) = self.error_type {
            out["e"] = json!(error_type.code());
        }
        if !self.backtrace.is_empty() {
            out["b"] = json!(self.backtrace);
        }
        out
    }
}

/// ReQL Query Executor
pub struct QueryExecutor {
    registry: Arc<TermRegistry>,
    limits: Limits,
    reql_version: ReqlVersion,
}

impl QueryExecutor {
    /// Create an executor over the built-in terms
    pub fn new(limits: Limits, reql_version: ReqlVersion) -> Self {
        Self {
            registry: TermRegistry::global(),
            limits,
            reql_version,
        }
    }

    pub fn from_config(config: &ReqlConfig) -> Self {
        Self::new(config.limits, config.reql_version)
    }

    /// Use a custom registry, e.g. one with extra terms registered.
    pub fn with_registry(mut self, registry: Arc<TermRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Parse and compile a wire query.
    pub fn compile(&self, query: &Value) -> Result<CompiledTerm> {
        let raw = QueryCompiler::compile(query, &self.limits)?;
        debug!(query = %raw.pretty_print(0), "Parsed query");
        self.registry.compile(&raw)
    }

    /// Evaluate a compiled term in a fresh scope.
    pub fn execute(&self, term: &CompiledTerm) -> Result<Datum> {
        let mut env = ScopeEnv::new(self.limits, self.reql_version);
        term.eval(&mut env)?.into_datum()
    }

    /// Compile and evaluate `query`, recording metrics for the outcome.
    #[instrument(skip(self, query), fields(reql_version = %self.reql_version))]
    pub fn run(&self, query: &Value) -> Response {
        let start = Instant::now();

        let response = match self.compile(query).and_then(|term| self.execute(&term)) {
            Ok(value) => Response::success(value),
            Err(err) => {
                warn!(
                    error = %err,
                    backtrace = ?err.backtrace(),
                    "Query failed"
                );
                Response::error(&err)
            }
        };

        metrics::record_query(
            response.response_type.name(),
            start.elapsed().as_secs_f64(),
        );
        response
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(Limits::default(), ReqlVersion::LATEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let executor = QueryExecutor::default();
        let response = executor.run(&json!([13, [5, 5]]));
        assert!(response.is_success());
        assert_eq!(response.to_json(), json!({"t": 1, "r": [true]}));
    }

    #[test]
    fn test_compile_error_response() {
        let executor = QueryExecutor::default();
        let response = executor.run(&json!([200, []]));
        assert_eq!(response.response_type, ResponseType::CompileError);
        assert_eq!(
            response.to_json(),
            json!({"t": 17, "r": ["Expected 1 argument but found 0 in `schema`."]})
        );
    }

    #[test]
    fn test_client_error_response() {
        let executor = QueryExecutor::default();
        let response = executor.run(&json!([]));
        assert_eq!(response.response_type, ResponseType::ClientError);
        assert_eq!(response.error_type, None);
    }

    #[test]
    fn test_runtime_error_response() {
        let executor = QueryExecutor::default();
        let response = executor.run(&json!([19, [[200, ["{}"]]]]));
        assert_eq!(
            response.to_json(),
            json!({
                "t": 18,
                "r": ["Expected type BOOL but found PTYPE<SCHEMA>."],
                "e": 3000000,
                "b": ["not"]
            })
        );
    }

    #[test]
    fn test_resource_limit_response() {
        let limits = Limits {
            array_size: 1,
            ..Limits::default()
        };
        let executor = QueryExecutor::new(limits, ReqlVersion::LATEST);
        let response = executor.run(&json!([1, [1, 2]]));
        assert_eq!(response.error_type, Some(ErrorType::ResourceLimit));
        assert_eq!(response.backtrace, vec!["make_array".to_string()]);
    }

    #[test]
    fn test_function_result_is_runtime_error() {
        let executor = QueryExecutor::default();
        let response = executor.run(&json!([103, [[1, [1]], [3, [1]]]]));
        assert_eq!(response.error_type, Some(ErrorType::QueryLogic));
        assert_eq!(
            response.result,
            vec![Datum::from("Expected type DATUM but found FUNCTION.")]
        );
    }
}
