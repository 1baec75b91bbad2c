//! Query compilation and evaluation

pub mod compiler;
pub mod env;
pub mod executor;
pub mod metrics;
pub mod registry;
pub mod term;
pub mod terms;
pub mod validator;

pub use compiler::QueryCompiler;
pub use env::{CompileEnv, ScopeEnv};
pub use executor::{QueryExecutor, Response};
pub use registry::{TermFactory, TermRegistry};
pub use term::{ArgSpec, Args, CompiledTerm, Deterministic, Func, Operator, Val};
pub use validator::CompiledSchema;

use serde_json::Value;
use tracing::{info, instrument};

/// Execute a JSON query with default limits and return the response envelope.
#[instrument(skip(query))]
pub fn execute_json(query: &Value) -> Value {
    info!("Executing JSON query");
    QueryExecutor::default().run(query).to_json()
}
