//! ReQL data model.
//!
//! This module holds everything a query is made of before it is compiled:
//!
//! - **Datum**: JSON-like immutable values, including pseudo-typed objects
//! - **Pseudo-types**: the `$reql_type$` convention and its checks
//! - **AST**: raw term trees as received from the client
//! - **Term types**: wire ids for every supported operation
//! - **Types**: resource limits, protocol versions and response codes
//!
//! Compilation and evaluation live in [`crate::query`].

pub mod ast;
pub mod datum;
pub mod pseudo;
pub mod terms;
pub mod types;

pub use ast::RawTerm;
pub use datum::{Datum, DatumArrayBuilder, DatumMap, DatumObjectBuilder};
pub use pseudo::{PseudoType, REQL_TYPE_FIELD};
pub use terms::TermType;
pub use types::*;
