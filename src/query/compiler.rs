//! ReQL wire-format parser.
//!
//! Turns a JSON-encoded query into a [`RawTerm`] tree, which the
//! [`TermRegistry`](super::TermRegistry) then compiles into executable terms.
//!
//! # Wire Protocol Format
//!
//! Queries are JSON arrays of the form:
//! ```json
//! [term_type, [arg1, arg2, ...], {"optarg1": value1, ...}]
//! ```
//!
//! Where:
//! - `term_type` is a numeric ID (u64) identifying the operation
//! - Second element is an array of positional arguments
//! - Third element (optional) is an object of named arguments
//!
//! Any JSON value that is not an array is a literal. Objects are literals
//! too, so `{"$reql_type$": "SCHEMA", ...}` arrives as a pseudo-value.
//!
//! # Example
//!
//! `r.schema({type: "number"}).validate(5)`:
//!
//! ```json
//! [201,  // VALIDATE
//!   [
//!     [200, [{"type": "number"}]],  // SCHEMA({type: "number"})
//!     5
//!   ]
//! ]
//! ```

use crate::error::{Error, Result};
use crate::reql::{Datum, Limits, RawTerm, TermType};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parser for JSON-encoded queries.
pub struct QueryCompiler;

impl QueryCompiler {
    /// Parse a JSON query into a raw term tree. Literals are converted under
    /// `limits`.
    pub fn compile(query: &Value, limits: &Limits) -> Result<RawTerm> {
        Self::compile_term(query, limits)
    }

    fn compile_term(json: &Value, limits: &Limits) -> Result<RawTerm> {
        let arr = match json {
            Value::Array(arr) => arr,
            literal => return Ok(RawTerm::datum(Datum::from_json(literal, limits)?)),
        };

        let (head, rest) = arr
            .split_first()
            .ok_or_else(|| Error::Query("Empty term array".to_string()))?;
        if rest.len() > 2 {
            return Err(Error::Query(format!(
                "Term array has {} elements, expected at most 3",
                arr.len()
            )));
        }

        let type_id = head.as_u64().ok_or_else(|| {
            Error::Query(format!("Invalid term type: expected number, got {}", head))
        })?;
        let term_type = TermType::from_u64(type_id)
            .ok_or_else(|| Error::Compile(format!("Unrecognized TermType: {}.", type_id)))?;

        // DATUM carries its value directly: [0, value]
        if term_type == TermType::Datum {
            let value = rest
                .first()
                .ok_or_else(|| Error::Query("DATUM term requires a value".to_string()))?;
            return Ok(RawTerm::datum(Datum::from_json(value, limits)?));
        }

        let args = match rest.first() {
            None => Vec::new(),
            Some(Value::Array(args)) => args
                .iter()
                .map(|arg| Self::compile_term(arg, limits))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::Query(format!(
                    "Expected an array of arguments for {}, got {}",
                    term_type, other
                )))
            }
        };

        let optargs = match rest.get(1) {
            None => BTreeMap::new(),
            Some(Value::Object(optargs)) => optargs
                .iter()
                .map(|(key, value)| Ok((key.clone(), Self::compile_term(value, limits)?)))
                .collect::<Result<BTreeMap<_, _>>>()?,
            Some(other) => {
                return Err(Error::Query(format!(
                    "Expected an object of optional arguments for {}, got {}",
                    term_type, other
                )))
            }
        };

        Ok(RawTerm::new(term_type)
            .with_args(args)
            .with_optargs(optargs))
    }
}
