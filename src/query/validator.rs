//! JSON Schema validation backed by `jsonschema`.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// A JSON Schema compiled once and checked against any number of documents.
pub struct CompiledSchema {
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    /// Compile `schema`. A document that is not a valid JSON Schema is a
    /// user error.
    pub fn compile(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| Error::logic(format!("Invalid schema: {}", e)))?;
        Ok(Self { validator })
    }

    pub fn check(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Description of the first violation, if `instance` does not conform.
    pub fn first_violation(&self, instance: &Value) -> Option<String> {
        self.validator
            .iter_errors(instance)
            .next()
            .map(|e| e.to_string())
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}
