//! Pseudo-types: typed payloads layered on top of plain objects.
//!
//! On the wire a pseudo-value is an object whose reserved `$reql_type$` field
//! names its kind. Inside the engine it is a [`Datum::Pseudo`], produced only
//! by object finalisation, so the two views always agree.
//!
//! Three checks are offered, with different failure modes:
//!
//! - [`is_ptype`] never fails and is meant for branching.
//! - [`as_ptype`] fails with a logic error, for values supplied by the user.
//! - [`sanitize`] panics, for values some earlier check already classified.

use super::datum::{Datum, DatumMap};
use crate::error::{Error, Result};
use crate::sanity_check;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved field carrying the pseudo-type name.
pub const REQL_TYPE_FIELD: &str = "$reql_type$";

/// Known pseudo-type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PseudoType {
    Schema,
    Time,
    Geometry,
    Binary,
}

impl PseudoType {
    pub fn name(&self) -> &'static str {
        match self {
            PseudoType::Schema => schema::SCHEMA_STRING,
            PseudoType::Time => "TIME",
            PseudoType::Geometry => "GEOMETRY",
            PseudoType::Binary => "BINARY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            schema::SCHEMA_STRING => Some(PseudoType::Schema),
            "TIME" => Some(PseudoType::Time),
            "GEOMETRY" => Some(PseudoType::Geometry),
            "BINARY" => Some(PseudoType::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for PseudoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `value` is a pseudo-value of `kind`.
pub fn is_ptype(value: &Datum, kind: PseudoType) -> bool {
    value.pseudo_type() == Some(kind)
}

/// Unwrap a user-supplied pseudo-value of `kind` into its payload fields.
pub fn as_ptype(value: &Datum, kind: PseudoType) -> Result<&DatumMap> {
    match value {
        Datum::Pseudo { kind: found, fields } if *found == kind => Ok(fields),
        other => Err(Error::logic(format!(
            "Expected type PTYPE<{}> but found {}.",
            kind.name(),
            other.type_name()
        ))),
    }
}

/// Unwrap a pseudo-value that is already known to be of `kind`.
///
/// # Panics
///
/// If `value` is null or not a pseudo-value of `kind`.
pub fn sanitize(value: &Datum, kind: PseudoType) -> &DatumMap {
    sanity_check!(!value.is_null(), "sanitize({}) called on a null datum", kind);
    match value {
        Datum::Pseudo { kind: found, fields } if *found == kind => fields,
        other => {
            sanity_check!(
                false,
                "sanitize({}) called on a datum of type {}",
                kind,
                other.type_name()
            );
            unreachable!()
        }
    }
}

pub mod schema {
    use super::{sanitize, PseudoType};
    use crate::reql::datum::{Datum, DatumMap};

    pub const SCHEMA_STRING: &str = "SCHEMA";

    pub fn sanitize_schema(schema: &Datum) -> &DatumMap {
        sanitize(schema, PseudoType::Schema)
    }
}
