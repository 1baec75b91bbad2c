//! ReQL term type ids.
//!
//! The discriminant values are the ids used on the JSON wire format
//! `[term_type, [args...], {optargs...}]`.
//!
//! # Term Categories
//!
//! - **Core Data**: DATUM, MAKE_ARRAY, MAKE_OBJ
//! - **Variables & Functions**: VAR, FUNC, FUNCALL
//! - **Logic**: EQ, NOT, BRANCH
//! - **Type Operations**: TYPE_OF
//! - **Parsing**: JSON
//! - **Generators**: UUID
//! - **Schemas**: SCHEMA, VALIDATE
//!
//! # Example
//!
//! ```rust,ignore
//! use photondb_reql::reql::TermType;
//!
//! let term_type = TermType::from_u64(200).unwrap();
//! assert_eq!(term_type, TermType::Schema);
//! assert_eq!(term_type.name(), "SCHEMA");
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u64)]
pub enum TermType {
    // Core data types
    Datum = 0,
    MakeArray = 1,
    MakeObj = 2,

    // Variables
    Var = 3,

    // Logic operators
    Eq = 13,
    Not = 19,

    // Function application
    Funcall = 64,

    // Type operations
    TypeOf = 72,

    // Parsing
    Json = 98,

    // Control flow
    Branch = 99,
    Func = 103,

    // Generators
    Uuid = 169,

    // Schemas
    Schema = 200,
    Validate = 201,
}

impl TermType {
    /// All known term types, in wire id order.
    pub const ALL: [TermType; 14] = [
        TermType::Datum,
        TermType::MakeArray,
        TermType::MakeObj,
        TermType::Var,
        TermType::Eq,
        TermType::Not,
        TermType::Funcall,
        TermType::TypeOf,
        TermType::Json,
        TermType::Branch,
        TermType::Func,
        TermType::Uuid,
        TermType::Schema,
        TermType::Validate,
    ];

    /// Converts from a wire term type id.
    ///
    /// Returns `None` if the id is unknown.
    pub fn from_u64(value: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.to_u64() == value)
    }

    /// Converts to the wire term type id.
    pub fn to_u64(self) -> u64 {
        self as u64
    }

    /// Uppercase term name, as used in raw tree dumps.
    pub fn name(&self) -> &'static str {
        match self {
            TermType::Datum => "DATUM",
            TermType::MakeArray => "MAKE_ARRAY",
            TermType::MakeObj => "MAKE_OBJ",
            TermType::Var => "VAR",
            TermType::Eq => "EQ",
            TermType::Not => "NOT",
            TermType::Funcall => "FUNCALL",
            TermType::TypeOf => "TYPE_OF",
            TermType::Json => "JSON",
            TermType::Branch => "BRANCH",
            TermType::Func => "FUNC",
            TermType::Uuid => "UUID",
            TermType::Schema => "SCHEMA",
            TermType::Validate => "VALIDATE",
        }
    }
}

impl std::fmt::Display for TermType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
