//! Built-in terms.
//!
//! Each submodule defines operators and the factory functions the
//! [`TermRegistry`](super::TermRegistry) uses to compile them.

mod control;
mod datum;
mod json;
mod logic;
mod random;
mod schema;

pub use control::{make_branch_term, make_func_term, make_funcall_term, make_var_term};
pub use datum::{make_datum_term, make_make_array_term, make_make_obj_term};
pub use json::{make_json_term, parse_json_text, truncate_for_error};
pub use logic::{make_eq_term, make_not_term, make_type_of_term};
pub use random::make_uuid_term;
pub use schema::{make_schema_term, make_validate_term};

use super::registry::TermFactory;
use crate::reql::TermType;

/// Factories for every built-in term type.
pub fn builtins() -> Vec<(TermType, TermFactory)> {
    vec![
        (TermType::Datum, make_datum_term as TermFactory),
        (TermType::MakeArray, make_make_array_term),
        (TermType::MakeObj, make_make_obj_term),
        (TermType::Var, make_var_term),
        (TermType::Eq, make_eq_term),
        (TermType::Not, make_not_term),
        (TermType::Funcall, make_funcall_term),
        (TermType::TypeOf, make_type_of_term),
        (TermType::Json, make_json_term),
        (TermType::Branch, make_branch_term),
        (TermType::Func, make_func_term),
        (TermType::Uuid, make_uuid_term),
        (TermType::Schema, make_schema_term),
        (TermType::Validate, make_validate_term),
    ]
}
