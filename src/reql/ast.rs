//! ReQL raw syntax tree.
//!
//! A query arrives as a tree of `RawTerm` nodes, where each node has:
//!
//! - A `TermType` specifying the operation
//! - Positional arguments (`args`): child terms
//! - Optional named arguments (`optargs`): key-value pairs
//! - Optional datum value for literal data
//!
//! Raw terms are pure syntax. They are turned into executable
//! [`CompiledTerm`](crate::query::CompiledTerm)s by the
//! [`TermRegistry`](crate::query::TermRegistry), which is where arity and
//! variable scoping are checked.
//!
//! # Example
//!
//! Building `r.validate(r.schema({type: "number"}), 5)`:
//!
//! ```rust,ignore
//! use photondb_reql::reql::{Datum, RawTerm};
//!
//! let schema = RawTerm::schema(RawTerm::datum(schema_obj));
//! let query = RawTerm::validate(schema, RawTerm::datum(Datum::from(5)));
//! ```

use super::datum::Datum;
use super::terms::TermType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single node of the raw query tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTerm {
    /// The type of this term
    pub term_type: TermType,

    /// Positional arguments
    pub args: Vec<RawTerm>,

    /// Optional named arguments
    pub optargs: BTreeMap<String, RawTerm>,

    /// Datum value (for Datum terms)
    pub datum: Option<Datum>,
}

impl RawTerm {
    /// Create a new term with given type
    pub fn new(term_type: TermType) -> Self {
        Self {
            term_type,
            args: Vec::new(),
            optargs: BTreeMap::new(),
            datum: None,
        }
    }

    /// Create a datum term
    pub fn datum(datum: Datum) -> Self {
        Self {
            datum: Some(datum),
            ..Self::new(TermType::Datum)
        }
    }

    /// Add a positional argument
    pub fn with_arg(mut self, arg: RawTerm) -> Self {
        self.args.push(arg);
        self
    }

    /// Add multiple positional arguments
    pub fn with_args(mut self, args: Vec<RawTerm>) -> Self {
        self.args.extend(args);
        self
    }

    /// Add an optional named argument
    pub fn with_optarg<S: Into<String>>(mut self, name: S, value: RawTerm) -> Self {
        self.optargs.insert(name.into(), value);
        self
    }

    /// Add multiple optional arguments
    pub fn with_optargs(mut self, optargs: BTreeMap<String, RawTerm>) -> Self {
        self.optargs.extend(optargs);
        self
    }

    /// Get argument at index
    pub fn arg(&self, index: usize) -> Option<&RawTerm> {
        self.args.get(index)
    }

    /// Get optional argument by name
    pub fn optarg(&self, name: &str) -> Option<&RawTerm> {
        self.optargs.get(name)
    }

    /// Check if this is a datum term
    pub fn is_datum(&self) -> bool {
        self.term_type == TermType::Datum
    }

    /// Get datum value if this is a datum term
    pub fn as_datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    /// Pretty print the term tree
    pub fn pretty_print(&self, indent: usize) -> String {
        let indent_str = "  ".repeat(indent);
        let mut result = format!("{}{}(", indent_str, self.term_type.name());

        if let Some(datum) = &self.datum {
            result.push_str(&datum.to_string());
        }

        if !self.args.is_empty() {
            result.push('\n');
            for (i, arg) in self.args.iter().enumerate() {
                result.push_str(&arg.pretty_print(indent + 1));
                if i < self.args.len() - 1 {
                    result.push(',');
                }
                result.push('\n');
            }
            result.push_str(&indent_str);
        }

        if !self.optargs.is_empty() {
            result.push_str(" {");
            for (key, value) in &self.optargs {
                result.push_str(&format!("\n{}  {}: ", indent_str, key));
                result.push_str(value.pretty_print(indent + 2).trim_start());
            }
            result.push_str(&format!("\n{}}}", indent_str));
        }

        result.push(')');
        result
    }
}

// === Convenience constructors ===

impl RawTerm {
    pub fn make_array(items: Vec<RawTerm>) -> Self {
        RawTerm::new(TermType::MakeArray).with_args(items)
    }

    pub fn make_obj(fields: BTreeMap<String, RawTerm>) -> Self {
        RawTerm::new(TermType::MakeObj).with_optargs(fields)
    }

    pub fn var(id: u64) -> Self {
        RawTerm::new(TermType::Var).with_arg(RawTerm::datum(Datum::Number(id as f64)))
    }

    /// `func([ids...], body)`
    pub fn func(params: &[u64], body: RawTerm) -> Self {
        let ids = params
            .iter()
            .map(|id| RawTerm::datum(Datum::Number(*id as f64)))
            .collect();

        RawTerm::new(TermType::Func)
            .with_arg(RawTerm::make_array(ids))
            .with_arg(body)
    }

    pub fn funcall(func: RawTerm, args: Vec<RawTerm>) -> Self {
        RawTerm::new(TermType::Funcall).with_arg(func).with_args(args)
    }

    pub fn branch(condition: RawTerm, if_true: RawTerm, if_false: RawTerm) -> Self {
        RawTerm::new(TermType::Branch)
            .with_arg(condition)
            .with_arg(if_true)
            .with_arg(if_false)
    }

    pub fn eq(left: RawTerm, right: RawTerm) -> Self {
        RawTerm::new(TermType::Eq).with_arg(left).with_arg(right)
    }

    pub fn not(term: RawTerm) -> Self {
        RawTerm::new(TermType::Not).with_arg(term)
    }

    pub fn type_of(term: RawTerm) -> Self {
        RawTerm::new(TermType::TypeOf).with_arg(term)
    }

    pub fn json(text: RawTerm) -> Self {
        RawTerm::new(TermType::Json).with_arg(text)
    }

    pub fn uuid() -> Self {
        RawTerm::new(TermType::Uuid)
    }

    pub fn schema(source: RawTerm) -> Self {
        RawTerm::new(TermType::Schema).with_arg(source)
    }

    pub fn validate(left: RawTerm, right: RawTerm) -> Self {
        RawTerm::new(TermType::Validate).with_arg(left).with_arg(right)
    }
}
