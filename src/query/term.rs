//! Compiled terms.
//!
//! A [`CompiledTerm`] is one node of an executable query tree. Its behavior
//! comes from an [`Operator`]; the node itself owns the argument sub-terms
//! and caches the determinism class of the whole subtree, which is computed
//! once when the node is built and never re-derived during evaluation.
//!
//! Arguments are handed to operators through [`Args`], which evaluates a
//! child only when the operator asks for it. Nothing is cached between
//! evaluations, so the same tree can be run many times against different
//! scopes.

use super::env::ScopeEnv;
use super::metrics::TERMS_EVALUATED;
use crate::error::{Error, Result};
use crate::reql::{pseudo, Datum, DatumMap, PseudoType};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Accepted number of positional arguments for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    min: usize,
    max: Option<usize>,
}

impl ArgSpec {
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }

    /// Fails with an arity error naming `term` if `found` is out of range.
    pub fn check(&self, term: &'static str, found: usize) -> Result<()> {
        if self.contains(found) {
            Ok(())
        } else {
            Err(Error::Arity {
                term,
                expected: *self,
                found,
            })
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "argument"
    } else {
        "arguments"
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{} {}", max, plural(max)),
            Some(max) => write!(f, "between {} and {} arguments", self.min, max),
            None => write!(f, "{} or more arguments", self.min),
        }
    }
}

/// Whether a subtree may be distributed across servers.
///
/// Ordered from worst to best; composing terms takes the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Deterministic {
    /// Different results on every evaluation.
    Nondeterministic,
    /// Deterministic only when the whole subtree runs on one server.
    SingleServer,
    Always,
}

impl Deterministic {
    pub fn worst(self, other: Deterministic) -> Deterministic {
        self.min(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Deterministic::Nondeterministic => "nondeterministic",
            Deterministic::SingleServer => "single_server",
            Deterministic::Always => "always",
        }
    }
}

impl fmt::Display for Deterministic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user-defined function value: parameter ids, a compiled body and the
/// bindings that were in scope where the function was created.
#[derive(Debug)]
pub struct Func {
    params: Vec<u64>,
    body: Arc<CompiledTerm>,
    captured: HashMap<u64, Datum>,
}

impl Func {
    pub fn new(params: Vec<u64>, body: CompiledTerm) -> Self {
        Self {
            params,
            body: Arc::new(body),
            captured: HashMap::new(),
        }
    }

    /// Same function closed over `bindings`. The body is shared.
    pub fn capture(&self, bindings: HashMap<u64, Datum>) -> Self {
        Self {
            params: self.params.clone(),
            body: self.body.clone(),
            captured: bindings,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn body(&self) -> &CompiledTerm {
        &self.body
    }

    pub fn is_deterministic(&self) -> Deterministic {
        self.body.is_deterministic()
    }

    /// Evaluate the body with `args` bound to the parameters, on top of the
    /// captured bindings.
    pub fn call(&self, env: &mut ScopeEnv, args: Vec<Datum>) -> Result<Val> {
        if args.len() != self.params.len() {
            return Err(Error::logic(format!(
                "Expected function with {} {} but found function with {} {}.",
                args.len(),
                plural(args.len()),
                self.params.len(),
                plural(self.params.len()),
            )));
        }

        let frame = self.params.iter().copied().zip(args).collect();
        if self.captured.is_empty() {
            return env.with_frame(frame, |env| self.body.eval(env));
        }
        env.with_frame(self.captured.clone(), |env| {
            env.with_frame(frame, |env| self.body.eval(env))
        })
    }
}

/// Result of evaluating a term.
#[derive(Debug, Clone)]
pub enum Val {
    Datum(Datum),
    Func(Arc<Func>),
}

impl Val {
    pub fn type_name(&self) -> String {
        match self {
            Val::Datum(d) => d.type_name(),
            Val::Func(_) => "FUNCTION".to_string(),
        }
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::logic(format!(
            "Expected type {} but found {}.",
            expected,
            self.type_name()
        ))
    }

    pub fn as_datum(&self) -> Result<&Datum> {
        match self {
            Val::Datum(d) => Ok(d),
            other => Err(other.type_error("DATUM")),
        }
    }

    pub fn into_datum(self) -> Result<Datum> {
        match self {
            Val::Datum(d) => Ok(d),
            other => Err(other.type_error("DATUM")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Val::Datum(Datum::String(s)) => Ok(s),
            other => Err(other.type_error("STRING")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Val::Datum(Datum::Boolean(b)) => Ok(*b),
            other => Err(other.type_error("BOOL")),
        }
    }

    pub fn as_func(&self) -> Result<&Arc<Func>> {
        match self {
            Val::Func(f) => Ok(f),
            other => Err(other.type_error("FUNCTION")),
        }
    }

    /// Unwrap a pseudo-value of `kind`, failing with a user-facing error.
    pub fn as_ptype(&self, kind: PseudoType) -> Result<&DatumMap> {
        pseudo::as_ptype(self.as_datum()?, kind)
    }
}

impl From<Datum> for Val {
    fn from(datum: Datum) -> Self {
        Val::Datum(datum)
    }
}

/// Behavior of one kind of term.
///
/// Implementations are stateless apart from what they captured at compile
/// time; everything an evaluation needs comes through `env` and `args`.
pub trait Operator: Send + Sync + fmt::Debug {
    /// Stable name used in error messages and introspection.
    fn name(&self) -> &'static str;

    /// Accepted number of positional arguments in the raw term.
    fn argspec(&self) -> ArgSpec;

    fn accepts_optargs(&self) -> bool {
        false
    }

    /// Determinism of this operator alone, before its arguments are folded in.
    fn intrinsic_determinism(&self) -> Deterministic {
        Deterministic::Always
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val>;
}

/// Lazily evaluated arguments of a term.
pub struct Args<'a> {
    args: &'a [CompiledTerm],
    optargs: &'a BTreeMap<String, CompiledTerm>,
}

impl<'a> Args<'a> {
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Evaluate the `index`th argument now.
    pub fn arg(&self, env: &mut ScopeEnv, index: usize) -> Result<Val> {
        self.args
            .get(index)
            .ok_or_else(|| Error::Internal(format!("argument {} out of range", index)))?
            .eval(env)
    }

    /// Evaluate the optional argument `name`, if present.
    pub fn optarg(&self, env: &mut ScopeEnv, name: &str) -> Result<Option<Val>> {
        self.optargs.get(name).map(|term| term.eval(env)).transpose()
    }

    pub fn optarg_names(&self) -> impl Iterator<Item = &'a str> {
        self.optargs.keys().map(String::as_str)
    }
}

/// A node of an executable query tree.
#[derive(Debug)]
pub struct CompiledTerm {
    op: Box<dyn Operator>,
    args: Vec<CompiledTerm>,
    optargs: BTreeMap<String, CompiledTerm>,
    determinism: Deterministic,
}

impl CompiledTerm {
    /// Assemble a node from an operator and its compiled arguments.
    ///
    /// Positional arity is checked against the raw term by the compiler
    /// before the arguments are compiled; here only optargs are checked.
    pub fn new(
        op: Box<dyn Operator>,
        args: Vec<CompiledTerm>,
        optargs: BTreeMap<String, CompiledTerm>,
    ) -> Result<Self> {
        if !op.accepts_optargs() {
            if let Some(name) = optargs.keys().next() {
                return Err(Error::Compile(format!(
                    "Unrecognized optional argument `{}` in `{}`.",
                    name,
                    op.name()
                )));
            }
        }

        let determinism = args
            .iter()
            .chain(optargs.values())
            .map(CompiledTerm::is_deterministic)
            .fold(op.intrinsic_determinism(), Deterministic::worst);

        Ok(Self {
            op,
            args,
            optargs,
            determinism,
        })
    }

    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    /// Cached determinism class of this subtree.
    pub fn is_deterministic(&self) -> Deterministic {
        self.determinism
    }

    pub fn args(&self) -> &[CompiledTerm] {
        &self.args
    }

    /// Evaluate against `env`. Errors gain a backtrace frame for this term.
    pub fn eval(&self, env: &mut ScopeEnv) -> Result<Val> {
        trace!(term = self.name(), "Evaluating term");
        TERMS_EVALUATED.with_label_values(&[self.name()]).inc();

        let args = Args {
            args: &self.args,
            optargs: &self.optargs,
        };
        self.op.eval(env, &args).map_err(|e| e.at(self.name()))
    }

    /// Indented tree of term names and determinism classes.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0, None);
        out
    }

    fn explain_into(&self, out: &mut String, indent: usize, label: Option<&str>) {
        out.push_str(&"  ".repeat(indent));
        if let Some(label) = label {
            out.push_str(label);
            out.push_str(": ");
        }
        out.push_str(&format!("{} [{}]\n", self.name(), self.determinism));

        for arg in &self.args {
            arg.explain_into(out, indent + 1, None);
        }
        for (name, arg) in &self.optargs {
            arg.explain_into(out, indent + 1, Some(name));
        }
    }
}
