//! Term registry - maps term types to the factories that compile them.

use super::env::CompileEnv;
use super::term::{CompiledTerm, Operator};
use super::terms;
use crate::error::{Error, Result};
use crate::reql::{RawTerm, TermType};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Builds a compiled term from a raw node.
///
/// Factories receive the registry so they can compile nested terms.
pub type TermFactory = fn(&TermRegistry, &mut CompileEnv, &RawTerm) -> Result<CompiledTerm>;

lazy_static::lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<TermRegistry> = Arc::new(TermRegistry::with_builtins());
}

/// Term registry
pub struct TermRegistry {
    factories: HashMap<TermType, TermFactory>,
}

impl TermRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry holding every built-in term.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (term_type, factory) in terms::builtins() {
            registry.factories.insert(term_type, factory);
        }
        registry
    }

    /// Shared registry of built-in terms.
    pub fn global() -> Arc<TermRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    /// Register a factory for `term_type`
    pub fn register(&mut self, term_type: TermType, factory: TermFactory) -> Result<()> {
        if self.factories.contains_key(&term_type) {
            return Err(Error::Internal(format!(
                "Term '{}' already registered",
                term_type
            )));
        }
        self.factories.insert(term_type, factory);
        Ok(())
    }

    /// Unregister the factory for `term_type`
    pub fn unregister(&mut self, term_type: TermType) -> Result<()> {
        self.factories
            .remove(&term_type)
            .map(|_| ())
            .ok_or_else(|| Error::Internal(format!("Term '{}' not registered", term_type)))
    }

    pub fn contains(&self, term_type: TermType) -> bool {
        self.factories.contains_key(&term_type)
    }

    /// Compile a whole query tree.
    pub fn compile(&self, raw: &RawTerm) -> Result<CompiledTerm> {
        let mut env = CompileEnv::new();
        let term = self.compile_term(&mut env, raw)?;
        debug!(
            term = term.name(),
            determinism = %term.is_deterministic(),
            "Compiled query"
        );
        Ok(term)
    }

    /// Compile one raw node under `env`.
    pub fn compile_term(&self, env: &mut CompileEnv, raw: &RawTerm) -> Result<CompiledTerm> {
        let factory = self.factories.get(&raw.term_type).ok_or_else(|| {
            Error::Compile(format!("Unrecognized TermType: {}.", raw.term_type))
        })?;
        factory(self, env, raw)
    }

    /// Compile a regular operator node: arity is checked against the raw
    /// node, then every argument is compiled in order.
    pub fn compile_op<O: Operator + 'static>(
        &self,
        env: &mut CompileEnv,
        raw: &RawTerm,
        op: O,
    ) -> Result<CompiledTerm> {
        op.argspec().check(op.name(), raw.args.len())?;

        let args = raw
            .args
            .iter()
            .map(|arg| self.compile_term(env, arg))
            .collect::<Result<Vec<_>>>()?;
        let optargs = raw
            .optargs
            .iter()
            .map(|(name, arg)| Ok((name.clone(), self.compile_term(env, arg)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        CompiledTerm::new(Box::new(op), args, optargs)
    }
}

impl Default for TermRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
