//! Compile-time and runtime environments.

use crate::error::Result;
use crate::reql::{Datum, Limits, ReqlVersion};
use std::collections::HashMap;
use tracing::trace;

/// Variables visible while compiling a term tree.
#[derive(Debug, Default)]
pub struct CompileEnv {
    visible: Vec<u64>,
}

impl CompileEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, var: u64) -> bool {
        self.visible.contains(&var)
    }

    /// Make `vars` visible while `f` compiles a nested body.
    pub fn with_vars<R>(&mut self, vars: &[u64], f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.visible.len();
        self.visible.extend_from_slice(vars);
        let result = f(self);
        self.visible.truncate(mark);
        result
    }
}

/// Per-evaluation state shared by every term of one query.
///
/// Variable frames are only pushed and popped through [`with_frame`], which
/// brackets a lexical construct such as a function body.
///
/// [`with_frame`]: ScopeEnv::with_frame
#[derive(Debug)]
pub struct ScopeEnv {
    limits: Limits,
    reql_version: ReqlVersion,
    frames: Vec<HashMap<u64, Datum>>,
}

impl ScopeEnv {
    pub fn new(limits: Limits, reql_version: ReqlVersion) -> Self {
        Self {
            limits,
            reql_version,
            frames: Vec::new(),
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn reql_version(&self) -> ReqlVersion {
        self.reql_version
    }

    /// Number of frames currently pushed.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost binding of `var`.
    pub fn lookup(&self, var: u64) -> Option<&Datum> {
        self.frames.iter().rev().find_map(|frame| frame.get(&var))
    }

    /// Every visible binding flattened into one frame, inner frames winning.
    pub fn bindings(&self) -> HashMap<u64, Datum> {
        let mut visible = HashMap::new();
        for frame in &self.frames {
            visible.extend(frame.iter().map(|(var, value)| (*var, value.clone())));
        }
        visible
    }

    /// Run `f` with `bindings` pushed as a new innermost frame.
    pub fn with_frame<R>(
        &mut self,
        bindings: HashMap<u64, Datum>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.frames.push(bindings);
        let result = f(self);
        self.frames.pop();
        result
    }

    /// Convert a parsed JSON document under this scope's limits.
    pub fn to_datum(&self, json: &serde_json::Value) -> Result<Datum> {
        trace!(reql_version = %self.reql_version, "Converting JSON document");
        Datum::from_json(json, &self.limits)
    }
}

impl Default for ScopeEnv {
    fn default() -> Self {
        Self::new(Limits::default(), ReqlVersion::LATEST)
    }
}
