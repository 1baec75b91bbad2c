//! JSON parsing shared by the JSON and SCHEMA terms.

use crate::error::{Error, Result};
use crate::query::env::{CompileEnv, ScopeEnv};
use crate::query::registry::TermRegistry;
use crate::query::term::{ArgSpec, Args, CompiledTerm, Operator, Val};
use crate::reql::datum::check_depth;
use crate::reql::{Datum, Limits, RawTerm};
use serde::Deserialize;
use std::borrow::Cow;

/// Inputs longer than this are truncated when quoted in an error.
const MAX_QUOTED_CHARS: usize = 40;
const TRUNCATED_CHARS: usize = MAX_QUOTED_CHARS - 3;

/// Shorten `text` for inclusion in an error message.
pub fn truncate_for_error(text: &str) -> Cow<'_, str> {
    if text.chars().count() > MAX_QUOTED_CHARS {
        let head: String = text.chars().take(TRUNCATED_CHARS).collect();
        Cow::Owned(format!("{}...", head))
    } else {
        Cow::Borrowed(text)
    }
}

/// Reject text whose arrays and objects nest deeper than `limits` allows.
///
/// Runs before parsing so the configured depth, not the codec's own
/// recursion guard, decides which documents are too deep.
fn check_text_depth(text: &str, limits: &Limits) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                check_depth(depth, limits)?;
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parse JSON text into a datum under the limits of `env`.
///
/// Embedded NUL bytes are rejected before the parser sees the text.
pub fn parse_json_text(env: &ScopeEnv, text: &str) -> Result<Datum> {
    if text.contains('\0') {
        return Err(Error::logic(format!(
            "Encountered unescaped null byte in JSON string: {}",
            truncate_for_error(text).escape_debug()
        )));
    }
    check_text_depth(text, env.limits())?;

    let parse_error = |e: serde_json::Error| {
        Error::logic(format!(
            "Failed to parse \"{}\" as JSON: {}",
            truncate_for_error(text),
            e
        ))
    };
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let json = serde_json::Value::deserialize(&mut de).map_err(parse_error)?;
    de.end().map_err(parse_error)?;

    env.to_datum(&json)
}

#[derive(Debug)]
struct JsonTerm;

impl Operator for JsonTerm {
    fn name(&self) -> &'static str {
        "json"
    }

    fn argspec(&self) -> ArgSpec {
        ArgSpec::exact(1)
    }

    fn eval(&self, env: &mut ScopeEnv, args: &Args<'_>) -> Result<Val> {
        let text = args.arg(env, 0)?;
        parse_json_text(env, text.as_str()?).map(Val::from)
    }
}

pub fn make_json_term(
    registry: &TermRegistry,
    env: &mut CompileEnv,
    raw: &RawTerm,
) -> Result<CompiledTerm> {
    registry.compile_op(env, raw, JsonTerm)
}
