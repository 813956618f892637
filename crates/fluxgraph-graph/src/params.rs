//! Parameter lookup and coercion helpers for the compiler.
//!
//! Numeric parameters accept both `Int` and `Float` variants (integers
//! widen to `f64`); everything else is exact-typed. Failures carry the
//! `context/name` path of the offending parameter.

use fluxgraph_core::Variant;
use indexmap::IndexMap;

use crate::error::CompileError;

/// Fetch a required parameter.
pub(crate) fn require<'a>(
    params: &'a IndexMap<String, Variant>,
    name: &str,
    context: &str,
) -> Result<&'a Variant, CompileError> {
    params.get(name).ok_or_else(|| CompileError::MissingParam {
        path: format!("{context}/{name}"),
    })
}

/// Coerce to `f64`, widening integers.
pub(crate) fn as_f64(value: &Variant, path: &str) -> Result<f64, CompileError> {
    value.as_f64().ok_or_else(|| CompileError::TypeError {
        path: path.to_string(),
        expected: "number",
        got: value.type_name(),
    })
}

/// Exact `i64` view.
pub(crate) fn as_i64(value: &Variant, path: &str) -> Result<i64, CompileError> {
    value.as_i64().ok_or_else(|| CompileError::TypeError {
        path: path.to_string(),
        expected: "int",
        got: value.type_name(),
    })
}

/// Exact string view.
pub(crate) fn as_str<'a>(value: &'a Variant, path: &str) -> Result<&'a str, CompileError> {
    value.as_str().ok_or_else(|| CompileError::TypeError {
        path: path.to_string(),
        expected: "string",
        got: value.type_name(),
    })
}

/// Required numeric parameter: lookup plus coercion in one step.
pub(crate) fn require_f64(
    params: &IndexMap<String, Variant>,
    name: &str,
    context: &str,
) -> Result<f64, CompileError> {
    as_f64(require(params, name, context)?, &format!("{context}/{name}"))
}

/// Required string parameter: lookup plus coercion in one step.
pub(crate) fn require_str<'a>(
    params: &'a IndexMap<String, Variant>,
    name: &str,
    context: &str,
) -> Result<&'a str, CompileError> {
    as_str(require(params, name, context)?, &format!("{context}/{name}"))
}

/// Optional numeric parameter with a default.
pub(crate) fn optional_f64(
    params: &IndexMap<String, Variant>,
    name: &str,
    context: &str,
    default: f64,
) -> Result<f64, CompileError> {
    match params.get(name) {
        Some(value) => as_f64(value, &format!("{context}/{name}")),
        None => Ok(default),
    }
}
