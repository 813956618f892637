//! Compile-time errors: structural and graph-validation failures.

use std::error::Error;
use std::fmt;

/// Errors detected while compiling a [`GraphSpec`](crate::GraphSpec).
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    /// A transform kind the compiler does not know.
    UnknownTransformKind {
        /// The unrecognized kind string.
        kind: String,
    },
    /// A model kind the compiler does not know.
    UnknownModelKind {
        /// The unrecognized kind string.
        kind: String,
    },
    /// A required parameter is absent.
    MissingParam {
        /// Context path, e.g. `transform[linear]/scale`.
        path: String,
    },
    /// A parameter holds the wrong variant type.
    TypeError {
        /// Context path of the offending parameter.
        path: String,
        /// The type the compiler required.
        expected: &'static str,
        /// The type the spec supplied.
        got: &'static str,
    },
    /// A parameter is the right type but out of range.
    InvalidParam {
        /// Context path of the offending parameter.
        path: String,
        /// What the compiler required.
        reason: String,
    },
    /// A rule condition does not match the supported grammar.
    InvalidCondition {
        /// The rule whose condition failed to parse.
        rule: String,
        /// Parse failure detail.
        reason: String,
    },
    /// Two writers (edge targets and/or model outputs) claim one signal.
    MultipleWriters {
        /// Path of the multiply-written signal.
        signal: String,
        /// Description of the writer registered first.
        first: String,
        /// Description of the conflicting writer.
        second: String,
    },
    /// The non-delay subgraph contains a cycle.
    AlgebraicLoop {
        /// The cycle, as signal paths, first node repeated at the end.
        cycle: Vec<String>,
    },
    /// A model's stability limit is below the configured time step.
    StabilityViolation {
        /// The model's `describe()` output.
        model: String,
        /// The model's stability limit in seconds.
        limit: f64,
        /// The configured time step in seconds.
        dt: f64,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTransformKind { kind } => {
                write!(f, "unknown transform kind: '{kind}'")
            }
            Self::UnknownModelKind { kind } => {
                write!(f, "unknown model kind: '{kind}'")
            }
            Self::MissingParam { path } => {
                write!(f, "missing required parameter at {path}")
            }
            Self::TypeError {
                path,
                expected,
                got,
            } => {
                write!(f, "type error at {path}: expected {expected}, got {got}")
            }
            Self::InvalidParam { path, reason } => {
                write!(f, "invalid parameter at {path}: {reason}")
            }
            Self::InvalidCondition { rule, reason } => {
                write!(
                    f,
                    "unsupported condition for rule '{rule}': {reason} \
                     (supported form: <signal_path> <op> <number>)"
                )
            }
            Self::MultipleWriters {
                signal,
                first,
                second,
            } => {
                write!(
                    f,
                    "multiple writers for signal '{signal}': {first} conflicts with {second}"
                )
            }
            Self::AlgebraicLoop { cycle } => {
                if cycle.is_empty() {
                    write!(f, "algebraic loop detected in non-delay subgraph")
                } else {
                    write!(
                        f,
                        "algebraic loop in non-delay subgraph: {}. \
                         Add a delay edge in the feedback path",
                        cycle.join(" -> ")
                    )
                }
            }
            Self::StabilityViolation { model, limit, dt } => {
                write!(
                    f,
                    "stability violation: {model} requires dt < {limit}s, but dt = {dt}s"
                )
            }
        }
    }
}

impl Error for CompileError {}
