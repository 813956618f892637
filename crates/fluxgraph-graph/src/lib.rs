//! Graph specification and compiler.
//!
//! [`GraphSpec`] is the declarative POD tree produced by configuration
//! loaders. [`compile`] validates it, interns every referenced name,
//! instantiates transforms and models, enforces single-writer ownership,
//! rejects algebraic loops, orders edges for deterministic evaluation,
//! and compiles rule conditions — yielding a [`CompiledProgram`] ready
//! for the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compiler;
pub mod condition;
mod error;
mod params;
pub mod spec;

pub use compiler::{
    compile, CompiledAction, CompiledEdge, CompiledProgram, CompiledRule, OnError,
};
pub use condition::{Comparator, Condition};
pub use error::CompileError;
pub use spec::{ActionSpec, EdgeSpec, GraphSpec, ModelSpec, RuleSpec, TransformSpec};
