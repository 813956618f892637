//! Configuration loaders: YAML/JSON documents → [`GraphSpec`](fluxgraph_graph::GraphSpec).
//!
//! Both loaders walk the format's value tree rather than deriving, so
//! structural errors carry the JSON-pointer-style path of the offending
//! node (`/edges/0/transform`) and syntax errors surface the underlying
//! parser's location.
//!
//! Variant inference is uniform across formats: integers become
//! [`Variant::Int`](fluxgraph_core::Variant), floats `Float`, booleans
//! `Bool`, and everything else `Str`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
pub mod json;
pub mod yaml;

pub use error::LoadError;
