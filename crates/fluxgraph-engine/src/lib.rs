//! Tick execution engine and provider rendezvous coordinator.
//!
//! [`Engine`] advances a compiled program one tick at a time through a
//! fixed five-stage pipeline. [`Coordinator`] runs the engine at a fixed
//! `dt`, advancing exactly one tick per generation once every registered
//! provider has submitted its inputs, and fans the resulting commands
//! out per session.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coordinator;
pub mod engine;
pub mod session;

pub use coordinator::{
    ConfigFormat, Coordinator, CoordinatorError, HealthStatus, LoadOutcome, SignalReading,
    SignalUpdate, TickOutcome,
};
pub use engine::{Engine, EngineError};
pub use session::ProviderSession;
