//! Physics models for the FluxGraph simulation engine.
//!
//! A model is a multi-input/multi-output integrator advanced once per
//! tick against the signal store. Models declare an explicit-integrator
//! stability limit that the compiler checks against the configured time
//! step and the engine re-checks at runtime.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod model;
mod thermal_mass;

pub use model::{Model, ModelOutput};
pub use thermal_mass::ThermalMass;
