//! The [`Model`] sum type over the closed set of model kinds.

use fluxgraph_core::{SignalId, SignalStore, StoreError};

use crate::ThermalMass;

/// A signal owned (written) by a model, with its declared unit.
///
/// The coordinator uses these to build the physics-owned and
/// protected-write sets and to declare units before the first tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelOutput {
    /// The signal the model writes each tick.
    pub signal: SignalId,
    /// The unit every write will carry.
    pub unit: &'static str,
}

/// A physics integrator, one variant per known kind.
///
/// # Contract
///
/// `tick()` must be side-effect-free outside the store and the model's
/// own state: identical sequences of store states produce identical
/// outputs across instances.
#[derive(Clone, Debug)]
pub enum Model {
    /// Lumped thermal mass with convective loss to ambient.
    ThermalMass(ThermalMass),
}

impl Model {
    /// Advance the model by `dt` seconds against the store.
    pub fn tick(&mut self, dt: f64, store: &mut SignalStore) -> Result<(), StoreError> {
        match self {
            Self::ThermalMass(m) => m.tick(dt, store),
        }
    }

    /// Restore initial conditions.
    pub fn reset(&mut self) {
        match self {
            Self::ThermalMass(m) => m.reset(),
        }
    }

    /// Largest `dt` for which the model's explicit integrator is stable.
    pub fn stability_limit(&self) -> f64 {
        match self {
            Self::ThermalMass(m) => m.stability_limit(),
        }
    }

    /// Human-readable summary used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::ThermalMass(m) => m.describe(),
        }
    }

    /// Signals this model writes, with their units.
    pub fn outputs(&self) -> Vec<ModelOutput> {
        match self {
            Self::ThermalMass(m) => m.outputs(),
        }
    }
}
