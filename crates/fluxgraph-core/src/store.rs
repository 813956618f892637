//! The signal store: current value and unit metadata per signal.
//!
//! The store is single-writer by design — the coordinator's mutex
//! serializes all access, so there is no internal synchronization.
//!
//! # Unit contract
//!
//! A signal's declared unit is established by the first write carrying a
//! non-`"dimensionless"` unit, or explicitly via [`SignalStore::declare_unit`].
//! Once declared, every subsequent write must carry the same unit or fail
//! with [`StoreError::UnitMismatch`]. [`SignalStore::clear`] drops values
//! and physics flags but **keeps declared units** — the unit contract is
//! part of the graph structure, not the simulation state.

use indexmap::{IndexMap, IndexSet};

use crate::error::StoreError;
use crate::id::SignalId;

/// Unit string used when no unit was supplied.
pub const DIMENSIONLESS: &str = "dimensionless";

/// A named scalar: current value plus unit metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    /// Current value.
    pub value: f64,
    /// Unit label, `"dimensionless"` when unspecified.
    pub unit: String,
}

impl Signal {
    /// Construct a signal with an explicit unit.
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self {
            value: 0.0,
            unit: DIMENSIONLESS.to_string(),
        }
    }
}

/// Central storage for all signal values and metadata.
#[derive(Clone, Debug, Default)]
pub struct SignalStore {
    signals: IndexMap<SignalId, Signal>,
    physics_driven: IndexSet<SignalId>,
    declared_units: IndexMap<SignalId, String>,
}

impl SignalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value with unit metadata.
    ///
    /// Writes to [`SignalId::INVALID`] are silently ignored. An empty unit
    /// normalizes to `"dimensionless"`. The first non-dimensionless write
    /// declares the signal's unit; later writes must match it.
    pub fn write(&mut self, id: SignalId, value: f64, unit: &str) -> Result<(), StoreError> {
        if !id.is_valid() {
            return Ok(());
        }

        let normalized = if unit.is_empty() { DIMENSIONLESS } else { unit };

        // First non-dimensionless write declares the expected unit. A signal
        // still in its unwritten/default state must not freeze its contract
        // to "dimensionless".
        if !self.declared_units.contains_key(&id) && normalized != DIMENSIONLESS {
            self.declared_units.insert(id, normalized.to_string());
        }

        if let Some(expected) = self.declared_units.get(&id) {
            if expected != normalized {
                return Err(StoreError::UnitMismatch {
                    signal: id,
                    expected: expected.clone(),
                    got: normalized.to_string(),
                });
            }
        }

        self.signals.insert(id, Signal::new(value, normalized));
        Ok(())
    }

    /// Read a signal, defaulting to `(0.0, "dimensionless")` for unknown
    /// or invalid ids.
    pub fn read(&self, id: SignalId) -> Signal {
        if !id.is_valid() {
            return Signal::default();
        }
        self.signals.get(&id).cloned().unwrap_or_default()
    }

    /// Read only the value.
    pub fn read_value(&self, id: SignalId) -> f64 {
        self.signals.get(&id).map_or(0.0, |s| s.value)
    }

    /// Whether a signal is driven by a physics model.
    pub fn is_physics_driven(&self, id: SignalId) -> bool {
        self.physics_driven.contains(&id)
    }

    /// Set or clear the physics-driven flag for a signal.
    pub fn mark_physics_driven(&mut self, id: SignalId, driven: bool) {
        if driven {
            self.physics_driven.insert(id);
        } else {
            self.physics_driven.swap_remove(&id);
        }
    }

    /// Explicitly declare the expected unit for a signal.
    ///
    /// Used by the coordinator for physics-owned signals so the unit
    /// contract is in force before the first model write.
    pub fn declare_unit(&mut self, id: SignalId, unit: impl Into<String>) {
        self.declared_units.insert(id, unit.into());
    }

    /// Check a unit against the declared unit without writing.
    pub fn validate_unit(&self, id: SignalId, unit: &str) -> Result<(), StoreError> {
        let normalized = if unit.is_empty() { DIMENSIONLESS } else { unit };
        if let Some(expected) = self.declared_units.get(&id) {
            if expected != normalized {
                return Err(StoreError::UnitMismatch {
                    signal: id,
                    expected: expected.clone(),
                    got: normalized.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of signals currently stored.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether the store holds no signals.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Drop all values and physics-driven flags.
    ///
    /// Declared units survive: they are part of the graph structure.
    pub fn clear(&mut self) {
        self.signals.clear();
        self.physics_driven.clear();
    }
}
