//! Lumped thermal mass: `dT/dt = (P_in − h·(T − T_amb)) / C`.
//!
//! Forward Euler integration. For the linear cooling term the explicit
//! scheme is stable for `dt < 2·C/h`, which is what
//! [`ThermalMass::stability_limit`] reports.

use fluxgraph_core::{SignalId, SignalNamespace, SignalStore, StoreError};

use crate::model::ModelOutput;

/// Unit carried by every temperature write.
const TEMP_UNIT: &str = "degC";

/// A lumped-capacitance thermal node with convective loss to ambient.
///
/// Reads net input power and ambient temperature from the store each
/// tick, integrates the temperature, writes it back with unit `"degC"`,
/// and marks the temperature signal physics-driven.
#[derive(Clone, Debug)]
pub struct ThermalMass {
    id: String,
    temp_signal: SignalId,
    power_signal: SignalId,
    ambient_signal: SignalId,
    thermal_mass: f64,
    heat_transfer_coeff: f64,
    temperature: f64,
    initial_temp: f64,
}

impl ThermalMass {
    /// Construct a thermal mass, interning its signal paths.
    ///
    /// `thermal_mass` is the heat capacity C in J/K, `heat_transfer_coeff`
    /// the convective coefficient h in W/K.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        thermal_mass: f64,
        heat_transfer_coeff: f64,
        initial_temp: f64,
        temp_signal_path: &str,
        power_signal_path: &str,
        ambient_signal_path: &str,
        ns: &mut SignalNamespace,
    ) -> Self {
        Self {
            id: id.into(),
            temp_signal: ns.intern(temp_signal_path),
            power_signal: ns.intern(power_signal_path),
            ambient_signal: ns.intern(ambient_signal_path),
            thermal_mass,
            heat_transfer_coeff,
            temperature: initial_temp,
            initial_temp,
        }
    }

    /// Advance one forward-Euler step.
    pub fn tick(&mut self, dt: f64, store: &mut SignalStore) -> Result<(), StoreError> {
        let net_power = store.read_value(self.power_signal);
        let ambient = store.read_value(self.ambient_signal);

        let heat_loss = self.heat_transfer_coeff * (self.temperature - ambient);
        let d_temp = (net_power - heat_loss) / self.thermal_mass * dt;
        self.temperature += d_temp;

        store.write(self.temp_signal, self.temperature, TEMP_UNIT)?;
        store.mark_physics_driven(self.temp_signal, true);
        Ok(())
    }

    /// Restore the initial temperature.
    pub fn reset(&mut self) {
        self.temperature = self.initial_temp;
    }

    /// Forward-Euler stability bound for the cooling term: `2·C/h`.
    ///
    /// With `h <= 0` there is no cooling term and the scheme is
    /// unconditionally stable.
    pub fn stability_limit(&self) -> f64 {
        if self.heat_transfer_coeff <= 0.0 {
            return f64::INFINITY;
        }
        2.0 * self.thermal_mass / self.heat_transfer_coeff
    }

    /// Summary used in stability error messages.
    pub fn describe(&self) -> String {
        format!(
            "ThermalMass(id={}, C={} J/K, h={} W/K, T0={} degC)",
            self.id, self.thermal_mass, self.heat_transfer_coeff, self.initial_temp
        )
    }

    /// The temperature signal, with its unit.
    pub fn outputs(&self) -> Vec<ModelOutput> {
        vec![ModelOutput {
            signal: self.temp_signal,
            unit: TEMP_UNIT,
        }]
    }

    /// Current integrated temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}
