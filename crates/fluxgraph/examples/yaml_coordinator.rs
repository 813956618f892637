//! Coordinator walkthrough driven by a YAML configuration.
//!
//! Demonstrates the full provider protocol against an in-process
//! coordinator: load a YAML graph, register a provider that owns the
//! heater, submit signal updates (each completing a rendezvous of one),
//! and receive fanned-out commands.
//!
//! Run with:
//!   cargo run --example yaml_coordinator

use fluxgraph::prelude::*;

const CONFIG: &str = "
models:
  - id: chamber
    type: thermal_mass
    params:
      thermal_mass: 200.0
      heat_transfer_coeff: 4.0
      initial_temp: 25.0
      temp_signal: chamber/temperature
      power_signal: chamber/power
      ambient_signal: chamber/ambient

edges:
  - source: ctl/power
    target: chamber/power
    transform:
      type: rate_limiter
      params:
        max_rate_per_sec: 500.0

rules:
  - id: overheat
    condition: chamber/temperature > 80
    actions:
      - device: heater
        function: shutdown
        args:
          reason: overheat
";

fn main() {
    let coordinator = Coordinator::new(0.1);
    coordinator
        .load_config(CONFIG, ConfigFormat::Yaml, "example-v1")
        .expect("config loads");

    let session_id = coordinator
        .register_provider("heater_provider", vec!["heater".to_string()])
        .expect("provider registers");
    println!("registered session: {session_id}");

    // Drive hard enough to trip the overheat rule.
    let mut shutdown_seen = false;
    for _ in 0..400 {
        let outcome = coordinator
            .update_signals(
                &session_id,
                &[
                    SignalUpdate::new("ctl/power", 1500.0, ""),
                    SignalUpdate::new("chamber/ambient", 20.0, ""),
                ],
            )
            .expect("update succeeds");

        if !outcome.commands.is_empty() && !shutdown_seen {
            shutdown_seen = true;
            println!(
                "first shutdown command at t = {:.1}s ({} command(s))",
                outcome.sim_time,
                outcome.commands.len()
            );
        }
    }

    let readings = coordinator
        .read_signals(&["chamber/temperature".to_string()])
        .expect("read succeeds");
    let reading = &readings[0];
    println!(
        "final: {} = {:.2} {} (physics_driven={})",
        reading.path, reading.value, reading.unit, reading.physics_driven
    );

    coordinator.unregister_provider(&session_id).expect("unregister");
}
