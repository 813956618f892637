//! FluxGraph quickstart — a complete, minimal simulation from scratch.
//!
//! Demonstrates:
//!   1. Declaring a graph spec in code (model + transform edges + rule)
//!   2. Compiling it against fresh namespaces
//!   3. Ticking the engine and reading signals
//!   4. Draining emitted commands and resetting
//!
//! Run with:
//!   cargo run --example quickstart

use fluxgraph::prelude::*;

const DT: f64 = 0.1;

fn main() {
    // ─── Declare the graph ──────────────────────────────────────
    //
    // A heated chamber: the controller's raw power command is lagged
    // (actuator dynamics), drives a thermal mass, and an overheat rule
    // shuts the heater down.
    let spec = GraphSpec {
        models: vec![ModelSpec::new("chamber", "thermal_mass")
            .with_param("thermal_mass", 500.0)
            .with_param("heat_transfer_coeff", 5.0)
            .with_param("initial_temp", 25.0)
            .with_param("temp_signal", "chamber/temperature")
            .with_param("power_signal", "chamber/power")
            .with_param("ambient_signal", "chamber/ambient")],
        edges: vec![EdgeSpec::new(
            "ctl/power",
            "chamber/power",
            TransformSpec::new("first_order_lag").with_param("tau_s", 0.5),
        )],
        rules: vec![RuleSpec::new("overheat", "chamber/temperature > 60")
            .with_action(ActionSpec::new("heater", "shutdown"))],
    };

    // ─── Compile ────────────────────────────────────────────────
    let mut signal_ns = SignalNamespace::new();
    let mut func_ns = FunctionNamespace::new();
    let program =
        compile(&spec, &mut signal_ns, &mut func_ns, Some(DT)).expect("graph compiles");

    let mut engine = Engine::new();
    engine.load(program);

    // ─── Run ────────────────────────────────────────────────────
    let mut store = SignalStore::new();
    let power = signal_ns.resolve("ctl/power");
    let ambient = signal_ns.resolve("chamber/ambient");
    let temperature = signal_ns.resolve("chamber/temperature");

    store.write(power, 2000.0, "").expect("write power");
    store.write(ambient, 20.0, "").expect("write ambient");

    for tick in 1..=600u32 {
        engine.tick(DT, &mut store).expect("tick");

        if tick % 100 == 0 {
            let signal = store.read(temperature);
            println!(
                "t = {:5.1}s  T = {:6.2} {}",
                f64::from(tick) * DT,
                signal.value,
                signal.unit
            );
        }
    }

    // ─── Commands ───────────────────────────────────────────────
    let commands = engine.drain_commands();
    println!("rule emissions queued: {}", commands.len());
    if let Some(cmd) = commands.first() {
        println!(
            "first command: device={} function={}",
            func_ns.lookup_device(cmd.device),
            func_ns.lookup_function(cmd.function)
        );
    }

    // ─── Reset ──────────────────────────────────────────────────
    engine.reset();
    store.clear();
    println!("reset: store has {} signals", store.len());
}
