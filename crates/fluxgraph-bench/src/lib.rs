//! Benchmark profiles for the FluxGraph simulation engine.
//!
//! Provides pre-built [`GraphSpec`] profiles shared by the Criterion
//! benches:
//!
//! - [`reference_spec`]: one thermal model feeding a transform chain,
//!   the shape of a typical hardware-in-the-loop graph.
//! - [`wide_spec`]: `n` independent transform edges, for measuring
//!   per-edge tick cost.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fluxgraph_graph::{EdgeSpec, GraphSpec, ModelSpec, RuleSpec, TransformSpec};

/// One thermal model with a lag/noise/average sensor chain and a rule.
pub fn reference_spec() -> GraphSpec {
    GraphSpec {
        models: vec![ModelSpec::new("chamber", "thermal_mass")
            .with_param("thermal_mass", 1000.0)
            .with_param("heat_transfer_coeff", 10.0)
            .with_param("initial_temp", 25.0)
            .with_param("temp_signal", "chamber/temperature")
            .with_param("power_signal", "chamber/power")
            .with_param("ambient_signal", "chamber/ambient")],
        edges: vec![
            EdgeSpec::new(
                "ctl/power",
                "chamber/power",
                TransformSpec::new("first_order_lag").with_param("tau_s", 0.5),
            ),
            EdgeSpec::new(
                "chamber/temperature",
                "sensor/temperature",
                TransformSpec::new("noise")
                    .with_param("amplitude", 0.1)
                    .with_param("seed", 42i64),
            ),
            EdgeSpec::new(
                "sensor/temperature",
                "sensor/temperature_avg",
                TransformSpec::new("moving_average").with_param("window_size", 8i64),
            ),
        ],
        rules: vec![RuleSpec::new("overheat", "chamber/temperature > 100")],
    }
}

/// `n` independent linear edges `in/{i} -> out/{i}`.
pub fn wide_spec(n: usize) -> GraphSpec {
    GraphSpec {
        edges: (0..n)
            .map(|i| {
                EdgeSpec::new(
                    format!("in/{i}"),
                    format!("out/{i}"),
                    TransformSpec::new("linear")
                        .with_param("scale", 1.0)
                        .with_param("offset", 0.0),
                )
            })
            .collect(),
        ..Default::default()
    }
}
