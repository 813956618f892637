//! FluxGraph: a deterministic dataflow simulation engine for
//! hardware-in-the-loop and physical-plant simulation.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all FluxGraph sub-crates. For most users, adding `fluxgraph` as
//! a single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fluxgraph::prelude::*;
//!
//! // Compile a one-edge graph: b = 2*a + 1.
//! let spec = GraphSpec {
//!     edges: vec![EdgeSpec::new(
//!         "a",
//!         "b",
//!         TransformSpec::new("linear")
//!             .with_param("scale", 2.0)
//!             .with_param("offset", 1.0),
//!     )],
//!     ..Default::default()
//! };
//!
//! let mut signal_ns = SignalNamespace::new();
//! let mut func_ns = FunctionNamespace::new();
//! let program = compile(&spec, &mut signal_ns, &mut func_ns, None).unwrap();
//!
//! let mut engine = Engine::new();
//! engine.load(program);
//!
//! let mut store = SignalStore::new();
//! store.write(signal_ns.resolve("a"), 3.0, "").unwrap();
//! engine.tick(0.1, &mut store).unwrap();
//! assert_eq!(store.read_value(signal_ns.resolve("b")), 7.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fluxgraph-core` | IDs, signals, store, namespaces, commands |
//! | [`transform`] | `fluxgraph-transform` | The stateful transform kinds |
//! | [`model`] | `fluxgraph-model` | Physics models |
//! | [`graph`] | `fluxgraph-graph` | Graph spec and compiler |
//! | [`loaders`] | `fluxgraph-loaders` | YAML/JSON configuration loaders |
//! | [`engine`] | `fluxgraph-engine` | Tick engine and provider coordinator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: IDs, signals, the store, namespaces, commands
/// (`fluxgraph-core`).
pub use fluxgraph_core as types;

/// Stateful scalar transforms (`fluxgraph-transform`).
pub use fluxgraph_transform as transform;

/// Physics models (`fluxgraph-model`).
pub use fluxgraph_model as model;

/// Graph specification and compiler (`fluxgraph-graph`).
pub use fluxgraph_graph as graph;

/// YAML/JSON configuration loaders (`fluxgraph-loaders`).
pub use fluxgraph_loaders as loaders;

/// Tick engine and provider rendezvous coordinator (`fluxgraph-engine`).
pub use fluxgraph_engine as engine;

/// Common imports for typical FluxGraph usage.
///
/// ```rust
/// use fluxgraph::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use fluxgraph_core::{
        Command, DeviceId, FunctionId, FunctionNamespace, Signal, SignalId, SignalNamespace,
        SignalStore, StoreError, Variant,
    };

    // Graph spec and compiler
    pub use fluxgraph_graph::{
        compile, ActionSpec, CompileError, CompiledProgram, EdgeSpec, GraphSpec, ModelSpec,
        RuleSpec, TransformSpec,
    };

    // Transforms and models
    pub use fluxgraph_model::{Model, ThermalMass};
    pub use fluxgraph_transform::Transform;

    // Loaders
    pub use fluxgraph_loaders::LoadError;

    // Engine and coordinator
    pub use fluxgraph_engine::{
        ConfigFormat, Coordinator, CoordinatorError, Engine, EngineError, HealthStatus,
        SignalReading, SignalUpdate, TickOutcome,
    };
}
