//! The tick execution engine.
//!
//! [`Engine`] owns a loaded [`CompiledProgram`] and a FIFO command queue.
//! Each [`tick()`](Engine::tick) runs five stages in a fixed order:
//!
//! 1. **Input boundary freeze** — a no-op by contract; external writers
//!    must have completed before `tick()` is called.
//! 2. **Models** — physics models advance, in spec order.
//! 3. **Edges** — transforms apply in the compiler-fixed order (delay
//!    edges first, then the topologically sorted remainder), each
//!    reading the live source value and propagating its unit.
//! 4. **Commit** — reserved for validation/dirty-flag work; currently
//!    a no-op.
//! 5. **Rules** — conditions evaluate in spec order; truth queues one
//!    command per action.

use std::error::Error;
use std::fmt;

use fluxgraph_core::{Command, SignalStore, StoreError};
use fluxgraph_graph::{CompiledEdge, CompiledProgram, CompiledRule};
use fluxgraph_model::Model;

// ── EngineError ─────────────────────────────────────────────────

/// Errors from [`Engine::tick()`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// No program has been loaded.
    NotLoaded,
    /// The requested time step is zero or negative.
    InvalidDt {
        /// The rejected time step.
        dt: f64,
    },
    /// The requested time step exceeds a model's stability limit.
    ///
    /// Checked before any stage runs, so a failing tick leaves the
    /// store and all model state untouched.
    StabilityViolation {
        /// The model's `describe()` output.
        model: String,
        /// The model's stability limit in seconds.
        limit: f64,
        /// The requested time step in seconds.
        dt: f64,
    },
    /// A store write failed (unit contract violation).
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no program loaded"),
            Self::InvalidDt { dt } => write!(f, "dt must be positive, got {dt}"),
            Self::StabilityViolation { model, limit, dt } => write!(
                f,
                "stability violation at tick: {model} requires dt < {limit}s, but dt = {dt}s"
            ),
            Self::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ── Engine ──────────────────────────────────────────────────────

/// Executes one compiled program, one tick at a time.
///
/// Strictly serial: the engine never blocks and holds no locks. The
/// coordinator serializes access from provider threads.
#[derive(Debug, Default)]
pub struct Engine {
    loaded: bool,
    edges: Vec<CompiledEdge>,
    models: Vec<Model>,
    rules: Vec<CompiledRule>,
    command_queue: Vec<Command>,
}

impl Engine {
    /// Create an engine with no program loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a compiled program, discarding any previous one.
    ///
    /// Pending commands from the previous program are dropped.
    pub fn load(&mut self, program: CompiledProgram) {
        self.edges = program.edges;
        self.models = program.models;
        self.rules = program.rules;
        self.command_queue.clear();
        self.loaded = true;
    }

    /// Whether a program is loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Execute one simulation tick.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::NotLoaded`] before a program is loaded,
    /// [`EngineError::InvalidDt`] for `dt <= 0`, and
    /// [`EngineError::StabilityViolation`] when `dt` exceeds any model's
    /// stability limit — all checked before any state changes.
    pub fn tick(&mut self, dt: f64, store: &mut SignalStore) -> Result<(), EngineError> {
        if !self.loaded {
            return Err(EngineError::NotLoaded);
        }
        if dt <= 0.0 {
            return Err(EngineError::InvalidDt { dt });
        }

        // Runtime stability guard; compile-time validation may have been
        // skipped (no expected_dt) or the caller may use a different dt.
        for model in &self.models {
            let limit = model.stability_limit();
            if dt > limit {
                return Err(EngineError::StabilityViolation {
                    model: model.describe(),
                    limit,
                    dt,
                });
            }
        }

        // Stage 1: input boundary freeze — no-op by contract.

        // Stage 2: models, in spec order.
        for model in &mut self.models {
            model.tick(dt, store)?;
        }

        // Stage 3: edges, in compiled order. Delay edges ran first, so
        // delayed outputs are observable to the sorted remainder; within
        // the remainder topological order makes live reads well-defined.
        for edge in &mut self.edges {
            let source = store.read(edge.source);
            let output = edge.transform.apply(source.value, dt);
            store.write(edge.target, output, &source.unit)?;
        }

        // Stage 4: commit — reserved for validation and dirty flags.

        // Stage 5: rules, in spec order; actions queue in order.
        for rule in &self.rules {
            if rule.condition.eval(store) {
                for action in &rule.actions {
                    self.command_queue.push(Command {
                        device: action.device,
                        function: action.function,
                        args: action.args.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Take all queued commands, leaving the queue empty.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.command_queue)
    }

    /// Reset every model and transform and clear the command queue.
    pub fn reset(&mut self) {
        for model in &mut self.models {
            model.reset();
        }
        for edge in &mut self.edges {
            edge.transform.reset();
        }
        self.command_queue.clear();
    }
}
