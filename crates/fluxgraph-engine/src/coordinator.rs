//! The tick coordinator: provider sessions, rendezvous, and fan-out.
//!
//! The coordinator runs the engine at a fixed `dt`, advancing exactly
//! one tick per *generation* once every registered provider has
//! submitted updates for that generation. The last provider to arrive
//! (the rendezvous completer) executes the tick while holding the state
//! mutex; earlier arrivers block on a condition variable, bounded by a
//! 2-second wait, until the generation advances.
//!
//! # Concurrency model
//!
//! N provider threads call in concurrently; everything inside is
//! strictly serial. All state lives behind one mutex and there is
//! exactly one condition variable, signalled on tick completion and on
//! unregister. The only suspension point is the early-arriver wait in
//! [`Coordinator::update_signals`].

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use fluxgraph_core::{
    Command, FunctionNamespace, SignalNamespace, SignalStore, StoreError,
};
use fluxgraph_graph::{compile, CompileError};
use fluxgraph_loaders::{json, yaml, LoadError};
use fluxgraph_model::ModelOutput;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::engine::{Engine, EngineError};
use crate::session::{generate_session_id, ProviderSession};

/// Bound on the early-arriver rendezvous wait.
const RENDEZVOUS_WAIT: Duration = Duration::from_secs(2);

/// Default stale-session eviction timeout.
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Service name answered by [`Coordinator::check`].
const SERVICE_NAME: &str = "fluxgraph";

// ── Request/response types ──────────────────────────────────────

/// Configuration document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

/// One signal write submitted by a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalUpdate {
    /// Signal path.
    pub path: String,
    /// New value.
    pub value: f64,
    /// Unit; empty means dimensionless.
    pub unit: String,
}

impl SignalUpdate {
    /// Convenience constructor.
    pub fn new(path: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Result of a [`Coordinator::load_config`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    /// False when a matching config hash made the call a no-op.
    pub config_changed: bool,
}

/// Result of a [`Coordinator::update_signals`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// Whether a tick completed during this call (or while waiting).
    pub tick_occurred: bool,
    /// Simulation time of the completed tick, or the current time on a
    /// rendezvous wait timeout.
    pub sim_time: f64,
    /// Commands addressed to devices owned by the calling session.
    pub commands: Vec<Command>,
}

/// One signal returned by [`Coordinator::read_signals`].
#[derive(Clone, Debug, PartialEq)]
pub struct SignalReading {
    /// Signal path as requested.
    pub path: String,
    /// Current value.
    pub value: f64,
    /// Current unit.
    pub unit: String,
    /// Whether a physics model owns this signal.
    pub physics_driven: bool,
}

/// Health probe answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    /// The named service is this coordinator.
    Serving,
    /// The named service is not this coordinator.
    ServiceUnknown,
}

// ── CoordinatorError ────────────────────────────────────────────

/// Errors from coordinator operations.
///
/// Compiler, loader, store, and engine errors bubble up unchanged
/// inside their wrapper variants.
#[derive(Debug)]
pub enum CoordinatorError {
    /// No configuration is loaded.
    NotLoaded,
    /// A request argument is structurally invalid.
    InvalidArgument {
        /// What was wrong.
        reason: String,
    },
    /// The session ID does not name a live session.
    UnknownSession {
        /// The rejected session ID.
        session_id: String,
    },
    /// A submitted signal path is not part of the loaded graph.
    UnknownSignal {
        /// The rejected path.
        path: String,
    },
    /// A provider with this ID is already registered.
    AlreadyExists {
        /// The conflicting provider ID.
        provider_id: String,
    },
    /// A requested device is already owned by another session.
    OwnershipConflict {
        /// The contested device ID.
        device_id: String,
    },
    /// The signal is written by the graph and protected from providers.
    PermissionDenied {
        /// The protected path.
        path: String,
    },
    /// The configuration document failed to parse.
    Parse(LoadError),
    /// The parsed configuration failed to compile.
    Compile(CompileError),
    /// The engine rejected the tick.
    Engine(EngineError),
    /// A store write failed.
    Store(StoreError),
}

impl std::fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "config not loaded - call load_config first"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::UnknownSession { session_id } => {
                write!(f, "unknown session '{session_id}' - call register_provider first")
            }
            Self::UnknownSignal { path } => write!(f, "unknown signal: {path}"),
            Self::AlreadyExists { provider_id } => {
                write!(f, "provider_id already registered: {provider_id}")
            }
            Self::OwnershipConflict { device_id } => {
                write!(f, "device_id already owned by another provider: {device_id}")
            }
            Self::PermissionDenied { path } => {
                write!(f, "write denied for protected signal: {path}")
            }
            Self::Parse(e) => write!(f, "{e}"),
            Self::Compile(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Compile(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for CoordinatorError {
    fn from(e: LoadError) -> Self {
        Self::Parse(e)
    }
}

impl From<CompileError> for CoordinatorError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<EngineError> for CoordinatorError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<StoreError> for CoordinatorError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ── Coordinator state ───────────────────────────────────────────

/// Snapshot of the most recently completed tick.
#[derive(Debug, Default)]
struct CompletedTick {
    generation: u64,
    sim_time: f64,
    commands: Vec<Command>,
}

/// Everything behind the coordinator mutex.
#[derive(Debug, Default)]
struct State {
    engine: Engine,
    store: SignalStore,
    signal_ns: SignalNamespace,
    func_ns: FunctionNamespace,
    loaded: bool,
    config_hash: String,
    sim_time: f64,
    tick_generation: u64,
    completed: CompletedTick,
    sessions: IndexMap<String, ProviderSession>,
    protected_write_signals: IndexSet<fluxgraph_core::SignalId>,
    physics_owned_signals: IndexSet<fluxgraph_core::SignalId>,
}

impl State {
    /// Remove sessions (other than `active_session_id`) whose last
    /// activity is older than `timeout`.
    fn evict_stale_sessions(&mut self, active_session_id: &str, now: Instant, timeout: Duration) {
        self.sessions.retain(|session_id, session| {
            if session_id == active_session_id {
                return true;
            }
            let age = now.saturating_duration_since(session.last_update);
            if age > timeout {
                warn!(
                    provider_id = %session.provider_id,
                    session_id = %session_id,
                    age_ms = age.as_millis() as u64,
                    "evicting stale provider session"
                );
                false
            } else {
                true
            }
        });
    }

    /// Build a tick response for one session from the completed-tick
    /// snapshot, filtering commands to the session's owned devices.
    fn tick_outcome_for_session(&self, session_id: &str) -> TickOutcome {
        let commands = match self.sessions.get(session_id) {
            Some(session) if !session.device_ids.is_empty() => self
                .completed
                .commands
                .iter()
                .filter(|cmd| session.owns_device(self.func_ns.lookup_device(cmd.device)))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        TickOutcome {
            tick_occurred: true,
            sim_time: self.completed.sim_time,
            commands,
        }
    }
}

// ── Coordinator ─────────────────────────────────────────────────

/// Serializes provider access to one engine and store and advances the
/// simulation by rendezvous.
///
/// All methods take `&self`; the coordinator is `Send + Sync` and is
/// shared across provider threads (typically in an `Arc`).
#[derive(Debug)]
pub struct Coordinator {
    dt: f64,
    session_timeout: Duration,
    state: Mutex<State>,
    tick_cv: Condvar,
}

impl Coordinator {
    /// Create a coordinator that ticks with the given time step.
    ///
    /// `dt` is static for the coordinator's lifetime and is passed to
    /// the compiler as `expected_dt` for stability validation.
    pub fn new(dt: f64) -> Self {
        info!(dt_sec = dt, "coordinator initialized");
        Self {
            dt,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            state: Mutex::new(State::default()),
            tick_cv: Condvar::new(),
        }
    }

    /// Override the stale-session eviction timeout (default 5 s).
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// The fixed simulation time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        // A poisoned mutex only means another provider thread panicked;
        // the state itself is still consistent between operations.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load (or reload) a configuration document.
    ///
    /// A non-empty `config_hash` matching the currently loaded hash makes
    /// the call a no-op. Parse failures leave the previous configuration
    /// intact; once clearing has begun, a compile failure leaves the
    /// coordinator unloaded and every subsequent call fails with
    /// [`CoordinatorError::NotLoaded`] until the next successful load.
    pub fn load_config(
        &self,
        content: &str,
        format: ConfigFormat,
        config_hash: &str,
    ) -> Result<LoadOutcome, CoordinatorError> {
        let mut guard = self.lock_state();

        if !config_hash.is_empty() && config_hash == guard.config_hash {
            debug!("load_config: no-op (hash matched)");
            return Ok(LoadOutcome {
                config_changed: false,
            });
        }

        // Parse before touching any state: a parse failure must leave
        // the previous configuration fully intact.
        let spec = match format {
            ConfigFormat::Yaml => yaml::load_str(content)?,
            ConfigFormat::Json => json::load_str(content)?,
        };

        // Clearing begins here. From this point a failure leaves the
        // coordinator unloaded.
        let state = &mut *guard;
        state.loaded = false;
        state.config_hash.clear();
        state.signal_ns.clear();
        state.func_ns.clear();

        let program = compile(
            &spec,
            &mut state.signal_ns,
            &mut state.func_ns,
            Some(self.dt),
        )?;

        // Write authority: every edge target is a derived output and
        // protected from external writes; model outputs are additionally
        // physics-owned.
        let mut protected = IndexSet::new();
        let mut model_outputs: Vec<ModelOutput> = Vec::new();
        for edge in &program.edges {
            protected.insert(edge.target);
        }
        for model in &program.models {
            model_outputs.extend(model.outputs());
        }
        for output in &model_outputs {
            protected.insert(output.signal);
        }

        state.engine.load(program);

        // Fresh store so declared units never carry across reloads.
        state.store = SignalStore::new();
        state.physics_owned_signals = model_outputs.iter().map(|o| o.signal).collect();
        for output in &model_outputs {
            state.store.mark_physics_driven(output.signal, true);
            state.store.declare_unit(output.signal, output.unit);
        }
        state.protected_write_signals = protected;

        state.sim_time = 0.0;
        state.tick_generation = 0;
        state.completed = CompletedTick::default();
        state.sessions.clear();
        state.config_hash = config_hash.to_string();
        state.loaded = true;

        info!(
            models = spec.models.len(),
            edges = spec.edges.len(),
            rules = spec.rules.len(),
            dt_sec = self.dt,
            "configuration loaded"
        );

        Ok(LoadOutcome {
            config_changed: true,
        })
    }

    /// Register a provider and its owned devices.
    ///
    /// Returns the new session ID. Fails if the provider ID is empty or
    /// already registered, or if any requested device is owned by a
    /// live session.
    pub fn register_provider(
        &self,
        provider_id: &str,
        device_ids: Vec<String>,
    ) -> Result<String, CoordinatorError> {
        let mut guard = self.lock_state();

        if !guard.loaded {
            return Err(CoordinatorError::NotLoaded);
        }
        if provider_id.is_empty() {
            return Err(CoordinatorError::InvalidArgument {
                reason: "provider_id must be non-empty".to_string(),
            });
        }

        guard.evict_stale_sessions("", Instant::now(), self.session_timeout);

        for session in guard.sessions.values() {
            if session.provider_id == provider_id {
                return Err(CoordinatorError::AlreadyExists {
                    provider_id: provider_id.to_string(),
                });
            }
            for device_id in &device_ids {
                if session.owns_device(device_id) {
                    return Err(CoordinatorError::OwnershipConflict {
                        device_id: device_id.clone(),
                    });
                }
            }
        }

        let session_id = generate_session_id(provider_id);
        guard.sessions.insert(
            session_id.clone(),
            ProviderSession::new(provider_id, device_ids),
        );

        info!(
            provider_id = %provider_id,
            session_id = %session_id,
            "provider registered"
        );
        Ok(session_id)
    }

    /// Remove a session and wake any rendezvous waiters.
    ///
    /// Waiters only test for generation advance, so unregistering the
    /// last missing provider does not itself complete a tick; remaining
    /// providers ride out the bounded wait and resubmit.
    pub fn unregister_provider(&self, session_id: &str) -> Result<(), CoordinatorError> {
        let mut guard = self.lock_state();

        if session_id.is_empty() {
            return Err(CoordinatorError::InvalidArgument {
                reason: "session_id must be non-empty".to_string(),
            });
        }

        let Some(session) = guard.sessions.shift_remove(session_id) else {
            return Err(CoordinatorError::UnknownSession {
                session_id: session_id.to_string(),
            });
        };

        info!(
            provider_id = %session.provider_id,
            session_id = %session_id,
            "provider unregistered"
        );

        drop(guard);
        self.tick_cv.notify_all();
        Ok(())
    }

    /// Submit this generation's inputs and rendezvous on the tick.
    ///
    /// The whole batch is validated (resolution, write protection,
    /// declared units) before the first write, so a failing call leaves
    /// the store unmutated.
    ///
    /// If this call makes every live session current for the present
    /// generation, it is the rendezvous completer: it runs the tick,
    /// advances the generation, drains commands into the completed-tick
    /// snapshot, and wakes all waiters. Otherwise it waits, bounded by
    /// 2 seconds, for the generation to advance; a wait timeout is not
    /// an error and answers `tick_occurred = false`.
    pub fn update_signals(
        &self,
        session_id: &str,
        updates: &[SignalUpdate],
    ) -> Result<TickOutcome, CoordinatorError> {
        let mut guard = self.lock_state();

        if !guard.loaded {
            return Err(CoordinatorError::NotLoaded);
        }

        let now = Instant::now();
        let Some(session) = guard.sessions.get_mut(session_id) else {
            return Err(CoordinatorError::UnknownSession {
                session_id: session_id.to_string(),
            });
        };
        session.last_update = now;
        let provider_id = session.provider_id.clone();

        guard.evict_stale_sessions(session_id, now, self.session_timeout);

        let generation = guard.tick_generation;

        // Validate the whole batch before writing anything.
        let mut resolved = Vec::with_capacity(updates.len());
        for update in updates {
            let id = guard.signal_ns.resolve(&update.path);
            if !id.is_valid() {
                return Err(CoordinatorError::UnknownSignal {
                    path: update.path.clone(),
                });
            }
            if guard.protected_write_signals.contains(&id) {
                return Err(CoordinatorError::PermissionDenied {
                    path: update.path.clone(),
                });
            }
            guard.store.validate_unit(id, &update.unit)?;
            resolved.push(id);
        }
        for (update, &id) in updates.iter().zip(&resolved) {
            guard.store.write(id, update.value, &update.unit)?;
        }

        // Mark this provider current for the present generation.
        if let Some(session) = guard.sessions.get_mut(session_id) {
            session.last_tick_generation = Some(generation);
        }

        let all_ready = !guard.sessions.is_empty()
            && guard
                .sessions
                .values()
                .all(|s| s.last_tick_generation.is_some_and(|g| g >= generation));

        if all_ready {
            // Rendezvous completer: the sole thread to advance this tick.
            {
                let state = &mut *guard;
                state.engine.tick(self.dt, &mut state.store)?;
            }
            guard.sim_time += self.dt;
            guard.tick_generation += 1;

            // Drain exactly once per completed tick.
            let commands = guard.engine.drain_commands();
            guard.completed = CompletedTick {
                generation: guard.tick_generation,
                sim_time: guard.sim_time,
                commands,
            };

            debug!(
                generation = guard.tick_generation,
                sim_time_sec = guard.sim_time,
                commands = guard.completed.commands.len(),
                "tick completed"
            );

            let outcome = guard.tick_outcome_for_session(session_id);
            drop(guard);
            self.tick_cv.notify_all();
            Ok(outcome)
        } else {
            // Early arriver: wait for the completer, bounded.
            let (guard, wait_result) = self
                .tick_cv
                .wait_timeout_while(guard, RENDEZVOUS_WAIT, |state| {
                    state.tick_generation <= generation
                })
                .unwrap_or_else(|e| e.into_inner());

            if guard.tick_generation > generation {
                Ok(guard.tick_outcome_for_session(session_id))
            } else {
                debug_assert!(wait_result.timed_out());
                warn!(
                    provider_id = %provider_id,
                    generation = generation,
                    "timed out waiting for tick"
                );
                Ok(TickOutcome {
                    tick_occurred: false,
                    sim_time: guard.sim_time,
                    commands: Vec::new(),
                })
            }
        }
    }

    /// Read current values for the given paths.
    ///
    /// Unknown paths are silently skipped.
    pub fn read_signals(&self, paths: &[String]) -> Result<Vec<SignalReading>, CoordinatorError> {
        let guard = self.lock_state();

        if !guard.loaded {
            return Err(CoordinatorError::NotLoaded);
        }

        let mut readings = Vec::with_capacity(paths.len());
        for path in paths {
            let id = guard.signal_ns.resolve(path);
            if !id.is_valid() {
                continue;
            }
            let signal = guard.store.read(id);
            readings.push(SignalReading {
                path: path.clone(),
                value: signal.value,
                unit: signal.unit,
                physics_driven: guard.store.is_physics_driven(id),
            });
        }
        Ok(readings)
    }

    /// Reset the simulation to time zero.
    ///
    /// Models, transforms, and the store reset; physics-driven flags are
    /// re-established; every session must resubmit generation 0 before
    /// the next tick. Sessions themselves survive.
    pub fn reset(&self) -> Result<(), CoordinatorError> {
        let mut guard = self.lock_state();

        if !guard.loaded {
            return Err(CoordinatorError::NotLoaded);
        }

        guard.engine.reset();
        guard.store.clear();
        let physics: Vec<_> = guard.physics_owned_signals.iter().copied().collect();
        for id in physics {
            guard.store.mark_physics_driven(id, true);
        }
        guard.sim_time = 0.0;
        guard.tick_generation = 0;
        guard.completed = CompletedTick::default();
        for session in guard.sessions.values_mut() {
            session.last_tick_generation = None;
        }

        info!("reset complete");
        Ok(())
    }

    /// Health probe: serving iff `service` is empty or this service's name.
    pub fn check(&self, service: &str) -> HealthStatus {
        if service.is_empty() || service == SERVICE_NAME {
            HealthStatus::Serving
        } else {
            HealthStatus::ServiceUnknown
        }
    }

    /// Whether a configuration is loaded.
    pub fn is_loaded(&self) -> bool {
        self.lock_state().loaded
    }

    /// Current simulation time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.lock_state().sim_time
    }

    /// Current tick generation.
    pub fn tick_generation(&self) -> u64 {
        self.lock_state().tick_generation
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.lock_state().sessions.len()
    }
}
