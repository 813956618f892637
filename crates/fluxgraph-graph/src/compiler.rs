//! The graph compiler: `GraphSpec` → [`CompiledProgram`].
//!
//! Compilation runs in seven phases: model instantiation, stability
//! validation, edge instantiation, writer-ownership checks, cycle
//! detection over the non-delay subgraph, deterministic edge ordering,
//! and rule compilation. Any failure aborts the whole compile — a
//! program is either fully valid or not produced.

use std::collections::{BTreeMap, BTreeSet};

use fluxgraph_core::{
    DeviceId, FunctionId, FunctionNamespace, SignalId, SignalNamespace, Variant,
};
use fluxgraph_model::{Model, ThermalMass};
use fluxgraph_transform::{
    Deadband, Delay, FirstOrderLag, Linear, MovingAverage, Noise, RateLimiter, Saturation,
    Transform,
};
use indexmap::IndexMap;

use crate::condition::{parse_condition, Condition};
use crate::error::CompileError;
use crate::params;
use crate::spec::{GraphSpec, ModelSpec, TransformSpec};

// ── Compiled types ──────────────────────────────────────────────

/// An edge with resolved signal IDs and an instantiated transform.
///
/// Edge evaluation reads the live store value of `source`; correctness
/// relies on the compiler's ordering (delay edges first, then the
/// topologically sorted remainder), not on cached snapshots.
#[derive(Clone, Debug)]
pub struct CompiledEdge {
    /// Resolved source signal.
    pub source: SignalId,
    /// Resolved target signal.
    pub target: SignalId,
    /// The transform applied along this edge.
    pub transform: Transform,
    /// Whether the transform kind is `delay` (excluded from cycle checks).
    pub is_delay: bool,
}

/// One action of a compiled rule.
#[derive(Clone, Debug)]
pub struct CompiledAction {
    /// Resolved target device.
    pub device: DeviceId,
    /// Resolved function.
    pub function: FunctionId,
    /// Arguments forwarded verbatim with the command.
    pub args: IndexMap<String, Variant>,
}

/// Policy applied when an action emission fails.
///
/// Declared for forward compatibility; action dispatch currently has no
/// failure modes, so the policy is carried but not enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnError {
    /// Log the failure and keep emitting the remaining actions.
    #[default]
    LogAndContinue,
    /// Unwind all commands queued by the current tick.
    AbortTick,
}

impl OnError {
    fn parse(text: &str) -> Self {
        match text {
            "abort_tick" => Self::AbortTick,
            _ => Self::LogAndContinue,
        }
    }
}

/// A rule with a compiled condition and resolved actions.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    /// The rule's identifier, used in diagnostics.
    pub id: String,
    /// The compiled condition, evaluated once per tick.
    pub condition: Condition,
    /// Actions emitted, in order, when the condition holds.
    pub actions: Vec<CompiledAction>,
    /// Error policy for action emission.
    pub on_error: OnError,
}

/// A fully validated, ordered, executable program.
#[derive(Clone, Debug, Default)]
pub struct CompiledProgram {
    /// Edges in evaluation order: delay edges first (spec order), then
    /// non-delay edges in topological order.
    pub edges: Vec<CompiledEdge>,
    /// Models in spec order.
    pub models: Vec<Model>,
    /// Rules in spec order.
    pub rules: Vec<CompiledRule>,
}

// ── Compilation ─────────────────────────────────────────────────

/// Compile a graph specification.
///
/// `expected_dt`, when positive, enables compile-time stability
/// validation of every model against the runtime time step.
pub fn compile(
    spec: &GraphSpec,
    signal_ns: &mut SignalNamespace,
    func_ns: &mut FunctionNamespace,
    expected_dt: Option<f64>,
) -> Result<CompiledProgram, CompileError> {
    let mut program = CompiledProgram::default();

    // Phase 1: models, in spec order.
    for model_spec in &spec.models {
        program.models.push(parse_model(model_spec, signal_ns)?);
    }

    // Phase 2: stability against the expected runtime dt.
    if let Some(dt) = expected_dt {
        if dt > 0.0 {
            validate_stability(&program.models, dt)?;
        }
    }

    // Phase 3: edges, in spec order.
    for edge_spec in &spec.edges {
        let source = signal_ns.intern(&edge_spec.source_path);
        let target = signal_ns.intern(&edge_spec.target_path);
        let transform = parse_transform(&edge_spec.transform)?;
        let is_delay = transform.is_delay();
        program.edges.push(CompiledEdge {
            source,
            target,
            transform,
            is_delay,
        });
    }

    // Phase 4: single-writer ownership across edge targets and model outputs.
    let mut writer_owner: IndexMap<SignalId, &'static str> = IndexMap::new();
    let mut register_writer = |id: SignalId, owner: &'static str| match writer_owner.entry(id) {
        indexmap::map::Entry::Occupied(prev) => Err(CompileError::MultipleWriters {
            signal: signal_ns.lookup(id).to_string(),
            first: prev.get().to_string(),
            second: owner.to_string(),
        }),
        indexmap::map::Entry::Vacant(slot) => {
            slot.insert(owner);
            Ok(())
        }
    };

    for edge in &program.edges {
        register_writer(edge.target, "edge target")?;
    }
    for model in &program.models {
        for output in model.outputs() {
            register_writer(output.signal, "model output")?;
        }
    }

    // Phase 5: cycles in the non-delay subgraph (delay edges deliberately
    // break algebraic loops).
    detect_cycles(&program.edges, signal_ns)?;

    // Phase 6: deterministic edge ordering.
    program.edges = order_edges(std::mem::take(&mut program.edges))?;

    // Phase 7: rules, in spec order.
    for rule_spec in &spec.rules {
        let expr = parse_condition(&rule_spec.condition).map_err(|reason| {
            CompileError::InvalidCondition {
                rule: rule_spec.id.clone(),
                reason,
            }
        })?;
        let condition = Condition {
            signal: signal_ns.intern(&expr.path),
            op: expr.op,
            rhs: expr.rhs,
        };

        let mut actions = Vec::with_capacity(rule_spec.actions.len());
        for action in &rule_spec.actions {
            actions.push(CompiledAction {
                device: func_ns.intern_device(&action.device),
                function: func_ns.intern_function(&action.function),
                args: action.args.clone(),
            });
        }

        program.rules.push(CompiledRule {
            id: rule_spec.id.clone(),
            condition,
            actions,
            on_error: OnError::parse(&rule_spec.on_error),
        });
    }

    Ok(program)
}

/// Instantiate a transform from its spec.
pub fn parse_transform(spec: &TransformSpec) -> Result<Transform, CompileError> {
    let context = format!("transform[{}]", spec.kind);
    let p = &spec.params;

    match spec.kind.as_str() {
        "linear" => {
            let scale = params::require_f64(p, "scale", &context)?;
            let offset = params::require_f64(p, "offset", &context)?;
            let clamp_min = params::optional_f64(p, "clamp_min", &context, f64::NEG_INFINITY)?;
            let clamp_max = params::optional_f64(p, "clamp_max", &context, f64::INFINITY)?;
            Ok(Transform::Linear(Linear::with_clamp(
                scale, offset, clamp_min, clamp_max,
            )))
        }
        "first_order_lag" => {
            let tau_s = params::require_f64(p, "tau_s", &context)?;
            Ok(Transform::FirstOrderLag(FirstOrderLag::new(tau_s)))
        }
        "delay" => {
            let delay_sec = params::require_f64(p, "delay_sec", &context)?;
            Ok(Transform::Delay(Delay::new(delay_sec)))
        }
        "noise" => {
            let amplitude = params::require_f64(p, "amplitude", &context)?;
            let seed = match p.get("seed") {
                Some(value) => params::as_i64(value, &format!("{context}/seed"))? as u64,
                None => 0,
            };
            Ok(Transform::Noise(Noise::new(amplitude, seed)))
        }
        "saturation" => {
            // `min`/`max` preferred; `min_value`/`max_value` accepted.
            let min = match p.get("min") {
                Some(value) => params::as_f64(value, &format!("{context}/min"))?,
                None => params::require_f64(p, "min_value", &context)?,
            };
            let max = match p.get("max") {
                Some(value) => params::as_f64(value, &format!("{context}/max"))?,
                None => params::require_f64(p, "max_value", &context)?,
            };
            Ok(Transform::Saturation(Saturation::new(min, max)))
        }
        "deadband" => {
            let threshold = params::require_f64(p, "threshold", &context)?;
            Ok(Transform::Deadband(Deadband::new(threshold)))
        }
        "rate_limiter" => {
            let max_rate = match p.get("max_rate_per_sec") {
                Some(value) => params::as_f64(value, &format!("{context}/max_rate_per_sec"))?,
                None => params::require_f64(p, "max_rate", &context)?,
            };
            Ok(Transform::RateLimiter(RateLimiter::new(max_rate)))
        }
        "moving_average" => {
            let window = params::as_i64(
                params::require(p, "window_size", &context)?,
                &format!("{context}/window_size"),
            )?;
            if window < 1 {
                return Err(CompileError::InvalidParam {
                    path: format!("{context}/window_size"),
                    reason: "expected >= 1".to_string(),
                });
            }
            Ok(Transform::MovingAverage(MovingAverage::new(window as usize)))
        }
        _ => Err(CompileError::UnknownTransformKind {
            kind: spec.kind.clone(),
        }),
    }
}

/// Instantiate a model from its spec, interning its signal paths.
pub fn parse_model(spec: &ModelSpec, ns: &mut SignalNamespace) -> Result<Model, CompileError> {
    let context = format!("model[{}:{}]", spec.id, spec.kind);
    let p = &spec.params;

    match spec.kind.as_str() {
        "thermal_mass" => {
            let thermal_mass = params::require_f64(p, "thermal_mass", &context)?;
            let heat_transfer_coeff = params::require_f64(p, "heat_transfer_coeff", &context)?;
            let initial_temp = params::require_f64(p, "initial_temp", &context)?;
            let temp_path = params::require_str(p, "temp_signal", &context)?;
            let power_path = params::require_str(p, "power_signal", &context)?;
            let ambient_path = params::require_str(p, "ambient_signal", &context)?;

            Ok(Model::ThermalMass(ThermalMass::new(
                spec.id.clone(),
                thermal_mass,
                heat_transfer_coeff,
                initial_temp,
                temp_path,
                power_path,
                ambient_path,
                ns,
            )))
        }
        _ => Err(CompileError::UnknownModelKind {
            kind: spec.kind.clone(),
        }),
    }
}

fn validate_stability(models: &[Model], expected_dt: f64) -> Result<(), CompileError> {
    for model in models {
        let limit = model.stability_limit();
        if expected_dt > limit {
            return Err(CompileError::StabilityViolation {
                model: model.describe(),
                limit,
                dt: expected_dt,
            });
        }
    }
    Ok(())
}

// ── Cycle detection ─────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum VisitState {
    Unvisited,
    Visiting,
    Done,
}

/// DFS over the non-delay subgraph; a back edge means an algebraic loop.
fn detect_cycles(edges: &[CompiledEdge], ns: &SignalNamespace) -> Result<(), CompileError> {
    let mut graph: BTreeMap<SignalId, Vec<SignalId>> = BTreeMap::new();
    for edge in edges {
        if edge.is_delay {
            continue;
        }
        graph.entry(edge.source).or_default().push(edge.target);
        graph.entry(edge.target).or_default();
    }

    let mut state: BTreeMap<SignalId, VisitState> =
        graph.keys().map(|&n| (n, VisitState::Unvisited)).collect();

    let nodes: Vec<SignalId> = graph.keys().copied().collect();
    for node in nodes {
        if state[&node] == VisitState::Unvisited {
            let mut stack = Vec::new();
            if let Some(cycle) = dfs(node, &graph, &mut state, &mut stack) {
                let cycle_paths = cycle.iter().map(|&id| ns.lookup(id).to_string()).collect();
                return Err(CompileError::AlgebraicLoop { cycle: cycle_paths });
            }
        }
    }
    Ok(())
}

fn dfs(
    node: SignalId,
    graph: &BTreeMap<SignalId, Vec<SignalId>>,
    state: &mut BTreeMap<SignalId, VisitState>,
    stack: &mut Vec<SignalId>,
) -> Option<Vec<SignalId>> {
    state.insert(node, VisitState::Visiting);
    stack.push(node);

    if let Some(neighbors) = graph.get(&node) {
        for &neighbor in neighbors {
            match state[&neighbor] {
                VisitState::Unvisited => {
                    if let Some(cycle) = dfs(neighbor, graph, state, stack) {
                        return Some(cycle);
                    }
                }
                VisitState::Visiting => {
                    // Back edge: the cycle is the stack suffix from the
                    // first occurrence of `neighbor`, closed by repeating it.
                    let start = stack.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<SignalId> = stack[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                VisitState::Done => {}
            }
        }
    }

    stack.pop();
    state.insert(node, VisitState::Done);
    None
}

// ── Edge ordering ───────────────────────────────────────────────

/// Order edges for evaluation: delay edges first in spec order, then
/// non-delay edges topologically sorted by Kahn's algorithm with a
/// smallest-`SignalId`-first tie-break among ready signals.
///
/// Delay outputs must be observable when immediate-propagation edges
/// run, hence delay-first.
fn order_edges(edges: Vec<CompiledEdge>) -> Result<Vec<CompiledEdge>, CompileError> {
    let mut delay_indices = Vec::with_capacity(edges.len());
    let mut immediate_indices = Vec::with_capacity(edges.len());
    for (i, edge) in edges.iter().enumerate() {
        if edge.is_delay {
            delay_indices.push(i);
        } else {
            immediate_indices.push(i);
        }
    }

    // Kahn's algorithm over the immediate (non-delay) subgraph only.
    let mut outgoing: BTreeMap<SignalId, Vec<usize>> = BTreeMap::new();
    let mut in_degree: BTreeMap<SignalId, usize> = BTreeMap::new();

    for &idx in &immediate_indices {
        let edge = &edges[idx];
        outgoing.entry(edge.source).or_default().push(idx);
        in_degree.entry(edge.source).or_insert(0);
        *in_degree.entry(edge.target).or_insert(0) += 1;
    }

    // BTreeSet pop-first gives the smallest-SignalId tie-break.
    let mut ready: BTreeSet<SignalId> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&sig, _)| sig)
        .collect();

    let mut sorted_immediate = Vec::with_capacity(immediate_indices.len());
    while let Some(&sig) = ready.iter().next() {
        ready.remove(&sig);

        let Some(edge_indices) = outgoing.get(&sig) else {
            continue;
        };
        for &idx in edge_indices {
            sorted_immediate.push(idx);
            let target = edges[idx].target;
            if let Some(deg) = in_degree.get_mut(&target) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(target);
                }
            }
        }
    }

    if sorted_immediate.len() != immediate_indices.len() {
        // Unreachable after detect_cycles, kept as a hard error.
        return Err(CompileError::AlgebraicLoop { cycle: Vec::new() });
    }

    let mut slots: Vec<Option<CompiledEdge>> = edges.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());
    for idx in delay_indices.into_iter().chain(sorted_immediate) {
        if let Some(edge) = slots[idx].take() {
            ordered.push(edge);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ActionSpec, EdgeSpec, RuleSpec};

    fn linear() -> TransformSpec {
        TransformSpec::new("linear")
            .with_param("scale", 1.0)
            .with_param("offset", 0.0)
    }

    fn delay(sec: f64) -> TransformSpec {
        TransformSpec::new("delay").with_param("delay_sec", sec)
    }

    fn thermal_model(id: &str) -> ModelSpec {
        ModelSpec::new(id, "thermal_mass")
            .with_param("thermal_mass", 1000.0)
            .with_param("heat_transfer_coeff", 10.0)
            .with_param("initial_temp", 25.0)
            .with_param("temp_signal", format!("{id}/temperature"))
            .with_param("power_signal", format!("{id}/power"))
            .with_param("ambient_signal", format!("{id}/ambient"))
    }

    fn compile_spec(spec: &GraphSpec) -> Result<CompiledProgram, CompileError> {
        let mut signal_ns = SignalNamespace::new();
        let mut func_ns = FunctionNamespace::new();
        compile(spec, &mut signal_ns, &mut func_ns, None)
    }

    // ── Transform parsing ────────────────────────────────────

    #[test]
    fn parse_transform_all_kinds() {
        let specs = [
            linear(),
            TransformSpec::new("first_order_lag").with_param("tau_s", 1.0),
            delay(0.1),
            TransformSpec::new("noise").with_param("amplitude", 0.5),
            TransformSpec::new("saturation")
                .with_param("min", -1.0)
                .with_param("max", 1.0),
            TransformSpec::new("deadband").with_param("threshold", 0.1),
            TransformSpec::new("rate_limiter").with_param("max_rate_per_sec", 5.0),
            TransformSpec::new("moving_average").with_param("window_size", 4i64),
        ];
        for spec in &specs {
            let transform = parse_transform(spec).unwrap();
            assert_eq!(transform.kind(), spec.kind, "kind roundtrip for {spec:?}");
        }
    }

    #[test]
    fn parse_transform_unknown_kind_fails() {
        let err = parse_transform(&TransformSpec::new("warp_drive")).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownTransformKind {
                kind: "warp_drive".to_string()
            }
        );
    }

    #[test]
    fn parse_transform_missing_param_names_path() {
        let err = parse_transform(&TransformSpec::new("linear").with_param("scale", 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingParam {
                path: "transform[linear]/offset".to_string()
            }
        );
    }

    #[test]
    fn parse_transform_type_error_names_types() {
        let err = parse_transform(
            &TransformSpec::new("deadband").with_param("threshold", "wide"),
        )
        .unwrap_err();
        match err {
            CompileError::TypeError {
                path,
                expected,
                got,
            } => {
                assert_eq!(path, "transform[deadband]/threshold");
                assert_eq!(expected, "number");
                assert_eq!(got, "string");
            }
            other => panic!("expected TypeError, got {other:?}"),
        }
    }

    #[test]
    fn parse_transform_saturation_aliases() {
        let spec = TransformSpec::new("saturation")
            .with_param("min_value", 0.0)
            .with_param("max_value", 10.0);
        assert!(parse_transform(&spec).is_ok());

        // Missing both spellings of max.
        let spec = TransformSpec::new("saturation").with_param("min", 0.0);
        match parse_transform(&spec).unwrap_err() {
            CompileError::MissingParam { path } => {
                assert_eq!(path, "transform[saturation]/max_value");
            }
            other => panic!("expected MissingParam, got {other:?}"),
        }
    }

    #[test]
    fn parse_transform_rate_limiter_alias() {
        let spec = TransformSpec::new("rate_limiter").with_param("max_rate", 2.0);
        assert!(parse_transform(&spec).is_ok());
    }

    #[test]
    fn parse_transform_noise_integer_amplitude_widens() {
        let spec = TransformSpec::new("noise")
            .with_param("amplitude", 1i64)
            .with_param("seed", 42i64);
        assert!(parse_transform(&spec).is_ok());
    }

    #[test]
    fn parse_transform_moving_average_rejects_zero_window() {
        let spec = TransformSpec::new("moving_average").with_param("window_size", 0i64);
        match parse_transform(&spec).unwrap_err() {
            CompileError::InvalidParam { path, .. } => {
                assert_eq!(path, "transform[moving_average]/window_size");
            }
            other => panic!("expected InvalidParam, got {other:?}"),
        }
    }

    // ── Model parsing ────────────────────────────────────────

    #[test]
    fn parse_model_unknown_kind_fails() {
        let mut ns = SignalNamespace::new();
        let err = parse_model(&ModelSpec::new("m", "cold_fusion"), &mut ns).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownModelKind {
                kind: "cold_fusion".to_string()
            }
        );
    }

    #[test]
    fn parse_model_missing_param_names_context() {
        let mut ns = SignalNamespace::new();
        let spec = ModelSpec::new("chamber", "thermal_mass").with_param("thermal_mass", 1.0);
        match parse_model(&spec, &mut ns).unwrap_err() {
            CompileError::MissingParam { path } => {
                assert_eq!(path, "model[chamber:thermal_mass]/heat_transfer_coeff");
            }
            other => panic!("expected MissingParam, got {other:?}"),
        }
    }

    // ── Graph validation ─────────────────────────────────────

    #[test]
    fn cycle_of_linear_edges_is_rejected() {
        // S4: A->B and B->A, both linear.
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("A", "B", linear()),
                EdgeSpec::new("B", "A", linear()),
            ],
            ..Default::default()
        };
        match compile_spec(&spec).unwrap_err() {
            CompileError::AlgebraicLoop { cycle } => {
                assert!(cycle.len() >= 3, "cycle path too short: {cycle:?}");
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected AlgebraicLoop, got {other:?}"),
        }
    }

    #[test]
    fn delay_edge_breaks_the_cycle() {
        // S4: replacing the feedback edge with a delay compiles.
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("A", "B", linear()),
                EdgeSpec::new("B", "A", delay(0.1)),
            ],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        assert_eq!(program.edges.len(), 2);
        // Delay edge is ordered first.
        assert!(program.edges[0].is_delay);
    }

    #[test]
    fn self_loop_is_rejected() {
        let spec = GraphSpec {
            edges: vec![EdgeSpec::new("A", "A", linear())],
            ..Default::default()
        };
        assert!(matches!(
            compile_spec(&spec).unwrap_err(),
            CompileError::AlgebraicLoop { .. }
        ));
    }

    #[test]
    fn longer_cycle_reports_path() {
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("A", "B", linear()),
                EdgeSpec::new("B", "C", linear()),
                EdgeSpec::new("C", "A", linear()),
            ],
            ..Default::default()
        };
        match compile_spec(&spec).unwrap_err() {
            CompileError::AlgebraicLoop { cycle } => {
                assert_eq!(cycle.len(), 4);
                let msg = CompileError::AlgebraicLoop { cycle }.to_string();
                assert!(msg.contains(" -> "));
            }
            other => panic!("expected AlgebraicLoop, got {other:?}"),
        }
    }

    #[test]
    fn two_edges_same_target_is_rejected() {
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("A", "C", linear()),
                EdgeSpec::new("B", "C", linear()),
            ],
            ..Default::default()
        };
        match compile_spec(&spec).unwrap_err() {
            CompileError::MultipleWriters { signal, .. } => assert_eq!(signal, "C"),
            other => panic!("expected MultipleWriters, got {other:?}"),
        }
    }

    #[test]
    fn edge_target_colliding_with_model_output_is_rejected() {
        let spec = GraphSpec {
            models: vec![thermal_model("chamber")],
            edges: vec![EdgeSpec::new("A", "chamber/temperature", linear())],
            ..Default::default()
        };
        match compile_spec(&spec).unwrap_err() {
            CompileError::MultipleWriters { signal, .. } => {
                assert_eq!(signal, "chamber/temperature");
            }
            other => panic!("expected MultipleWriters, got {other:?}"),
        }
    }

    #[test]
    fn stability_violation_at_compile_time() {
        // S5: C=1, h=100 -> limit 0.02 < dt 0.1.
        let model = ModelSpec::new("hot", "thermal_mass")
            .with_param("thermal_mass", 1.0)
            .with_param("heat_transfer_coeff", 100.0)
            .with_param("initial_temp", 0.0)
            .with_param("temp_signal", "hot/t")
            .with_param("power_signal", "hot/p")
            .with_param("ambient_signal", "hot/a");
        let spec = GraphSpec {
            models: vec![model],
            ..Default::default()
        };

        let mut signal_ns = SignalNamespace::new();
        let mut func_ns = FunctionNamespace::new();
        match compile(&spec, &mut signal_ns, &mut func_ns, Some(0.1)).unwrap_err() {
            CompileError::StabilityViolation { model, limit, dt } => {
                assert!(model.contains("hot"));
                assert!((limit - 0.02).abs() < 1e-12);
                assert_eq!(dt, 0.1);
            }
            other => panic!("expected StabilityViolation, got {other:?}"),
        }

        // The same spec compiles when dt is within the limit.
        let mut signal_ns = SignalNamespace::new();
        let mut func_ns = FunctionNamespace::new();
        assert!(compile(&spec, &mut signal_ns, &mut func_ns, Some(0.01)).is_ok());
    }

    #[test]
    fn no_stability_check_without_expected_dt() {
        let model = ModelSpec::new("hot", "thermal_mass")
            .with_param("thermal_mass", 1.0)
            .with_param("heat_transfer_coeff", 100.0)
            .with_param("initial_temp", 0.0)
            .with_param("temp_signal", "hot/t")
            .with_param("power_signal", "hot/p")
            .with_param("ambient_signal", "hot/a");
        let spec = GraphSpec {
            models: vec![model],
            ..Default::default()
        };
        assert!(compile_spec(&spec).is_ok());
    }

    // ── Edge ordering ────────────────────────────────────────

    #[test]
    fn chain_orders_upstream_first() {
        // Declared out of dependency order: B->C before A->B.
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("B", "C", linear()),
                EdgeSpec::new("A", "B", linear()),
            ],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        // A->B must evaluate before B->C.
        // Interning order: B=0, C=1, A=2.
        assert_eq!(program.edges[0].source, SignalId(2));
        assert_eq!(program.edges[1].source, SignalId(0));
    }

    #[test]
    fn ready_tie_break_is_smallest_signal_id() {
        // Two independent roots; the edge whose source interned first
        // must evaluate first regardless of declaration order.
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("zz", "out1", linear()),
                EdgeSpec::new("aa", "out2", linear()),
            ],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        // Interning: zz=0, out1=1, aa=2, out2=3. Ready = {0, 2}; 0 first.
        assert_eq!(program.edges[0].source, SignalId(0));
        assert_eq!(program.edges[1].source, SignalId(2));
    }

    #[test]
    fn delay_edges_keep_spec_order_ahead_of_sorted_edges() {
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("x", "y", linear()),
                EdgeSpec::new("p", "q", delay(0.2)),
                EdgeSpec::new("m", "n", delay(0.1)),
            ],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        assert!(program.edges[0].is_delay);
        assert!(program.edges[1].is_delay);
        assert!(!program.edges[2].is_delay);
        // Delay edges stay in spec order: p->q before m->n.
        assert_eq!(program.edges[0].source, SignalId(2)); // p
        assert_eq!(program.edges[1].source, SignalId(4)); // m
    }

    #[test]
    fn fan_out_from_one_source_is_allowed() {
        let spec = GraphSpec {
            edges: vec![
                EdgeSpec::new("src", "a", linear()),
                EdgeSpec::new("src", "b", linear()),
            ],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        assert_eq!(program.edges.len(), 2);
    }

    // ── Rule compilation ─────────────────────────────────────

    #[test]
    fn rules_compile_conditions_and_intern_actions() {
        let spec = GraphSpec {
            rules: vec![RuleSpec::new("overheat", "chamber/temperature > 100")
                .with_action(
                    ActionSpec::new("heater", "shutdown").with_arg("reason", "overheat"),
                )
                .with_action(ActionSpec::new("alarm", "raise"))],
            ..Default::default()
        };

        let mut signal_ns = SignalNamespace::new();
        let mut func_ns = FunctionNamespace::new();
        let program = compile(&spec, &mut signal_ns, &mut func_ns, None).unwrap();

        let rule = &program.rules[0];
        assert_eq!(rule.id, "overheat");
        assert_eq!(rule.condition.signal, signal_ns.resolve("chamber/temperature"));
        assert_eq!(rule.actions.len(), 2);
        assert_eq!(func_ns.lookup_device(rule.actions[0].device), "heater");
        assert_eq!(func_ns.lookup_function(rule.actions[0].function), "shutdown");
        assert_eq!(func_ns.lookup_device(rule.actions[1].device), "alarm");
        assert_eq!(rule.on_error, OnError::LogAndContinue);
    }

    #[test]
    fn invalid_condition_names_the_rule() {
        let spec = GraphSpec {
            rules: vec![RuleSpec::new("bad", "temperature is too high")],
            ..Default::default()
        };
        match compile_spec(&spec).unwrap_err() {
            CompileError::InvalidCondition { rule, .. } => assert_eq!(rule, "bad"),
            other => panic!("expected InvalidCondition, got {other:?}"),
        }
    }

    #[test]
    fn on_error_parses_abort_tick() {
        let mut rule = RuleSpec::new("r", "x > 0");
        rule.on_error = "abort_tick".to_string();
        let spec = GraphSpec {
            rules: vec![rule],
            ..Default::default()
        };
        let program = compile_spec(&spec).unwrap();
        assert_eq!(program.rules[0].on_error, OnError::AbortTick);
    }

    #[test]
    fn interning_follows_spec_walk_order() {
        // Models intern first, then edges, then rule conditions.
        let spec = GraphSpec {
            models: vec![thermal_model("chamber")],
            edges: vec![EdgeSpec::new("ext/in", "chamber/power", linear())],
            rules: vec![RuleSpec::new("r", "ext/alarm > 0")],
        };
        let mut signal_ns = SignalNamespace::new();
        let mut func_ns = FunctionNamespace::new();
        compile(&spec, &mut signal_ns, &mut func_ns, None).unwrap();

        assert_eq!(signal_ns.resolve("chamber/temperature"), SignalId(0));
        assert_eq!(signal_ns.resolve("chamber/power"), SignalId(1));
        assert_eq!(signal_ns.resolve("chamber/ambient"), SignalId(2));
        assert_eq!(signal_ns.resolve("ext/in"), SignalId(3));
        assert_eq!(signal_ns.resolve("ext/alarm"), SignalId(4));
    }
}
