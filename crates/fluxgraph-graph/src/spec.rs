//! Declarative graph specification PODs.
//!
//! Configuration loaders (YAML/JSON) produce this tree; the compiler
//! consumes it. Everything here is transport- and format-agnostic.

use fluxgraph_core::Variant;
use indexmap::IndexMap;

/// Specification of a transform attached to an edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformSpec {
    /// Kind name: `"linear"`, `"first_order_lag"`, `"delay"`, …
    pub kind: String,
    /// Kind-specific parameters.
    pub params: IndexMap<String, Variant>,
}

impl TransformSpec {
    /// Spec with the given kind and no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: IndexMap::new(),
        }
    }

    /// Add a parameter (builder style, used heavily in tests).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Specification of a directed edge between two signals.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSpec {
    /// Source signal path, e.g. `"tempctl0/chamber/power"`.
    pub source_path: String,
    /// Target signal path, e.g. `"chamber_air/heating_power"`.
    pub target_path: String,
    /// The transform applied along this edge.
    pub transform: TransformSpec,
}

impl EdgeSpec {
    /// Edge from `source` to `target` with the given transform.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        transform: TransformSpec,
    ) -> Self {
        Self {
            source_path: source.into(),
            target_path: target.into(),
            transform,
        }
    }
}

/// Specification of a physics model instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelSpec {
    /// Unique model identifier, e.g. `"chamber_air"`.
    pub id: String,
    /// Kind name, e.g. `"thermal_mass"`.
    pub kind: String,
    /// Kind-specific parameters (signal paths travel as string params).
    pub params: IndexMap<String, Variant>,
}

impl ModelSpec {
    /// Spec with the given id and kind and no parameters.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            params: IndexMap::new(),
        }
    }

    /// Add a parameter (builder style).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Specification of one rule action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionSpec {
    /// Target device name, e.g. `"tempctl0"`.
    pub device: String,
    /// Function name, e.g. `"set_power"`.
    pub function: String,
    /// Named arguments forwarded with the command.
    pub args: IndexMap<String, Variant>,
}

impl ActionSpec {
    /// Action with no arguments.
    pub fn new(device: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            function: function.into(),
            args: IndexMap::new(),
        }
    }

    /// Add an argument (builder style).
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Specification of a condition-action rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSpec {
    /// Unique rule identifier.
    pub id: String,
    /// Condition text, e.g. `"chamber_air/temperature > 100.0"`.
    pub condition: String,
    /// Actions emitted, in order, when the condition holds.
    pub actions: Vec<ActionSpec>,
    /// Error policy name; `"log_and_continue"` when unspecified.
    pub on_error: String,
}

impl RuleSpec {
    /// Rule with the given id and condition and no actions.
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
            actions: Vec::new(),
            on_error: String::new(),
        }
    }

    /// Append an action (builder style).
    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }
}

/// Complete graph specification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSpec {
    /// Physics models, in declaration order.
    pub models: Vec<ModelSpec>,
    /// Signal edges, in declaration order.
    pub edges: Vec<EdgeSpec>,
    /// Rules, in declaration order.
    pub rules: Vec<RuleSpec>,
}
