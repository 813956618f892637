//! JSON configuration loader.

use fluxgraph_core::Variant;
use fluxgraph_graph::{ActionSpec, EdgeSpec, GraphSpec, ModelSpec, RuleSpec, TransformSpec};
use serde_json::Value;

use crate::error::LoadError;

/// Parse a JSON document into a [`GraphSpec`].
///
/// Top-level `models`, `edges`, and `rules` arrays are all optional.
/// Unlike the YAML loader, every edge must carry a `transform` object.
pub fn load_str(content: &str) -> Result<GraphSpec, LoadError> {
    let root: Value = serde_json::from_str(content).map_err(|e| LoadError::Syntax {
        format: "json",
        message: e.to_string(),
    })?;

    let mut spec = GraphSpec::default();
    if !root.is_object() {
        return Err(LoadError::Structure {
            path: "/".to_string(),
            message: "expected an object at the document root".to_string(),
        });
    }

    if let Some(edges) = root.get("edges").and_then(Value::as_array) {
        for (index, node) in edges.iter().enumerate() {
            spec.edges.push(parse_edge(node, index)?);
        }
    }

    if let Some(models) = root.get("models").and_then(Value::as_array) {
        for (index, node) in models.iter().enumerate() {
            spec.models.push(parse_model(node, index)?);
        }
    }

    if let Some(rules) = root.get("rules").and_then(Value::as_array) {
        for (index, node) in rules.iter().enumerate() {
            spec.rules.push(parse_rule(node, index)?);
        }
    }

    Ok(spec)
}

fn structure_err(path: &str, message: impl Into<String>) -> LoadError {
    LoadError::Structure {
        path: path.to_string(),
        message: message.into(),
    }
}

fn require_str<'a>(node: &'a Value, field: &str, path: &str) -> Result<&'a str, LoadError> {
    node.get(field)
        .ok_or_else(|| structure_err(path, format!("missing required field '{field}'")))?
        .as_str()
        .ok_or_else(|| structure_err(path, format!("field '{field}' must be a string")))
}

/// Infer a [`Variant`] from a JSON value.
fn to_variant(node: &Value, path: &str) -> Result<Variant, LoadError> {
    match node {
        Value::Bool(b) => Ok(Variant::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Variant::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Variant::Float(f))
            } else {
                Err(structure_err(path, "unrepresentable number"))
            }
        }
        Value::String(s) => Ok(Variant::Str(s.clone())),
        _ => Err(structure_err(path, "unsupported type for a parameter value")),
    }
}

fn parse_variant_map(
    node: Option<&Value>,
    path: &str,
    out: &mut indexmap::IndexMap<String, Variant>,
) -> Result<(), LoadError> {
    let Some(object) = node.and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in object {
        let value = to_variant(value, &format!("{path}/{key}"))?;
        out.insert(key.clone(), value);
    }
    Ok(())
}

fn parse_transform(node: &Value, base_path: &str) -> Result<TransformSpec, LoadError> {
    let path = format!("{base_path}/transform");
    let mut spec = TransformSpec::new(require_str(node, "type", &path)?);
    parse_variant_map(node.get("params"), &format!("{path}/params"), &mut spec.params)?;
    Ok(spec)
}

fn parse_edge(node: &Value, index: usize) -> Result<EdgeSpec, LoadError> {
    let path = format!("/edges/{index}");
    let source = require_str(node, "source", &path)?;
    let target = require_str(node, "target", &path)?;
    let transform_node = node
        .get("transform")
        .ok_or_else(|| structure_err(&path, "missing required field 'transform'"))?;
    let transform = parse_transform(transform_node, &path)?;
    Ok(EdgeSpec::new(source, target, transform))
}

fn parse_model(node: &Value, index: usize) -> Result<ModelSpec, LoadError> {
    let path = format!("/models/{index}");
    let mut spec = ModelSpec::new(
        require_str(node, "id", &path)?,
        require_str(node, "type", &path)?,
    );
    parse_variant_map(node.get("params"), &format!("{path}/params"), &mut spec.params)?;
    Ok(spec)
}

fn parse_rule(node: &Value, index: usize) -> Result<RuleSpec, LoadError> {
    let path = format!("/rules/{index}");
    let mut spec = RuleSpec::new(
        require_str(node, "id", &path)?,
        require_str(node, "condition", &path)?,
    );

    if let Some(actions) = node.get("actions").and_then(Value::as_array) {
        for (i, action_node) in actions.iter().enumerate() {
            let action_path = format!("{path}/actions/{i}");
            let mut action = ActionSpec::new(
                require_str(action_node, "device", &action_path)?,
                require_str(action_node, "function", &action_path)?,
            );
            parse_variant_map(
                action_node.get("args"),
                &format!("{action_path}/args"),
                &mut action.args,
            )?;
            spec.actions.push(action);
        }
    }

    spec.on_error = match node.get("on_error") {
        Some(v) => v
            .as_str()
            .ok_or_else(|| structure_err(&path, "field 'on_error' must be a string"))?
            .to_string(),
        None => "log_and_continue".to_string(),
    };

    Ok(spec)
}
