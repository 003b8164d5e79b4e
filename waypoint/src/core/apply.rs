//! Folding freshly produced tool output onto a typed variable.
//!
//! Structural problems (bare references, mappings missing an operation or a
//! variable target) recover locally with a pass-through; an unrecognized
//! operation returns `None` so callers can surface it instead of silently
//! dropping data.

use serde_json::Value;

use crate::model::mapping::{Mapping, MergeOp};
use crate::model::variable::Variable;

/// How an output landing on a variable is described by the caller.
#[derive(Clone, Copy, Debug)]
pub enum OutputBinding<'a> {
    /// A bare variable-name reference with no merge policy attached.
    Name(&'a str),
    /// A structured mapping carrying operation and target.
    Mapping(&'a Mapping),
}

/// Compute the variable's new value from `new_value` under the binding's
/// merge policy.
///
/// Returns `Some(value)` on success (including the pass-through fallback)
/// and `None` for an unhandled operation.
pub fn apply_output(
    variable: &Variable,
    binding: &OutputBinding<'_>,
    new_value: &Value,
) -> Option<Value> {
    let mapping = match binding {
        OutputBinding::Name(_) => return Some(new_value.clone()),
        OutputBinding::Mapping(mapping) => mapping,
    };
    // A mapping without an operation or without a variable target is a
    // defined pass-through, not an error.
    let Some(operation) = mapping.operation else {
        return Some(new_value.clone());
    };
    if mapping.target_variable_id().is_none() {
        return Some(new_value.clone());
    }

    match operation {
        MergeOp::Assign => Some(assign(variable, new_value)),
        MergeOp::Append => Some(append(variable, new_value)),
        MergeOp::Unknown => None,
    }
}

fn assign(variable: &Variable, new_value: &Value) -> Value {
    if variable.schema.is_array {
        return match new_value {
            Value::Array(_) => new_value.clone(),
            other => Value::Array(vec![other.clone()]),
        };
    }
    match new_value {
        Value::Array(_) => Value::String(text_form(new_value)),
        Value::Object(_) => {
            // Assigning a lone object to a scalar reproduces its JSON text;
            // appending the same object uses the placeholder form instead.
            Value::String(serde_json::to_string(new_value).unwrap_or_else(|_| text_form(new_value)))
        }
        other => other.clone(),
    }
}

fn append(variable: &Variable, new_value: &Value) -> Value {
    if variable.schema.is_array {
        let mut items = match &variable.value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(existing)) => existing.clone(),
            Some(other) => vec![other.clone()],
        };
        match new_value {
            Value::Array(new_items) => items.extend(new_items.iter().cloned()),
            other => items.push(other.clone()),
        }
        return Value::Array(items);
    }

    let current = match &variable.value {
        None | Some(Value::Null) => String::new(),
        Some(value) => text_form(value),
    };
    Value::String(format!("{}\n\n{}", current, text_form(new_value)))
}

/// Generic textual coercion mirroring the host runtime the rest of the
/// system depends on: arrays join their elements with `,` (null elements
/// become empty), objects collapse to a `[object Object]` placeholder.
fn text_form(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                if item.is_null() {
                    String::new()
                } else {
                    text_form(item)
                }
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
