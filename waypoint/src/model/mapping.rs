//! Wires between source variables and their consumers.

use serde::{Deserialize, Serialize};

use crate::model::schema::Schema;

/// Merge policy applied when a tool output lands on a variable.
///
/// `Unknown` captures unrecognized operations from serialized snapshots so
/// the applicator can surface them instead of failing deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MergeOp {
    Assign,
    Append,
    Unknown,
}

impl MergeOp {
    pub fn as_str(self) -> &'static str {
        match self {
            MergeOp::Assign => "assign",
            MergeOp::Append => "append",
            MergeOp::Unknown => "unknown",
        }
    }
}

impl From<String> for MergeOp {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "assign" => MergeOp::Assign,
            "append" => MergeOp::Append,
            _ => MergeOp::Unknown,
        }
    }
}

impl From<MergeOp> for String {
    fn from(op: MergeOp) -> Self {
        op.as_str().to_string()
    }
}

/// Where a mapping delivers its source value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MappingTarget {
    /// Another variable, by id (wiring a tool output into a variable).
    Variable { variable_id: String },
    /// A tool-input parameter (wiring an available input into a tool call).
    Parameter {
        name: String,
        schema: Schema,
        required: bool,
    },
}

/// A wire from a source variable to either another variable or a tool
/// parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Source variable id. `None` means the mapping is not yet bound (for
    /// parameter targets) or sources the raw tool output (for variable
    /// targets created at tool selection).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_variable_id: Option<String>,
    pub target: MappingTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<MergeOp>,
    /// Marks a mapping whose source is re-exported unchanged as the owning
    /// node's own output, which removes it from ordinary sibling/ancestor
    /// visibility.
    #[serde(default)]
    pub is_parent_output: bool,
}

impl Mapping {
    /// Unbound mapping into a tool parameter.
    pub fn parameter(name: impl Into<String>, schema: Schema, required: bool) -> Self {
        Self {
            source_variable_id: None,
            target: MappingTarget::Parameter {
                name: name.into(),
                schema,
                required,
            },
            operation: None,
            is_parent_output: false,
        }
    }

    /// Mapping delivering a tool output into `variable_id` under `operation`.
    pub fn output(variable_id: impl Into<String>, operation: MergeOp) -> Self {
        Self {
            source_variable_id: None,
            target: MappingTarget::Variable {
                variable_id: variable_id.into(),
            },
            operation: Some(operation),
            is_parent_output: false,
        }
    }

    /// Id of the variable this mapping targets, if the target is a variable.
    pub fn target_variable_id(&self) -> Option<&str> {
        match &self.target {
            MappingTarget::Variable { variable_id } => Some(variable_id),
            MappingTarget::Parameter { .. } => None,
        }
    }

    /// Parameter name this mapping targets, if the target is a parameter.
    pub fn target_parameter(&self) -> Option<(&str, &Schema, bool)> {
        match &self.target {
            MappingTarget::Parameter {
                name,
                schema,
                required,
            } => Some((name, schema, *required)),
            MappingTarget::Variable { .. } => None,
        }
    }

    pub fn bound_source(&self) -> Option<&str> {
        self.source_variable_id.as_deref().filter(|id| !id.is_empty())
    }
}
