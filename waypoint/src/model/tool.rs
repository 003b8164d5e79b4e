//! Static tool catalog types, consumed read-only.

use serde::{Deserialize, Serialize};

use crate::model::schema::Schema;

/// One declared input or output of a tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub schema: Schema,
    #[serde(default)]
    pub required: bool,
}

/// Static description of a tool: what it consumes and what it produces.
///
/// The engine never executes tools; it only reads these declarations to
/// seed mappings and variables when a tool is selected on a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ToolParam>,
    #[serde(default)]
    pub outputs: Vec<ToolParam>,
}
