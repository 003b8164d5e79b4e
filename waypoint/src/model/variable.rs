//! Typed, named data slots flowing through the mission tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::schema::Schema;

/// Role of a variable within its owning scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    Input,
    Output,
    /// Intermediate value not exported from its scope.
    Wip,
}

/// Production status of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableStatus {
    Pending,
    Ready,
    Error,
}

/// A named, typed slot of data.
///
/// Identity (`id`, `name`, `schema`) is immutable once created; only
/// `value`, `status` and `error_message` change over the lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub io_type: IoType,
    pub status: VariableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Id of the node that created this variable.
    pub origin_node_id: String,
}

impl Variable {
    /// Create a pending variable with no value.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        schema: Schema,
        io_type: IoType,
        origin_node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema,
            value: None,
            io_type,
            status: VariableStatus::Pending,
            error_message: None,
            origin_node_id: origin_node_id.into(),
        }
    }

    /// Assign a produced value, marking the variable ready.
    pub fn assign(&mut self, value: Value) {
        self.value = Some(value);
        self.status = VariableStatus::Ready;
        self.error_message = None;
    }

    /// Record a production failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = VariableStatus::Error;
        self.error_message = Some(message.into());
    }

    pub fn is_ready(&self) -> bool {
        self.status == VariableStatus::Ready
    }
}
