//! Work units of the decomposition hierarchy.

use serde::{Deserialize, Serialize};

use crate::model::mapping::Mapping;
use crate::model::variable::Variable;

/// Execution status of a step.
///
/// `Unresolved` and `PendingInputsReady` are derived from structure; the
/// rest are driven by execution events and only stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Unresolved,
    PendingInputsReady,
    Ready,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Unresolved => "unresolved",
            StepStatus::PendingInputsReady => "pending_inputs_ready",
            StepStatus::Ready => "ready",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

/// Atomic steps run a tool; composite steps decompose into substeps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepKind {
    Atomic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_id: Option<String>,
    },
    Composite { substeps: Vec<Step> },
}

/// A unit of work: either an atomic tool invocation or a composite of
/// substeps. Owns its local variable set; cross-scope values are copied in
/// by the scope resolver, never aliased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: StepKind,
    #[serde(default)]
    pub state: Vec<Variable>,
    #[serde(default)]
    pub input_mappings: Vec<Mapping>,
    #[serde(default)]
    pub output_mappings: Vec<Mapping>,
    pub status: StepStatus,
}

impl Step {
    /// Create an atomic step with no tool selected yet.
    pub fn atomic(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: StepKind::Atomic { tool_id: None },
            state: Vec::new(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
            status: StepStatus::Unresolved,
        }
    }

    /// Create a composite step over the given substeps.
    pub fn composite(id: impl Into<String>, name: impl Into<String>, substeps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: StepKind::Composite { substeps },
            state: Vec::new(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
            status: StepStatus::Unresolved,
        }
    }

    pub fn substeps(&self) -> &[Step] {
        match &self.kind {
            StepKind::Composite { substeps } => substeps,
            StepKind::Atomic { .. } => &[],
        }
    }

    pub fn tool_id(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Atomic { tool_id } => tool_id.as_deref(),
            StepKind::Composite { .. } => None,
        }
    }
}
