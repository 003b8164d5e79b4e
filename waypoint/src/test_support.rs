//! Test-only helpers for constructing deterministic mission trees.

use serde_json::Value;

use crate::model::mission::{
    default_mission, Hop, HopStatus, Mission, Stage, ToolStep, ToolStepStatus,
};
use crate::model::schema::{Schema, SchemaType};
use crate::model::step::Step;
use crate::model::variable::{IoType, Variable};

/// Create a pending scalar-string variable with deterministic defaults.
pub fn variable(id: &str, io_type: IoType) -> Variable {
    Variable::new(
        id,
        format!("{} name", id),
        Schema::scalar(SchemaType::String),
        io_type,
        "origin",
    )
}

/// Create a ready variable carrying `value`.
pub fn ready_variable(id: &str, io_type: IoType, value: Value) -> Variable {
    let mut var = variable(id, io_type);
    var.assign(value);
    var
}

/// Create a ready output variable originating from `origin_node_id`.
pub fn output_of(id: &str, origin_node_id: &str) -> Variable {
    let mut var = Variable::new(
        id,
        format!("{} name", id),
        Schema::scalar(SchemaType::String),
        IoType::Output,
        origin_node_id,
    );
    var.assign(Value::String(format!("{} value", id)));
    var
}

/// Create an atomic step with no tool selected.
pub fn atomic_step(id: &str) -> Step {
    Step::atomic(id, format!("{} name", id))
}

/// Create a composite step over `substeps`.
pub fn composite_step(id: &str, substeps: Vec<Step>) -> Step {
    Step::composite(id, format!("{} name", id), substeps)
}

/// Create a stage holding `steps` with deterministic defaults.
pub fn stage_with_steps(id: &str, steps: Vec<Step>) -> Stage {
    Stage {
        id: id.to_string(),
        name: format!("{} name", id),
        state: Vec::new(),
        input_mappings: Vec::new(),
        output_mappings: Vec::new(),
        steps,
    }
}

/// Create a mission whose workflow holds `stages`.
pub fn mission_with_stages(stages: Vec<Stage>) -> Mission {
    let mut mission = default_mission();
    mission.workflow.stages = stages;
    mission
}

/// Create a pending tool step.
pub fn tool_step(id: &str) -> ToolStep {
    ToolStep {
        id: id.to_string(),
        name: format!("{} name", id),
        tool_id: format!("tool-{}", id),
        status: ToolStepStatus::Pending,
        error: None,
    }
}

/// Create a hop with the given tool steps, ready to execute.
pub fn hop_with_tool_steps(id: &str, tool_steps: Vec<ToolStep>) -> Hop {
    Hop {
        id: id.to_string(),
        description: format!("{} description", id),
        status: HopStatus::ReadyToExecute,
        is_final: false,
        error: None,
        tool_steps,
    }
}
