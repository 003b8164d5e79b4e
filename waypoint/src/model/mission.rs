//! Root containers: mission, workflow, stages, and the hop lifecycle.

use serde::{Deserialize, Serialize};

use crate::model::mapping::Mapping;
use crate::model::step::Step;
use crate::model::variable::Variable;

/// A named grouping of sibling top-level steps with its own local scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Vec<Variable>,
    #[serde(default)]
    pub input_mappings: Vec<Mapping>,
    #[serde(default)]
    pub output_mappings: Vec<Mapping>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Ordered sequence of stages plus the workflow's own local scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Vec<Variable>,
    #[serde(default)]
    pub input_mappings: Vec<Mapping>,
    #[serde(default)]
    pub output_mappings: Vec<Mapping>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Active,
    Complete,
}

/// Which artifact is currently presented for user review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollabArea {
    Idle,
    MissionProposal,
    HopProposal,
    HopImplementationProposal,
    LiveHop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopStatus {
    ReadyToResolve,
    ReadyToExecute,
    Running,
    AllHopsComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One tool invocation tracked inside a hop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStep {
    pub id: String,
    pub name: String,
    pub tool_id: String,
    pub status: ToolStepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Coarse unit of proposed-and-executed work, roughly one stage's worth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub status: HopStatus,
    /// True for the hop whose completion completes the mission.
    #[serde(default)]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tool_steps: Vec<ToolStep>,
}

/// Root container: goal, success criteria, mission-scope variables, one
/// workflow, and the coarse hop lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub goal: String,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub state: Vec<Variable>,
    pub workflow: Workflow,
    pub status: MissionStatus,
    pub collab_area: CollabArea,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hop: Option<Hop>,
    #[serde(default)]
    pub hop_history: Vec<Hop>,
}

/// Minimal mission used when seeding a fresh `.waypoint/` layout.
pub fn default_mission() -> Mission {
    Mission {
        id: "mission".to_string(),
        goal: "Top-level goal (edit .waypoint/mission.json)".to_string(),
        success_criteria: Vec::new(),
        state: Vec::new(),
        workflow: Workflow {
            id: "workflow".to_string(),
            name: "Workflow".to_string(),
            state: Vec::new(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
            stages: Vec::new(),
        },
        status: MissionStatus::Active,
        collab_area: CollabArea::Idle,
        current_hop: None,
        hop_history: Vec::new(),
    }
}
