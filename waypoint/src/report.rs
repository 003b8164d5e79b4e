//! Human-readable status report rendered from a mission snapshot.

use anyhow::{anyhow, Context, Result};
use minijinja::{context, Environment};
use serde::Serialize;

use crate::core::index::MissionIndex;
use crate::core::status::{derive_step_status, is_step_ready};
use crate::model::mission::{HopStatus, Mission, ToolStepStatus};
use crate::model::step::{Step, StepStatus};
use crate::model::variable::{IoType, VariableStatus};

const REPORT_TEMPLATE: &str = include_str!("templates/report.md");

#[derive(Debug, Clone, Serialize)]
struct StepRow {
    id: String,
    name: String,
    status: StepStatus,
    ready: bool,
}

#[derive(Debug, Clone, Serialize)]
struct StageRow {
    id: String,
    name: String,
    steps: Vec<StepRow>,
}

#[derive(Debug, Clone, Serialize)]
struct ToolStepRow {
    name: String,
    status: ToolStepStatus,
}

#[derive(Debug, Clone, Serialize)]
struct HopRow {
    id: String,
    status: HopStatus,
    error: Option<String>,
    tool_steps: Vec<ToolStepRow>,
}

#[derive(Debug, Clone, Serialize)]
struct VariableRow {
    id: String,
    name: String,
    status: VariableStatus,
}

/// Render the status report for a snapshot. Deterministic for a given
/// mission value.
pub fn render_report(mission: &Mission) -> Result<String> {
    let index = MissionIndex::build(mission).map_err(|err| anyhow!(err))?;

    let stages: Vec<StageRow> = mission
        .workflow
        .stages
        .iter()
        .map(|stage| StageRow {
            id: stage.id.clone(),
            name: stage.name.clone(),
            steps: stage
                .steps
                .iter()
                .map(|step| step_row(step, &index))
                .collect(),
        })
        .collect();

    let hop = mission.current_hop.as_ref().map(|hop| HopRow {
        id: hop.id.clone(),
        status: hop.status,
        error: hop.error.clone(),
        tool_steps: hop
            .tool_steps
            .iter()
            .map(|tool_step| ToolStepRow {
                name: tool_step.name.clone(),
                status: tool_step.status,
            })
            .collect(),
    });

    let root_inputs: Vec<VariableRow> = mission
        .state
        .iter()
        .chain(mission.workflow.state.iter())
        .filter(|variable| variable.io_type == IoType::Input)
        .map(|variable| VariableRow {
            id: variable.id.clone(),
            name: variable.name.clone(),
            status: variable.status,
        })
        .collect();

    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)
        .context("report template should be valid")?;
    let template = env.get_template("report")?;
    let rendered = template.render(context! {
        goal => mission.goal,
        status => mission.status,
        collab_area => mission.collab_area,
        hop => hop,
        stages => stages,
        root_inputs => root_inputs,
        completed_hops => mission.hop_history.len(),
    })?;
    Ok(rendered)
}

fn step_row(step: &Step, index: &MissionIndex) -> StepRow {
    StepRow {
        id: step.id.clone(),
        name: step.name.clone(),
        status: derive_step_status(step, index),
        ready: is_step_ready(step, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        atomic_step, hop_with_tool_steps, mission_with_stages, stage_with_steps, tool_step,
        variable,
    };

    /// The report names the goal, every stage, and derived step statuses.
    #[test]
    fn report_lists_stages_and_derived_statuses() {
        let mut mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b")],
        )]);
        mission.goal = "Ship the release".to_string();
        mission.state.push(variable("v1", IoType::Input));

        let rendered = render_report(&mission).expect("render");
        assert!(rendered.contains("Ship the release"));
        assert!(rendered.contains("s1"));
        // No tool selected yet, so both steps derive unresolved.
        assert!(rendered.contains("(a): unresolved"));
        assert!(rendered.contains("(b): unresolved"));
        assert!(rendered.contains("v1 name (v1): pending"));
    }

    /// The current hop section appears only when a hop is live.
    #[test]
    fn report_includes_live_hop() {
        let mut mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a")],
        )]);
        assert!(!render_report(&mission).expect("render").contains("Current hop"));

        mission.current_hop = Some(hop_with_tool_steps("hop-1", vec![tool_step("t1")]));
        let rendered = render_report(&mission).expect("render");
        assert!(rendered.contains("Current hop: hop-1"));
        assert!(rendered.contains("t1 name: pending"));
    }
}
