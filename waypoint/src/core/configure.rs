//! Applying user edits to a step: tool selection, mapping choices, and
//! recording produced output.

use serde_json::Value;

use crate::core::apply::{apply_output, OutputBinding};
use crate::model::mapping::{Mapping, MergeOp};
use crate::model::step::{Step, StepKind, StepStatus};
use crate::model::tool::ToolSpec;
use crate::model::variable::{IoType, Variable};

/// Select `tool` on an atomic step.
///
/// Replaces the step's parameter mappings with the tool's declared inputs
/// (unbound) and creates one pending output variable plus production
/// mapping per declared output. Variables created by a previously selected
/// tool are dropped.
pub fn select_tool(step: &mut Step, tool: &ToolSpec) -> Result<(), String> {
    let StepKind::Atomic { tool_id } = &mut step.kind else {
        return Err(format!(
            "step '{}' is composite; tools attach to atomic steps",
            step.id
        ));
    };
    *tool_id = Some(tool.id.clone());

    step.input_mappings = tool
        .inputs
        .iter()
        .map(|param| Mapping::parameter(&param.name, param.schema.clone(), param.required))
        .collect();

    step.state.retain(|variable| variable.io_type != IoType::Output);
    step.output_mappings.clear();
    for output in &tool.outputs {
        let variable_id = format!("{}.{}", step.id, output.name);
        step.state.push(Variable::new(
            &variable_id,
            &output.name,
            output.schema.clone(),
            IoType::Output,
            &step.id,
        ));
        step.output_mappings
            .push(Mapping::output(&variable_id, MergeOp::Assign));
    }
    step.status = StepStatus::Unresolved;
    Ok(())
}

/// Bind an available input variable to one of the step's tool parameters.
pub fn bind_parameter(
    step: &mut Step,
    parameter: &str,
    source_variable_id: &str,
) -> Result<(), String> {
    let mapping = step
        .input_mappings
        .iter_mut()
        .find(|mapping| {
            mapping
                .target_parameter()
                .is_some_and(|(name, _, _)| name == parameter)
        })
        .ok_or_else(|| format!("step '{}' has no parameter '{}'", step.id, parameter))?;
    mapping.source_variable_id = Some(source_variable_id.to_string());
    Ok(())
}

/// Fold a produced tool output onto the step's variable `variable_id`
/// through its production mapping.
///
/// An unhandled merge operation marks the variable as errored and reports
/// the failure so callers can surface it instead of silently dropping data.
pub fn record_output(step: &mut Step, variable_id: &str, new_value: &Value) -> Result<(), String> {
    let mapping = step
        .output_mappings
        .iter()
        .find(|mapping| mapping.target_variable_id() == Some(variable_id))
        .cloned();
    let variable = step
        .state
        .iter_mut()
        .find(|variable| variable.id == variable_id)
        .ok_or_else(|| format!("step '{}' has no variable '{}'", step.id, variable_id))?;

    let binding = match &mapping {
        Some(mapping) => OutputBinding::Mapping(mapping),
        None => OutputBinding::Name(variable_id),
    };
    match apply_output(variable, &binding, new_value) {
        Some(next_value) => {
            variable.assign(next_value);
            Ok(())
        }
        None => {
            let message = format!(
                "unhandled merge operation on variable '{}'",
                variable_id
            );
            variable.fail(&message);
            Err(message)
        }
    }
}
