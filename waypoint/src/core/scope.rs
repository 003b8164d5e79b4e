//! Visibility of previously produced values for a given node.
//!
//! A variable is visible to a node iff it was produced by a node that is
//! guaranteed, by declared ordering, to have already run by the time this
//! node runs: an ancestor, an earlier sibling at any ancestor level, or a
//! root input. Values bubbled up as a parent's own output via
//! `is_parent_output` are not offered a second time at the owner's depth.

use std::collections::HashSet;

use tracing::debug;

use crate::core::index::{MissionIndex, ScopeRef};
use crate::model::mission::Mission;
use crate::model::variable::{IoType, Variable};

/// Compute the variables legally available as inputs to `node_id`.
///
/// The result is ordered (root inputs, then ancestor outputs root-down,
/// then ancestor prior-sibling outputs, then the node's own prior-sibling
/// outputs) and deduplicated by variable id, first occurrence winning.
///
/// Fails fast on a malformed tree (unknown or duplicate node ids, cyclic
/// ancestry) rather than looping.
pub fn available_inputs(mission: &Mission, node_id: &str) -> Result<Vec<Variable>, String> {
    let index = MissionIndex::build(mission)?;
    if index.get(node_id).is_none() {
        return Err(format!("unknown node id '{}'", node_id));
    }

    let mut seen = HashSet::new();
    let mut available = Vec::new();

    // Root inputs are visible everywhere.
    for variable in mission.state.iter().chain(mission.workflow.state.iter()) {
        if variable.io_type == IoType::Input {
            push_unique(&mut available, &mut seen, variable);
        }
    }

    let ancestors = index.ancestors(node_id)?;
    for ancestor in &ancestors {
        push_outputs(*ancestor, &mut available, &mut seen);
    }
    for ancestor in &ancestors {
        for sibling in index.prior_siblings(ancestor.id()) {
            push_outputs(sibling, &mut available, &mut seen);
        }
    }
    for sibling in index.prior_siblings(node_id) {
        push_outputs(sibling, &mut available, &mut seen);
    }

    debug!(
        node = node_id,
        count = available.len(),
        "resolved available inputs"
    );
    Ok(available)
}

fn push_outputs(scope: ScopeRef, available: &mut Vec<Variable>, seen: &mut HashSet<String>) {
    for variable in scope.state() {
        if variable.io_type != IoType::Output {
            continue;
        }
        if bubbled_to_parent(scope, &variable.id) {
            continue;
        }
        push_unique(available, seen, variable);
    }
}

/// True if the variable's production mapping re-exports it as the owner's
/// own output, removing it from ordinary visibility at this depth.
fn bubbled_to_parent(scope: ScopeRef, variable_id: &str) -> bool {
    scope.output_mappings().iter().any(|mapping| {
        mapping.is_parent_output
            && (mapping.target_variable_id() == Some(variable_id)
                || mapping.bound_source() == Some(variable_id))
    })
}

fn push_unique(available: &mut Vec<Variable>, seen: &mut HashSet<String>, variable: &Variable) {
    if seen.insert(variable.id.clone()) {
        available.push(variable.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mapping::{Mapping, MergeOp};
    use crate::test_support::{
        atomic_step, mission_with_stages, output_of, stage_with_steps, variable,
    };

    fn ids(variables: &[Variable]) -> Vec<&str> {
        variables.iter().map(|var| var.id.as_str()).collect()
    }

    /// A node with no ancestors producing outputs and no prior siblings
    /// sees only root inputs.
    #[test]
    fn first_step_sees_only_root_inputs() {
        let mut mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b")],
        )]);
        mission.state.push(variable("mission-in", IoType::Input));
        mission
            .workflow
            .state
            .push(variable("workflow-in", IoType::Input));
        mission
            .workflow
            .state
            .push(variable("workflow-out", IoType::Output));

        let available = available_inputs(&mission, "a").expect("inputs");
        // workflow-out is an ancestor output, so it is visible too; the
        // mission-level output set is empty here.
        assert_eq!(ids(&available), vec!["mission-in", "workflow-in", "workflow-out"]);
    }

    /// Ancestor outputs are visible to descendants.
    #[test]
    fn ancestor_outputs_are_visible() {
        let mut stage = stage_with_steps("s1", vec![atomic_step("a")]);
        stage.state.push(output_of("stage-out", "s1"));
        let mission = mission_with_stages(vec![stage]);

        let available = available_inputs(&mission, "a").expect("inputs");
        assert_eq!(ids(&available), vec!["stage-out"]);
    }

    /// Prior-sibling outputs are visible; later siblings' outputs are not.
    #[test]
    fn only_prior_sibling_outputs_are_visible() {
        let mut first = atomic_step("a");
        first.state.push(output_of("a-out", "a"));
        let middle = atomic_step("b");
        let mut last = atomic_step("c");
        last.state.push(output_of("c-out", "c"));
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![first, middle, last])]);

        let available = available_inputs(&mission, "b").expect("inputs");
        assert_eq!(ids(&available), vec!["a-out"]);
    }

    /// Outputs of an earlier stage are visible to steps of a later stage
    /// (prior siblings of an ancestor).
    #[test]
    fn earlier_stage_outputs_are_visible_downstream() {
        let mut first_stage = stage_with_steps("s1", vec![atomic_step("a")]);
        first_stage.state.push(output_of("s1-out", "s1"));
        let second_stage = stage_with_steps("s2", vec![atomic_step("b")]);
        let mission = mission_with_stages(vec![first_stage, second_stage]);

        let available = available_inputs(&mission, "b").expect("inputs");
        assert_eq!(ids(&available), vec!["s1-out"]);
    }

    /// A variable whose production mapping is flagged `is_parent_output`
    /// is not offered at the owner's depth.
    #[test]
    fn parent_output_variables_are_suppressed() {
        let mut first = atomic_step("a");
        first.state.push(output_of("a-out", "a"));
        first.state.push(output_of("a-bubbled", "a"));
        let mut bubbled = Mapping::output("a-bubbled", MergeOp::Assign);
        bubbled.is_parent_output = true;
        first.output_mappings.push(bubbled);
        let second = atomic_step("b");
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![first, second])]);

        let available = available_inputs(&mission, "b").expect("inputs");
        assert_eq!(ids(&available), vec!["a-out"]);
    }

    /// Duplicate ids are deduplicated, first occurrence winning.
    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b")],
        )]);
        mission.state.push(variable("shared", IoType::Input));
        let mut sibling_copy = output_of("shared", "a");
        sibling_copy.name = "sibling copy".to_string();
        mission.workflow.stages[0].steps[0].state.push(sibling_copy);

        let available = available_inputs(&mission, "b").expect("inputs");
        assert_eq!(ids(&available), vec!["shared"]);
        assert_eq!(available[0].name, "shared name");
    }

    /// A malformed tree (duplicate node ids) fails fast instead of looping.
    #[test]
    fn malformed_tree_fails_fast() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("a")],
        )]);
        let err = available_inputs(&mission, "a").expect_err("should fail");
        assert!(err.contains("duplicate node id"));
    }

    /// Unknown node ids are an error, not an empty result.
    #[test]
    fn unknown_node_is_an_error() {
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![atomic_step("a")])]);
        let err = available_inputs(&mission, "missing").expect_err("should fail");
        assert!(err.contains("unknown node id 'missing'"));
    }
}
