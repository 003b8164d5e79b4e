//! Derived execution status, recomputed from structure on every query.
//!
//! The deriver is a pure recursive fold: it only ever downgrades a step
//! toward `Unresolved`/`PendingInputsReady` based on structural facts, and
//! never upgrades past what execution reported. A parent's status can never
//! be more advanced than its least-advanced required dependency.

use crate::core::index::{MissionIndex, ScopeRef};
use crate::model::mission::Mission;
use crate::model::step::{Step, StepKind, StepStatus};

/// Derive the status of the step with id `node_id` from a full snapshot.
pub fn derive_status(mission: &Mission, node_id: &str) -> Result<StepStatus, String> {
    let index = MissionIndex::build(mission)?;
    match index.get(node_id) {
        Some(ScopeRef::Step(step)) => Ok(derive_step_status(step, &index)),
        Some(_) => Err(format!("node '{}' is not a step", node_id)),
        None => Err(format!("unknown node id '{}'", node_id)),
    }
}

/// Derive a step's status against a prebuilt index.
pub fn derive_step_status(step: &Step, index: &MissionIndex) -> StepStatus {
    match &step.kind {
        StepKind::Atomic { tool_id } => {
            if tool_id.is_none() {
                return StepStatus::Unresolved;
            }
            if has_unbound_required_parameter(step, index) {
                return StepStatus::Unresolved;
            }
            if has_pending_bound_input(step, index) {
                return StepStatus::PendingInputsReady;
            }
            step.status
        }
        StepKind::Composite { substeps } => {
            if substeps.len() < 2 {
                return StepStatus::Unresolved;
            }
            let children: Vec<StepStatus> = substeps
                .iter()
                .map(|child| derive_step_status(child, index))
                .collect();
            if children.contains(&StepStatus::Unresolved) {
                return StepStatus::Unresolved;
            }
            if children.contains(&StepStatus::PendingInputsReady) {
                return StepStatus::PendingInputsReady;
            }
            step.status
        }
    }
}

/// True iff the step could start now: all required inputs mapped and ready,
/// and (atomic) a tool assigned, or (composite) at least two children all
/// individually ready.
pub fn is_step_ready(step: &Step, index: &MissionIndex) -> bool {
    match &step.kind {
        StepKind::Atomic { tool_id } => {
            tool_id.is_some()
                && !has_unbound_required_parameter(step, index)
                && !has_pending_bound_input(step, index)
        }
        StepKind::Composite { substeps } => {
            substeps.len() >= 2 && substeps.iter().all(|child| is_step_ready(child, index))
        }
    }
}

fn has_unbound_required_parameter(step: &Step, index: &MissionIndex) -> bool {
    step.input_mappings.iter().any(|mapping| {
        match mapping.target_parameter() {
            Some((_, _, required)) => {
                required
                    && mapping
                        .bound_source()
                        .and_then(|id| index.variable(id))
                        .is_none()
            }
            None => false,
        }
    })
}

fn has_pending_bound_input(step: &Step, index: &MissionIndex) -> bool {
    step.input_mappings.iter().any(|mapping| {
        mapping.target_parameter().is_some()
            && mapping
                .bound_source()
                .and_then(|id| index.variable(id))
                .is_some_and(|variable| !variable.is_ready())
    })
}
