//! Coarse mission-level state machine over proposal, acceptance, execution,
//! completion and retry.
//!
//! Every transition is an atomic, idempotent, copy-on-write replacement of
//! the whole mission value. Transitions that reference a hop id are guarded
//! against the live hop's id; mismatches are ignored in full, never applied
//! partially. The same guard doubles as the cancellation mechanism for
//! superseded event streams.

use serde::{Deserialize, Serialize};

use crate::model::mission::{
    CollabArea, Hop, HopStatus, Mission, MissionStatus, ToolStepStatus,
};

/// Events folded into the mission by the reducer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MissionAction {
    AcceptMissionProposal,
    AcceptHopProposal { hop: Hop },
    AcceptHopImplementation { hop: Hop },
    AcceptHopComplete,
    StartExecution { hop_id: String },
    CompleteExecution { hop_id: String },
    FailExecution { hop_id: String, error: String },
    RetryExecution { hop_id: String },
}

/// Apply one action, returning the replacement mission.
pub fn reduce(mission: &Mission, action: &MissionAction) -> Mission {
    let mut next = mission.clone();
    match action {
        MissionAction::AcceptMissionProposal => {
            next.status = MissionStatus::Active;
            next.collab_area = CollabArea::Idle;
        }
        MissionAction::AcceptHopProposal { hop } => {
            let mut hop = hop.clone();
            hop.status = HopStatus::ReadyToResolve;
            next.current_hop = Some(hop);
            next.collab_area = CollabArea::Idle;
        }
        MissionAction::AcceptHopImplementation { hop } => {
            let mut hop = hop.clone();
            hop.status = HopStatus::ReadyToExecute;
            next.current_hop = Some(hop);
            next.collab_area = CollabArea::Idle;
        }
        MissionAction::AcceptHopComplete => {
            if let Some(mut hop) = next.current_hop.take() {
                hop.status = HopStatus::AllHopsComplete;
                for tool_step in &mut hop.tool_steps {
                    tool_step.status = ToolStepStatus::Completed;
                }
                if hop.is_final {
                    next.status = MissionStatus::Complete;
                }
                next.hop_history.push(hop);
            }
            next.collab_area = CollabArea::Idle;
        }
        MissionAction::StartExecution { hop_id } => {
            if let Some(hop) = live_hop_mut(&mut next, hop_id) {
                hop.status = HopStatus::Running;
                if let Some(first) = hop
                    .tool_steps
                    .iter_mut()
                    .find(|tool_step| tool_step.status == ToolStepStatus::Pending)
                {
                    first.status = ToolStepStatus::Running;
                }
            }
        }
        MissionAction::CompleteExecution { hop_id } => {
            let live = next
                .current_hop
                .as_ref()
                .is_some_and(|hop| hop.id == *hop_id);
            if live {
                if let Some(mut hop) = next.current_hop.take() {
                    hop.status = HopStatus::AllHopsComplete;
                    hop.error = None;
                    for tool_step in &mut hop.tool_steps {
                        tool_step.status = ToolStepStatus::Completed;
                    }
                    next.hop_history.push(hop);
                }
            }
        }
        MissionAction::FailExecution { hop_id, error } => {
            if let Some(hop) = live_hop_mut(&mut next, hop_id) {
                hop.status = HopStatus::ReadyToExecute;
                hop.error = Some(error.clone());
                for tool_step in &mut hop.tool_steps {
                    tool_step.status = ToolStepStatus::Failed;
                }
            }
        }
        MissionAction::RetryExecution { hop_id } => {
            if let Some(hop) = live_hop_mut(&mut next, hop_id) {
                hop.status = HopStatus::ReadyToExecute;
                hop.error = None;
                for tool_step in &mut hop.tool_steps {
                    tool_step.status = ToolStepStatus::Pending;
                    tool_step.error = None;
                }
            }
        }
    }
    next
}

/// The live current hop, only if its id matches. Stale ids fall through to
/// a no-op.
fn live_hop_mut<'a>(mission: &'a mut Mission, hop_id: &str) -> Option<&'a mut Hop> {
    mission
        .current_hop
        .as_mut()
        .filter(|hop| hop.id == hop_id)
}
