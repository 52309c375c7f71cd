//! Workflow stage machine
//!
//! All legal transitions live in this one module as an explicit
//! (status × action) evaluation; anything not covered is an error,
//! never a silent no-op. Evaluation is pure: it inspects a configuration
//! and an instance and returns the transition to apply, without touching
//! either.
//!
//! Transition table (non-terminal instance, authorized actor):
//!
//! | action            | result                                              |
//! |-------------------|-----------------------------------------------------|
//! | approve           | next stage, or terminal `approved` after the last   |
//! | approve (all_of_role, quorum not met) | approval recorded, stage unchanged |
//! | reject            | terminal `rejected`                                 |
//! | request_revision  | back edge to the configured draft stage             |
//! | kill              | terminal `rejected` with reason "kill_switch"       |
//!
//! `kill` is the single action that bypasses role checks and approval
//! modes; it is gated solely on the entity's kill switch being armed.

use crate::config::{ApprovalMode, StageDef, WorkflowConfiguration, STAGE_APPROVED, STAGE_REJECTED};
use crate::error::{WorkflowError, WorkflowResult};
use crate::instance::{Actor, WorkflowAction, WorkflowInstance, WorkflowStatus};

/// Reason recorded on kill-switch terminations.
pub const REASON_KILL_SWITCH: &str = "kill_switch";

/// Outcome of evaluating one action against one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// This actor's approval is already recorded; applying the action
    /// again changes nothing.
    AlreadyApproved,

    /// Approval recorded under all_of_role, quorum not yet met; the
    /// stage does not change.
    PartialApproval,

    /// The instance moves to a new stage and/or status.
    Move {
        /// Stage the instance moves to (a declared stage or a terminal).
        next_stage: String,
        /// Status after the move.
        next_status: WorkflowStatus,
        /// Distinguishing reason recorded in history, if any.
        reason: Option<String>,
    },
}

/// Evaluate an action against an instance under a configuration.
///
/// # Errors
///
/// - [`WorkflowError::Validation`] for actions on a terminal instance
/// - [`WorkflowError::Authorization`] for wrong-role actors and for
///   `kill` without an armed kill switch
/// - [`WorkflowError::Configuration`] when the instance's current stage
///   is not declared in the configuration
pub fn evaluate(
    config: &WorkflowConfiguration,
    instance: &WorkflowInstance,
    action: WorkflowAction,
    actor: &Actor,
) -> WorkflowResult<Transition> {
    if instance.is_terminal() {
        return Err(WorkflowError::Validation(format!(
            "instance {} is terminal ({})",
            instance.id,
            instance.status.as_str()
        )));
    }

    match action {
        // The kill switch bypasses role checks and approval modes, but
        // only when the owning entity has it armed.
        WorkflowAction::Kill => {
            if !instance.kill_switch_enabled {
                return Err(WorkflowError::Authorization(format!(
                    "kill switch is not enabled for entity {}",
                    instance.entity_id
                )));
            }
            Ok(Transition::Move {
                next_stage: STAGE_REJECTED.to_string(),
                next_status: WorkflowStatus::Rejected,
                reason: Some(REASON_KILL_SWITCH.to_string()),
            })
        }
        WorkflowAction::Reject => {
            authorized_stage(config, instance, actor)?;
            Ok(Transition::Move {
                next_stage: STAGE_REJECTED.to_string(),
                next_status: WorkflowStatus::Rejected,
                reason: None,
            })
        }
        WorkflowAction::RequestRevision => {
            authorized_stage(config, instance, actor)?;
            Ok(Transition::Move {
                next_stage: config.draft_stage.clone(),
                next_status: WorkflowStatus::RevisionRequested,
                reason: None,
            })
        }
        WorkflowAction::Approve => {
            let stage = authorized_stage(config, instance, actor)?;
            if stage.approval_mode == ApprovalMode::AllOfRole {
                if instance.has_approval_from(actor.id) {
                    return Ok(Transition::AlreadyApproved);
                }
                let collected = instance.approvals.len() as u32 + 1;
                if collected < stage.required_approvals {
                    return Ok(Transition::PartialApproval);
                }
            }
            Ok(advance_from(config, &instance.current_stage))
        }
    }
}

/// Look up the instance's current stage and check the actor may act at
/// it. Admin roles may act at any stage.
fn authorized_stage<'a>(
    config: &'a WorkflowConfiguration,
    instance: &WorkflowInstance,
    actor: &Actor,
) -> WorkflowResult<&'a StageDef> {
    let stage = config.stage(&instance.current_stage).ok_or_else(|| {
        WorkflowError::Configuration(format!(
            "stage '{}' is not declared in workflow '{}'",
            instance.current_stage, config.name
        ))
    })?;

    if actor.role != stage.assigned_role && !actor.role.is_admin() {
        return Err(WorkflowError::Authorization(format!(
            "role '{}' may not act at stage '{}' (assigned to '{}')",
            actor.role.as_str(),
            stage.name,
            stage.assigned_role.as_str()
        )));
    }
    Ok(stage)
}

/// Compute the move that follows a completed approval at `current`.
fn advance_from(config: &WorkflowConfiguration, current: &str) -> Transition {
    match config.next_stage(current) {
        Some(next) => Transition::Move {
            next_stage: next.name.clone(),
            next_status: WorkflowStatus::Active,
            reason: None,
        },
        None => Transition::Move {
            next_stage: STAGE_APPROVED.to_string(),
            next_status: WorkflowStatus::Approved,
            reason: None,
        },
    }
}
