//! Workflow instance domain models
//!
//! A workflow instance tracks one entity's passage through a configured
//! pipeline: its current stage, status, the approvals collected at the
//! current stage, and an append-only history of every transition. The
//! instance exclusively owns its history; nothing mutates it from
//! outside the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trellis_access::Role;

/// Lifecycle status of a workflow instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Under review.
    Active,
    /// Terminal: every stage approved.
    Approved,
    /// Terminal: rejected or killed.
    Rejected,
    /// Routed back to the draft stage for rework.
    RevisionRequested,
}

impl WorkflowStatus {
    /// Check whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Approved | WorkflowStatus::Rejected)
    }

    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Active => "active",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::RevisionRequested => "revision_requested",
        }
    }
}

/// Action an actor can take on a workflow instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Approve the current stage.
    Approve,
    /// Reject the workflow; terminal from any non-terminal stage.
    Reject,
    /// Route the entity back to the draft stage for rework.
    RequestRevision,
    /// Emergency disable; forces terminal rejection, bypassing all other
    /// rules, and only available when the entity's kill switch is armed.
    Kill,
}

impl WorkflowAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::RequestRevision => "request_revision",
            WorkflowAction::Kill => "kill",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Returns
    ///
    /// `Some(WorkflowAction)` if valid, `None` otherwise; API layers map
    /// `None` to a validation error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Some(WorkflowAction::Approve),
            "reject" => Some(WorkflowAction::Reject),
            "request_revision" => Some(WorkflowAction::RequestRevision),
            "kill" => Some(WorkflowAction::Kill),
            _ => None,
        }
    }
}

/// The actor performing a workflow action.
///
/// Identity is supplied by the caller; authenticating it is the job of
/// the surrounding API layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    /// Actor's user id.
    pub id: Uuid,
    /// Role the actor acts under.
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// One entry in an instance's append-only history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Stage the action was taken at.
    pub stage: String,

    /// Role the actor acted under.
    pub actor_role: Role,

    /// Actor's user id.
    pub actor_id: Uuid,

    /// Action taken.
    pub action: WorkflowAction,

    /// Distinguishing reason, e.g. "kill_switch", or a reviewer comment.
    pub reason: Option<String>,

    /// When the action was recorded.
    pub timestamp: DateTime<Utc>,
}

/// One entity's passage through a workflow configuration.
///
/// Mutated only via orchestrator transition calls. `stage_version`
/// increments on every committed transition and is the optimistic
/// concurrency token callers must echo back on `advance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowInstance {
    /// Unique instance id.
    pub id: Uuid,

    /// Tenant the instance belongs to.
    pub tenant_id: Uuid,

    /// Entity under review.
    pub entity_id: Uuid,

    /// Name of the workflow configuration driving this instance.
    pub config_name: String,

    /// Current stage name; a declared stage while non-terminal, or one
    /// of the reserved terminal names afterwards.
    pub current_stage: String,

    /// Lifecycle status.
    pub status: WorkflowStatus,

    /// Optimistic concurrency token; increments on every transition.
    pub stage_version: u64,

    /// Whether the owning entity has its kill switch armed, captured at
    /// start. Gates the `kill` action.
    pub kill_switch_enabled: bool,

    /// Actor ids that have approved the current stage. Cleared whenever
    /// the stage changes.
    #[serde(default)]
    pub approvals: Vec<Uuid>,

    /// Append-only transition history.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    /// When the instance was created.
    pub created_at: DateTime<Utc>,

    /// When the instance last transitioned.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowInstance {
    /// Create a new active instance at the given first stage.
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant the instance belongs to
    /// * `entity_id` - Entity under review
    /// * `config_name` - Workflow configuration name
    /// * `first_stage` - Name of the configuration's first stage
    /// * `kill_switch_enabled` - Whether the entity's kill switch is armed
    pub fn new(
        tenant_id: Uuid,
        entity_id: Uuid,
        config_name: impl Into<String>,
        first_stage: impl Into<String>,
        kill_switch_enabled: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            entity_id,
            config_name: config_name.into(),
            current_stage: first_stage.into(),
            status: WorkflowStatus::Active,
            stage_version: 0,
            kill_switch_enabled,
            approvals: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the instance has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check whether an actor's approval is already recorded for the
    /// current stage.
    pub fn has_approval_from(&self, actor_id: Uuid) -> bool {
        self.approvals.contains(&actor_id)
    }

    /// Append a history entry and bump `updated_at`.
    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        self.updated_at = entry.timestamp;
        self.history.push(entry);
    }
}
