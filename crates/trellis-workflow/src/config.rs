//! Workflow configuration models
//!
//! A workflow configuration declares the ordered review stages an entity
//! passes through, who approves at each stage, and which layout renders
//! there. Configurations are validated before any instance is started.

use serde::{Deserialize, Serialize};

use trellis_access::Role;
use trellis_fields::EntityType;

use crate::error::{WorkflowError, WorkflowResult};

/// Reserved name of the terminal approved state.
pub const STAGE_APPROVED: &str = "approved";

/// Reserved name of the terminal rejected state.
pub const STAGE_REJECTED: &str = "rejected";

/// How a stage collects approvals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// The first qualifying approval advances the stage.
    Single,
    /// Every required approver must approve before the stage advances;
    /// partial approvals are recorded without moving.
    AllOfRole,
    /// Any one member of the assigned role advances the stage.
    AnyOfRole,
}

impl ApprovalMode {
    /// Get the string representation of the approval mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalMode::Single => "single",
            ApprovalMode::AllOfRole => "all_of_role",
            ApprovalMode::AnyOfRole => "any_of_role",
        }
    }

    /// Parse approval mode from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(ApprovalMode::Single),
            "all_of_role" | "all-of-role" => Some(ApprovalMode::AllOfRole),
            "any_of_role" | "any-of-role" => Some(ApprovalMode::AnyOfRole),
            _ => None,
        }
    }
}

/// Reference to the layout rendered at a stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutRef {
    /// Request type selecting the layout.
    pub request_type: String,
    /// Workflow stage selecting the layout.
    pub workflow_stage: String,
}

impl LayoutRef {
    /// Create a layout reference.
    pub fn new(request_type: impl Into<String>, workflow_stage: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            workflow_stage: workflow_stage.into(),
        }
    }
}

/// One review stage in a workflow configuration.
///
/// # Examples
///
/// ```
/// use trellis_access::Role;
/// use trellis_workflow::{ApprovalMode, LayoutRef, StageDef};
///
/// let stage = StageDef::new(
///     "security",
///     Role::SecurityReviewer,
///     LayoutRef::new("agent_onboarding", "security"),
/// )
/// .with_approval_mode(ApprovalMode::AllOfRole)
/// .with_required_approvals(2);
/// assert_eq!(stage.required_approvals, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageDef {
    /// Stage name, unique within the configuration.
    pub name: String,

    /// Role whose members approve at this stage.
    pub assigned_role: Role,

    /// Layout rendered for this stage.
    pub layout: LayoutRef,

    /// How approvals are collected.
    pub approval_mode: ApprovalMode,

    /// Number of distinct approvers required under
    /// [`ApprovalMode::AllOfRole`]. Ignored by the other modes.
    #[serde(default = "default_required_approvals")]
    pub required_approvals: u32,
}

fn default_required_approvals() -> u32 {
    1
}

impl StageDef {
    /// Create a single-approval stage.
    ///
    /// # Arguments
    ///
    /// * `name` - Stage name, unique within the configuration
    /// * `assigned_role` - Role whose members approve here
    /// * `layout` - Layout rendered for this stage
    pub fn new(name: impl Into<String>, assigned_role: Role, layout: LayoutRef) -> Self {
        Self {
            name: name.into(),
            assigned_role,
            layout,
            approval_mode: ApprovalMode::Single,
            required_approvals: 1,
        }
    }

    /// Set the approval mode.
    pub fn with_approval_mode(mut self, mode: ApprovalMode) -> Self {
        self.approval_mode = mode;
        self
    }

    /// Set the required approver count (meaningful for all_of_role).
    pub fn with_required_approvals(mut self, count: u32) -> Self {
        self.required_approvals = count;
        self
    }
}

/// Ordered review pipeline for one entity type.
///
/// The declared stages form a linear chain; the always-present terminals
/// `approved` and `rejected` and the single revision back edge to the
/// configured draft stage complete the state graph.
///
/// # Examples
///
/// ```
/// use trellis_access::Role;
/// use trellis_fields::EntityType;
/// use trellis_workflow::{LayoutRef, StageDef, WorkflowConfiguration};
///
/// let config = WorkflowConfiguration::new("agent_onboarding", EntityType::Agent, "draft")
///     .with_stage(StageDef::new(
///         "draft",
///         Role::VendorUser,
///         LayoutRef::new("agent_onboarding", "draft"),
///     ))
///     .with_stage(StageDef::new(
///         "security",
///         Role::SecurityReviewer,
///         LayoutRef::new("agent_onboarding", "security"),
///     ));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowConfiguration {
    /// Configuration name; instances reference it.
    pub name: String,

    /// Entity type this workflow reviews.
    pub entity_type: EntityType,

    /// Review stages in pipeline order.
    pub stages: Vec<StageDef>,

    /// Non-terminal stage revision requests route back to.
    pub draft_stage: String,
}

impl WorkflowConfiguration {
    /// Create a configuration with no stages.
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        draft_stage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type,
            stages: Vec::new(),
            draft_stage: draft_stage.into(),
        }
    }

    /// Add a stage to the end of the pipeline.
    pub fn with_stage(mut self, stage: StageDef) -> Self {
        self.stages.push(stage);
        self
    }

    /// Validate the configuration.
    ///
    /// Checks that stages exist, stage names are unique and do not use
    /// the reserved terminal names, the draft stage is declared, and
    /// all_of_role stages require at least one approver.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Configuration`] describing the first
    /// violation found.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.stages.is_empty() {
            return Err(WorkflowError::Configuration(format!(
                "workflow '{}' declares no stages",
                self.name
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for stage in &self.stages {
            if stage.name == STAGE_APPROVED || stage.name == STAGE_REJECTED {
                return Err(WorkflowError::Configuration(format!(
                    "stage name '{}' is reserved for a terminal state",
                    stage.name
                )));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(WorkflowError::Configuration(format!(
                    "duplicate stage name '{}' in workflow '{}'",
                    stage.name, self.name
                )));
            }
            if stage.approval_mode == ApprovalMode::AllOfRole && stage.required_approvals == 0 {
                return Err(WorkflowError::Configuration(format!(
                    "stage '{}' uses all_of_role with zero required approvals",
                    stage.name
                )));
            }
        }

        // Revision loops must target a declared (hence non-terminal) stage.
        if self.stage(&self.draft_stage).is_none() {
            return Err(WorkflowError::Configuration(format!(
                "draft stage '{}' is not declared in workflow '{}'",
                self.draft_stage, self.name
            )));
        }

        Ok(())
    }

    /// Get the first stage of the pipeline.
    pub fn first_stage(&self) -> WorkflowResult<&StageDef> {
        self.stages.first().ok_or_else(|| {
            WorkflowError::Configuration(format!("workflow '{}' declares no stages", self.name))
        })
    }

    /// Look up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageDef> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Get the stage after `name` in pipeline order, or `None` when
    /// `name` is the last stage.
    pub fn next_stage(&self, name: &str) -> Option<&StageDef> {
        let idx = self.stages.iter().position(|s| s.name == name)?;
        self.stages.get(idx + 1)
    }
}
