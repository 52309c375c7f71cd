//! End-to-end tests for the approval workflow engine.
//!
//! These tests drive full pipelines through the orchestrator and verify
//! the interplay of stage transitions, approval quorums, optimistic
//! concurrency, permission-filtered views, and the kill switch.
//!
//! Test pipeline: draft (vendor) → security (2 × all_of_role)
//! → compliance (single) → approved/rejected.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use trellis_access::{AccessOverride, FieldAccess, PermissionResolver, PermissionStore, Role};
use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
use trellis_layout::{Layout, LayoutStore, Section, ViewGenerator};
use trellis_workflow::{
    Actor, ApprovalMode, EventSink, InMemoryInstanceStore, LayoutRef, StageDef, WorkflowAction,
    WorkflowConfiguration, WorkflowError, WorkflowEvent, WorkflowOrchestrator, WorkflowStatus,
    REASON_KILL_SWITCH, STAGE_REJECTED,
};

/// Sink that records every emitted event for assertions.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingSink {
    fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &WorkflowEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Test fixture wiring the catalog, permissions, layouts, and
/// orchestrator for an agent onboarding pipeline.
struct TestFixture {
    tenant: Uuid,
    permissions: Arc<PermissionStore>,
    sink: Arc<RecordingSink>,
    orchestrator: WorkflowOrchestrator,
}

impl TestFixture {
    fn new() -> Self {
        let registry = Arc::new(FieldRegistry::new());
        let permissions = Arc::new(PermissionStore::new());
        let layouts = Arc::new(LayoutStore::new());
        let sink = Arc::new(RecordingSink::default());
        let tenant = Uuid::now_v7();

        for (name, kind) in [
            ("name", FieldKind::Text),
            ("status", FieldKind::Select),
            ("security_notes", FieldKind::Text),
        ] {
            registry
                .register(tenant, FieldDef::new(EntityType::Agent, name, kind))
                .unwrap();
        }

        // Vendors can edit everything at draft; reviewers read everything
        // and edit their own notes field.
        permissions.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::editable());
        permissions.set_baseline(
            tenant,
            EntityType::Agent,
            Role::SecurityReviewer,
            FieldAccess::read_only(),
        );
        permissions.set_field_override(
            tenant,
            EntityType::Agent,
            "security_notes",
            Role::SecurityReviewer,
            AccessOverride::default().with_edit(true),
        );
        // Vendors never see reviewer notes.
        permissions.set_field_override(
            tenant,
            EntityType::Agent,
            "security_notes",
            Role::VendorUser,
            AccessOverride::default().with_view(false),
        );

        for stage in ["draft", "security", "compliance"] {
            layouts.set(
                tenant,
                Layout::new("agent_onboarding", stage).with_section(
                    Section::new("review", "Review", 10)
                        .with_fields(["name", "status", "security_notes"]),
                ),
            );
        }

        let orchestrator = WorkflowOrchestrator::new(
            Arc::new(InMemoryInstanceStore::new()),
            ViewGenerator::new(
                Arc::clone(&layouts),
                PermissionResolver::new(registry, Arc::clone(&permissions)),
            ),
        )
        .with_sink(Arc::clone(&sink) as Arc<dyn EventSink>);

        Self {
            tenant,
            permissions,
            sink,
            orchestrator,
        }
    }

    fn config(&self) -> WorkflowConfiguration {
        WorkflowConfiguration::new("agent_onboarding", EntityType::Agent, "draft")
            .with_stage(StageDef::new(
                "draft",
                Role::VendorUser,
                LayoutRef::new("agent_onboarding", "draft"),
            ))
            .with_stage(
                StageDef::new(
                    "security",
                    Role::SecurityReviewer,
                    LayoutRef::new("agent_onboarding", "security"),
                )
                .with_approval_mode(ApprovalMode::AllOfRole)
                .with_required_approvals(2),
            )
            .with_stage(StageDef::new(
                "compliance",
                Role::ComplianceReviewer,
                LayoutRef::new("agent_onboarding", "compliance"),
            ))
    }

    fn start(&self, kill_switch: bool) -> trellis_workflow::WorkflowInstance {
        self.orchestrator
            .start(self.tenant, Uuid::now_v7(), kill_switch, self.config())
            .expect("workflow should start")
    }
}

fn vendor() -> Actor {
    Actor::new(Uuid::now_v7(), Role::VendorUser)
}

fn security() -> Actor {
    Actor::new(Uuid::now_v7(), Role::SecurityReviewer)
}

#[test]
fn test_full_pipeline_to_approval() {
    let fx = TestFixture::new();
    let instance = fx.start(false);

    // Vendor submits the draft.
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();
    assert_eq!(instance.current_stage, "security");

    // Two security reviewers must both approve.
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, security(), 1)
        .unwrap();
    assert_eq!(instance.current_stage, "security");
    assert_eq!(instance.status, WorkflowStatus::Active);
    assert_eq!(instance.approvals.len(), 1);

    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, security(), 2)
        .unwrap();
    assert_eq!(instance.current_stage, "compliance");
    assert!(instance.approvals.is_empty());

    // Compliance sign-off completes the pipeline.
    let instance = fx
        .orchestrator
        .advance(
            instance.id,
            WorkflowAction::Approve,
            Actor::new(Uuid::now_v7(), Role::ComplianceReviewer),
            3,
        )
        .unwrap();
    assert_eq!(instance.status, WorkflowStatus::Approved);
    assert!(instance.is_terminal());
    assert_eq!(instance.stage_version, 4);
    assert_eq!(instance.history.len(), 4);

    assert_eq!(
        fx.sink.event_types(),
        vec![
            "workflow.started",
            "workflow.stage_advanced",
            "workflow.approval_recorded",
            "workflow.stage_advanced",
            "workflow.approved",
        ]
    );
}

#[test]
fn test_all_of_role_quorum() {
    // Scenario: two required approvers at "security"; the first approval
    // records without moving, the second distinct approver advances.
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    let first = security();
    let after_first = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, first, 1)
        .unwrap();
    assert_eq!(after_first.current_stage, "security");
    assert!(after_first.has_approval_from(first.id));

    let after_second = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, security(), 2)
        .unwrap();
    assert_eq!(after_second.current_stage, "compliance");
}

#[test]
fn test_repeat_approval_with_stale_version_is_noop() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    let reviewer = security();
    fx.orchestrator
        .advance(instance.id, WorkflowAction::Approve, reviewer, 1)
        .unwrap();

    // Retry with the version observed before the first call: the
    // approval is already recorded, so this no-ops instead of
    // double-applying or conflicting.
    let retried = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, reviewer, 1)
        .unwrap();
    assert_eq!(retried.current_stage, "security");
    assert_eq!(retried.approvals.len(), 1);
    assert_eq!(retried.stage_version, 2);
}

#[test]
fn test_concurrent_approvers_serialize_via_conflict() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    // Both reviewers observed stage_version 1 before acting.
    let first = security();
    let second = security();
    fx.orchestrator
        .advance(instance.id, WorkflowAction::Approve, first, 1)
        .unwrap();

    let err = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, second, 1)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict { expected: 1, actual: 2 }));
    assert_eq!(err.status_code(), 409);

    // Re-fetch-and-retry applies the second approval cleanly.
    let after_retry = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, second, 2)
        .unwrap();
    assert_eq!(after_retry.current_stage, "compliance");
}

#[test]
fn test_reject_short_circuits_remaining_stages() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    // A single reviewer rejection ends the workflow even though the
    // stage would need two approvals.
    let rejected = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Reject, security(), 1)
        .unwrap();
    assert_eq!(rejected.status, WorkflowStatus::Rejected);
    assert_eq!(rejected.current_stage, STAGE_REJECTED);
    assert!(rejected.is_terminal());

    // Terminal instances accept no further actions.
    let err = fx
        .orchestrator
        .advance(rejected.id, WorkflowAction::Approve, security(), 2)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[test]
fn test_revision_loop_back_to_draft_and_resubmit() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    let revised = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::RequestRevision, security(), 1)
        .unwrap();
    assert_eq!(revised.status, WorkflowStatus::RevisionRequested);
    assert_eq!(revised.current_stage, "draft");
    assert!(!revised.is_terminal());

    // The vendor reworks and resubmits; review restarts at security with
    // a cleared approval set.
    let resubmitted = fx
        .orchestrator
        .advance(revised.id, WorkflowAction::Approve, vendor(), 2)
        .unwrap();
    assert_eq!(resubmitted.status, WorkflowStatus::Active);
    assert_eq!(resubmitted.current_stage, "security");
    assert!(resubmitted.approvals.is_empty());
}

#[test]
fn test_kill_requires_armed_switch() {
    let fx = TestFixture::new();
    let instance = fx.start(false);

    let err = fx
        .orchestrator
        .advance(
            instance.id,
            WorkflowAction::Kill,
            Actor::new(Uuid::now_v7(), Role::PlatformAdmin),
            0,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Authorization(_)));

    // State is unchanged.
    let view = fx.orchestrator.view_for(instance.id, Role::VendorUser).unwrap();
    assert_eq!(view.workflow_stage, "draft");
}

#[test]
fn test_kill_bypasses_everything_and_records_reason() {
    let fx = TestFixture::new();
    let instance = fx.start(true);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    // A vendor user is not the security stage's assigned role, and the
    // stage needs two approvals; kill ignores both rules.
    let killed = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Kill, vendor(), 1)
        .unwrap();
    assert_eq!(killed.status, WorkflowStatus::Rejected);
    let last = killed.history.last().unwrap();
    assert_eq!(last.reason.as_deref(), Some(REASON_KILL_SWITCH));
    assert!(fx.sink.event_types().contains(&"workflow.killed".to_string()));
}

#[test]
fn test_wrong_role_cannot_advance() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();

    let err = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 1)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Authorization(_)));
    assert_eq!(err.error_code(), "AUTHORIZATION_ERROR");
}

#[test]
fn test_admin_can_advance_any_stage() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let admin = Actor::new(Uuid::now_v7(), Role::TenantAdmin);

    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, admin, 0)
        .unwrap();
    assert_eq!(instance.current_stage, "security");
}

#[test]
fn test_views_differ_by_role() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();
    assert_eq!(instance.current_stage, "security");

    // The vendor never sees reviewer notes.
    let vendor_view = fx.orchestrator.view_for(instance.id, Role::VendorUser).unwrap();
    let vendor_fields: Vec<&str> = vendor_view.sections[0]
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(vendor_fields, vec!["name", "status"]);

    // The security reviewer sees everything and can edit only notes.
    let reviewer_view = fx
        .orchestrator
        .view_for(instance.id, Role::SecurityReviewer)
        .unwrap();
    let notes = reviewer_view.sections[0]
        .fields
        .iter()
        .find(|f| f.name == "security_notes")
        .unwrap();
    assert!(notes.can_edit);
    let name = reviewer_view.sections[0]
        .fields
        .iter()
        .find(|f| f.name == "name")
        .unwrap();
    assert!(!name.can_edit);
}

#[test]
fn test_stage_scoped_override_changes_view_between_stages() {
    let fx = TestFixture::new();
    // Freeze "status" for vendors once the entity leaves draft.
    fx.permissions.set_layout_override(
        fx.tenant,
        "agent_onboarding",
        "security",
        "status",
        Role::VendorUser,
        AccessOverride::default().with_edit(false),
    );

    let instance = fx.start(false);
    let draft_view = fx.orchestrator.view_for(instance.id, Role::VendorUser).unwrap();
    let status = draft_view.sections[0]
        .fields
        .iter()
        .find(|f| f.name == "status")
        .unwrap();
    assert!(status.can_edit);

    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, vendor(), 0)
        .unwrap();
    let security_view = fx.orchestrator.view_for(instance.id, Role::VendorUser).unwrap();
    let status = security_view.sections[0]
        .fields
        .iter()
        .find(|f| f.name == "status")
        .unwrap();
    assert!(!status.can_edit);
}

#[test]
fn test_terminal_instance_has_no_view() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let rejected = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Reject, vendor(), 0)
        .unwrap();

    let err = fx
        .orchestrator
        .view_for(rejected.id, Role::VendorUser)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[test]
fn test_history_is_a_complete_audit_trail() {
    let fx = TestFixture::new();
    let instance = fx.start(false);
    let submitter = vendor();
    let reviewer = security();

    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::Approve, submitter, 0)
        .unwrap();
    let instance = fx
        .orchestrator
        .advance(instance.id, WorkflowAction::RequestRevision, reviewer, 1)
        .unwrap();

    assert_eq!(instance.history.len(), 2);
    assert_eq!(instance.history[0].stage, "draft");
    assert_eq!(instance.history[0].actor_id, submitter.id);
    assert_eq!(instance.history[1].stage, "security");
    assert_eq!(instance.history[1].action, WorkflowAction::RequestRevision);
    assert!(instance.history[0].timestamp <= instance.history[1].timestamp);
}
