//! Workflow orchestrator
//!
//! Public entry point for driving entities through approval pipelines:
//! `start`, `advance`, and `view_for`. The orchestrator owns the only
//! mutation path for workflow instances and enforces optimistic
//! concurrency on every write.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use trellis_access::Role;
use trellis_layout::{FormView, ViewGenerator, ViewRequest};

use crate::config::WorkflowConfiguration;
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::{EventSink, TracingSink, WorkflowEvent};
use crate::instance::{Actor, HistoryEntry, WorkflowAction, WorkflowInstance, WorkflowStatus};
use crate::machine::{self, Transition, REASON_KILL_SWITCH};
use crate::store::{InstanceStore, StoreError};

/// Drives workflow instances through their configured pipelines.
///
/// Concurrency model: two callers may `advance` the same instance at
/// once. Every call supplies the `stage_version` it last observed; the
/// store write is conditional on that version, so the first writer
/// commits and the second gets a [`WorkflowError::Conflict`] and must
/// re-fetch and retry. Retrying an approval that was already recorded is
/// a no-op, never a double-apply.
pub struct WorkflowOrchestrator {
    /// (tenant, config name) -> configuration, captured at `start`.
    configs: RwLock<HashMap<(Uuid, String), WorkflowConfiguration>>,
    instances: Arc<dyn InstanceStore>,
    views: ViewGenerator,
    sink: Arc<dyn EventSink>,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator over an instance store and view generator.
    ///
    /// Events are logged via the default [`TracingSink`]; use
    /// [`with_sink`](Self::with_sink) to attach a delivery mechanism.
    pub fn new(instances: Arc<dyn InstanceStore>, views: ViewGenerator) -> Self {
        Self {
            configs: RwLock::new(HashMap::new()),
            instances,
            views,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a workflow instance for an entity.
    ///
    /// Validates the configuration, registers it for later `advance`
    /// calls, and creates the instance at the configuration's first
    /// stage with `status=active` and `stage_version=0`.
    ///
    /// Starting again under an already-registered (tenant, name) with an
    /// identical definition is fine; a differing definition is rejected,
    /// so in-flight instances never resolve against a silently swapped
    /// configuration.
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant the instance belongs to
    /// * `entity_id` - Entity entering review
    /// * `kill_switch_enabled` - Whether the entity's kill switch is armed
    /// * `config` - The workflow configuration to run
    pub fn start(
        &self,
        tenant_id: Uuid,
        entity_id: Uuid,
        kill_switch_enabled: bool,
        config: WorkflowConfiguration,
    ) -> WorkflowResult<WorkflowInstance> {
        config.validate()?;
        let first_stage = config.first_stage()?.name.clone();

        {
            let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
            match configs.get(&(tenant_id, config.name.clone())) {
                Some(existing) if *existing != config => {
                    return Err(WorkflowError::Configuration(format!(
                        "workflow configuration '{}' is already registered with a \
                         different definition",
                        config.name
                    )));
                }
                Some(_) => {}
                None => {
                    configs.insert((tenant_id, config.name.clone()), config.clone());
                }
            }
        }

        let instance = WorkflowInstance::new(
            tenant_id,
            entity_id,
            config.name.clone(),
            first_stage,
            kill_switch_enabled,
        );
        self.instances
            .insert(instance.clone())
            .map_err(map_store_error)?;

        tracing::info!(
            instance_id = %instance.id,
            tenant_id = %tenant_id,
            entity_id = %entity_id,
            stage = %instance.current_stage,
            "workflow started"
        );
        self.sink.emit(&WorkflowEvent::new(
            "workflow.started",
            tenant_id,
            instance.id,
            entity_id,
            instance.current_stage.clone(),
        ));

        Ok(instance)
    }

    /// Apply one action to an instance.
    ///
    /// # Arguments
    ///
    /// * `instance_id` - Instance to act on
    /// * `action` - Action to apply
    /// * `actor` - Who is acting
    /// * `expected_version` - The `stage_version` the caller last observed
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Conflict`] when `expected_version` is stale —
    ///   unless the action is an approval this actor already has
    ///   recorded, which no-ops instead
    /// - machine errors ([`WorkflowError::Authorization`],
    ///   [`WorkflowError::Validation`], [`WorkflowError::Configuration`])
    ///   without any state change
    pub fn advance(
        &self,
        instance_id: Uuid,
        action: WorkflowAction,
        actor: Actor,
        expected_version: u64,
    ) -> WorkflowResult<WorkflowInstance> {
        let instance = self.instances.get(instance_id).map_err(map_store_error)?;

        // Idempotent retry: an approval this actor already has recorded
        // at the current stage is a no-op even with a stale version.
        if action == WorkflowAction::Approve
            && !instance.is_terminal()
            && instance.has_approval_from(actor.id)
        {
            return Ok(instance);
        }

        if expected_version != instance.stage_version {
            return Err(WorkflowError::Conflict {
                expected: expected_version,
                actual: instance.stage_version,
            });
        }

        let config = self.config_for(&instance)?;
        let transition = machine::evaluate(&config, &instance, action, &actor)?;

        let mut updated = instance;
        let acted_stage = updated.current_stage.clone();
        match &transition {
            Transition::AlreadyApproved => return Ok(updated),
            Transition::PartialApproval => {
                updated.approvals.push(actor.id);
            }
            Transition::Move {
                next_stage,
                next_status,
                ..
            } => {
                updated.current_stage = next_stage.clone();
                updated.status = *next_status;
                updated.approvals.clear();
            }
        }

        let reason = match &transition {
            Transition::Move { reason, .. } => reason.clone(),
            _ => None,
        };
        updated.record(HistoryEntry {
            stage: acted_stage,
            actor_role: actor.role,
            actor_id: actor.id,
            action,
            reason: reason.clone(),
            timestamp: chrono::Utc::now(),
        });
        updated.stage_version += 1;

        self.instances
            .update(updated.clone(), expected_version)
            .map_err(map_store_error)?;

        tracing::info!(
            instance_id = %updated.id,
            action = %action.as_str(),
            stage = %updated.current_stage,
            status = %updated.status.as_str(),
            stage_version = updated.stage_version,
            "workflow advanced"
        );
        self.sink.emit(
            &WorkflowEvent::new(
                event_type_for(&transition, reason.as_deref()),
                updated.tenant_id,
                updated.id,
                updated.entity_id,
                updated.current_stage.clone(),
            )
            .with_actor(actor.id, actor.role)
            .with_payload(serde_json::json!({
                "action": action.as_str(),
                "status": updated.status.as_str(),
            })),
        );

        Ok(updated)
    }

    /// Generate the form one role sees for an instance's current stage.
    ///
    /// Resolves the current stage's layout reference and delegates to the
    /// view generator.
    pub fn view_for(&self, instance_id: Uuid, role: Role) -> WorkflowResult<FormView> {
        let instance = self.instances.get(instance_id).map_err(map_store_error)?;
        if instance.is_terminal() {
            return Err(WorkflowError::Validation(format!(
                "instance {} is terminal ({}); no form to show",
                instance.id,
                instance.status.as_str()
            )));
        }

        let config = self.config_for(&instance)?;
        let stage = config.stage(&instance.current_stage).ok_or_else(|| {
            WorkflowError::Configuration(format!(
                "stage '{}' is not declared in workflow '{}'",
                instance.current_stage, config.name
            ))
        })?;

        let request = ViewRequest::new(
            instance.tenant_id,
            config.entity_type,
            stage.layout.request_type.clone(),
            stage.layout.workflow_stage.clone(),
            role,
        );
        Ok(self.views.generate(&request)?)
    }

    /// Look up the configuration an instance references.
    fn config_for(&self, instance: &WorkflowInstance) -> WorkflowResult<WorkflowConfiguration> {
        let configs = self.configs.read().unwrap_or_else(PoisonError::into_inner);
        configs
            .get(&(instance.tenant_id, instance.config_name.clone()))
            .cloned()
            .ok_or_else(|| {
                WorkflowError::Configuration(format!(
                    "workflow configuration '{}' is not registered",
                    instance.config_name
                ))
            })
    }
}

/// Map the event type for a committed transition.
fn event_type_for(transition: &Transition, reason: Option<&str>) -> &'static str {
    match transition {
        Transition::AlreadyApproved | Transition::PartialApproval => "workflow.approval_recorded",
        Transition::Move { next_status, .. } => match next_status {
            WorkflowStatus::Active => "workflow.stage_advanced",
            WorkflowStatus::Approved => "workflow.approved",
            WorkflowStatus::RevisionRequested => "workflow.revision_requested",
            WorkflowStatus::Rejected => {
                if reason == Some(REASON_KILL_SWITCH) {
                    "workflow.killed"
                } else {
                    "workflow.rejected"
                }
            }
        },
    }
}

fn map_store_error(err: StoreError) -> WorkflowError {
    match err {
        StoreError::NotFound(id) => WorkflowError::InstanceNotFound(id),
        StoreError::AlreadyExists(id) => {
            WorkflowError::Validation(format!("workflow instance {id} already exists"))
        }
        StoreError::VersionConflict {
            expected, actual, ..
        } => WorkflowError::Conflict { expected, actual },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutRef, StageDef};
    use crate::store::InMemoryInstanceStore;
    use trellis_access::{FieldAccess, PermissionResolver, PermissionStore};
    use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
    use trellis_layout::{Layout, LayoutStore, Section};

    fn orchestrator(tenant: Uuid) -> WorkflowOrchestrator {
        let registry = Arc::new(FieldRegistry::new());
        let permissions = Arc::new(PermissionStore::new());
        let layouts = Arc::new(LayoutStore::new());

        registry
            .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
            .unwrap();
        permissions.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::editable());
        layouts.set(
            tenant,
            Layout::new("agent_onboarding", "draft")
                .with_section(Section::new("identity", "Identity", 10).with_fields(["name"])),
        );

        let views = ViewGenerator::new(
            Arc::clone(&layouts),
            PermissionResolver::new(registry, permissions),
        );
        WorkflowOrchestrator::new(Arc::new(InMemoryInstanceStore::new()), views)
    }

    fn config() -> WorkflowConfiguration {
        WorkflowConfiguration::new("agent_onboarding", EntityType::Agent, "draft")
            .with_stage(StageDef::new(
                "draft",
                Role::VendorUser,
                LayoutRef::new("agent_onboarding", "draft"),
            ))
            .with_stage(StageDef::new(
                "security",
                Role::SecurityReviewer,
                LayoutRef::new("agent_onboarding", "security"),
            ))
    }

    #[test]
    fn test_start_creates_active_instance() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let instance = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();

        assert_eq!(instance.status, WorkflowStatus::Active);
        assert_eq!(instance.current_stage, "draft");
        assert_eq!(instance.stage_version, 0);
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let bad = WorkflowConfiguration::new("empty", EntityType::Agent, "draft");
        assert!(matches!(
            orch.start(tenant, Uuid::now_v7(), false, bad),
            Err(WorkflowError::Configuration(_))
        ));
    }

    #[test]
    fn test_start_accepts_identical_config_reregistration() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();
        // A second entity entering the same pipeline is routine.
        let second = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();
        assert_eq!(second.current_stage, "draft");
    }

    #[test]
    fn test_start_rejects_conflicting_config_redefinition() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let first = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();

        // Same name, different stage list: in-flight instances must keep
        // resolving against the definition they started under.
        let redefined = WorkflowConfiguration::new("agent_onboarding", EntityType::Agent, "draft")
            .with_stage(StageDef::new(
                "draft",
                Role::VendorUser,
                LayoutRef::new("agent_onboarding", "draft"),
            ));
        let err = orch
            .start(tenant, Uuid::now_v7(), false, redefined)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration(_)));

        // The original instance still advances under its own definition.
        let vendor = Actor::new(Uuid::now_v7(), Role::VendorUser);
        let advanced = orch
            .advance(first.id, WorkflowAction::Approve, vendor, 0)
            .unwrap();
        assert_eq!(advanced.current_stage, "security");
    }

    #[test]
    fn test_view_for_current_stage() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let instance = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();

        let view = orch.view_for(instance.id, Role::VendorUser).unwrap();
        assert_eq!(view.workflow_stage, "draft");
        assert_eq!(view.sections.len(), 1);
        assert!(view.sections[0].fields[0].can_edit);
    }

    #[test]
    fn test_view_for_unknown_instance() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        assert!(matches!(
            orch.view_for(Uuid::now_v7(), Role::VendorUser),
            Err(WorkflowError::InstanceNotFound(_))
        ));
    }

    #[test]
    fn test_advance_appends_history() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let instance = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();
        let vendor = Actor::new(Uuid::now_v7(), Role::VendorUser);

        let updated = orch
            .advance(instance.id, WorkflowAction::Approve, vendor, 0)
            .unwrap();
        assert_eq!(updated.current_stage, "security");
        assert_eq!(updated.stage_version, 1);
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.history[0].stage, "draft");
        assert_eq!(updated.history[0].action, WorkflowAction::Approve);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let tenant = Uuid::now_v7();
        let orch = orchestrator(tenant);
        let instance = orch.start(tenant, Uuid::now_v7(), false, config()).unwrap();
        let vendor = Actor::new(Uuid::now_v7(), Role::VendorUser);

        orch.advance(instance.id, WorkflowAction::Approve, vendor, 0).unwrap();
        let err = orch
            .advance(
                instance.id,
                WorkflowAction::Approve,
                Actor::new(Uuid::now_v7(), Role::SecurityReviewer),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict { expected: 0, actual: 1 }));
    }
}
