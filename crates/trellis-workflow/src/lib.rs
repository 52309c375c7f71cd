//! # Trellis Workflow
//!
//! Multi-stage approval workflow engine for the Trellis platform.
//!
//! ## Overview
//!
//! The trellis-workflow crate handles:
//! - **Configurations**: Ordered review stages with assigned roles,
//!   approval modes, and per-stage layout references
//! - **Instances**: One entity's passage through a pipeline, with an
//!   append-only transition history
//! - **Stage machine**: The single explicit transition table
//! - **Orchestration**: `start` / `advance` / `view_for` with optimistic
//!   concurrency control
//! - **Events**: An envelope and sink seam for observing transitions
//!
//! ## Architecture
//!
//! ```text
//! WorkflowOrchestrator
//!   ├─ reads WorkflowConfiguration (validated at start)
//!   ├─ drives machine::evaluate          (pure transition table)
//!   ├─ persists via InstanceStore        (conditional on stage_version)
//!   ├─ renders via trellis-layout        (role-specific FormView)
//!   └─ emits WorkflowEvent to EventSink  (after commit)
//! ```
//!
//! ## Concurrency
//!
//! Instance mutation is the only contended resource. Every `advance`
//! supplies the `stage_version` the caller last observed; the store
//! write is conditional on it. Concurrent approvers under `all_of_role`
//! serialize correctly: the first commit wins, the second caller gets a
//! `Conflict`, re-fetches, and its retry either finds its approval
//! already recorded (no-op) or applies cleanly.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use trellis_access::{FieldAccess, PermissionResolver, PermissionStore, Role};
//! use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
//! use trellis_layout::{Layout, LayoutStore, Section, ViewGenerator};
//! use trellis_workflow::{
//!     Actor, InMemoryInstanceStore, LayoutRef, StageDef, WorkflowAction,
//!     WorkflowConfiguration, WorkflowOrchestrator,
//! };
//!
//! let registry = Arc::new(FieldRegistry::new());
//! let permissions = Arc::new(PermissionStore::new());
//! let layouts = Arc::new(LayoutStore::new());
//! let tenant = Uuid::now_v7();
//!
//! registry
//!     .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
//!     .unwrap();
//! permissions.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::editable());
//! layouts.set(
//!     tenant,
//!     Layout::new("agent_onboarding", "draft")
//!         .with_section(Section::new("identity", "Identity", 10).with_fields(["name"])),
//! );
//!
//! let orchestrator = WorkflowOrchestrator::new(
//!     Arc::new(InMemoryInstanceStore::new()),
//!     ViewGenerator::new(Arc::clone(&layouts), PermissionResolver::new(registry, permissions)),
//! );
//!
//! let config = WorkflowConfiguration::new("agent_onboarding", EntityType::Agent, "draft")
//!     .with_stage(StageDef::new(
//!         "draft",
//!         Role::VendorUser,
//!         LayoutRef::new("agent_onboarding", "draft"),
//!     ));
//!
//! let instance = orchestrator.start(tenant, Uuid::now_v7(), false, config).unwrap();
//! let vendor = Actor::new(Uuid::now_v7(), Role::VendorUser);
//! let done = orchestrator
//!     .advance(instance.id, WorkflowAction::Approve, vendor, 0)
//!     .unwrap();
//! assert_eq!(done.status.as_str(), "approved");
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod instance;
pub mod machine;
pub mod orchestrator;
pub mod store;

// Re-export main types for convenience
pub use config::{
    ApprovalMode, LayoutRef, StageDef, WorkflowConfiguration, STAGE_APPROVED, STAGE_REJECTED,
};
pub use error::{WorkflowError, WorkflowResult};
pub use events::{EventSink, TracingSink, WorkflowEvent};
pub use instance::{Actor, HistoryEntry, WorkflowAction, WorkflowInstance, WorkflowStatus};
pub use machine::{Transition, REASON_KILL_SWITCH};
pub use orchestrator::WorkflowOrchestrator;
pub use store::{InMemoryInstanceStore, InstanceStore, StoreError, StoreResult};
