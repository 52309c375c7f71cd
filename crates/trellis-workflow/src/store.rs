//! Workflow instance persistence
//!
//! The instance store is the persistence collaborator of the
//! orchestrator. Its one non-obvious obligation is the conditional
//! update: a write commits only when the caller's expected
//! `stage_version` still matches the stored instance, which is what
//! serializes concurrent `advance` calls.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::instance::WorkflowInstance;

/// Instance store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No instance with this id.
    #[error("Workflow instance {0} not found")]
    NotFound(Uuid),

    /// An instance with this id already exists.
    #[error("Workflow instance {0} already exists")]
    AlreadyExists(Uuid),

    /// The conditional update failed: someone else committed first.
    #[error("Version conflict on instance {instance_id}: expected {expected}, stored {actual}")]
    VersionConflict {
        /// Instance the write was for.
        instance_id: Uuid,
        /// Version the writer expected.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },
}

/// Result type for instance store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for workflow instances.
///
/// Implementations must make `update` atomic with respect to the version
/// check: "update where stage_version = expected" as a single operation.
pub trait InstanceStore: Send + Sync {
    /// Insert a new instance.
    fn insert(&self, instance: WorkflowInstance) -> StoreResult<()>;

    /// Load an instance by id.
    fn get(&self, instance_id: Uuid) -> StoreResult<WorkflowInstance>;

    /// Conditionally replace an instance.
    ///
    /// Commits only if the stored instance's `stage_version` equals
    /// `expected_version`; otherwise returns
    /// [`StoreError::VersionConflict`] and leaves the store unchanged.
    fn update(&self, instance: WorkflowInstance, expected_version: u64) -> StoreResult<()>;
}

/// In-memory instance store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryInstanceStore {
    instances: RwLock<HashMap<Uuid, WorkflowInstance>>,
}

impl InMemoryInstanceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanceStore for InMemoryInstanceStore {
    fn insert(&self, instance: WorkflowInstance) -> StoreResult<()> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        if instances.contains_key(&instance.id) {
            return Err(StoreError::AlreadyExists(instance.id));
        }
        instances.insert(instance.id, instance);
        Ok(())
    }

    fn get(&self, instance_id: Uuid) -> StoreResult<WorkflowInstance> {
        let instances = self.instances.read().unwrap_or_else(PoisonError::into_inner);
        instances
            .get(&instance_id)
            .cloned()
            .ok_or(StoreError::NotFound(instance_id))
    }

    fn update(&self, instance: WorkflowInstance, expected_version: u64) -> StoreResult<()> {
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let stored = instances
            .get_mut(&instance.id)
            .ok_or(StoreError::NotFound(instance.id))?;
        if stored.stage_version != expected_version {
            return Err(StoreError::VersionConflict {
                instance_id: instance.id,
                expected: expected_version,
                actual: stored.stage_version,
            });
        }
        *stored = instance;
        Ok(())
    }
}
