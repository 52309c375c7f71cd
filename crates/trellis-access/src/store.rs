//! Permission store
//!
//! This module holds the three permission tiers: entity baselines, field
//! overrides, and layout field access overrides. The store is authored
//! by administrators and read by the resolver; it never interprets the
//! records itself — the merge algorithm lives entirely in
//! [`crate::resolver::PermissionResolver`].
//!
//! All accessors take an explicit `tenant_id`; there is no ambient
//! "current tenant" state anywhere in the platform.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use trellis_fields::EntityType;

use crate::access::{AccessOverride, FieldAccess};
use crate::roles::Role;

/// Key for a layout field access override.
///
/// One tier more specific than field overrides: scoped to a request type
/// and workflow stage in addition to the field.
type LayoutKey = (Uuid, String, String, String);

#[derive(Debug, Default)]
struct Tiers {
    /// (tenant, entity_type) -> role -> baseline access.
    baselines: HashMap<(Uuid, EntityType), HashMap<Role, FieldAccess>>,

    /// (tenant, entity_type, field_name) -> role -> override.
    field_overrides: HashMap<(Uuid, EntityType, String), HashMap<Role, AccessOverride>>,

    /// (tenant, request_type, workflow_stage, field_name) -> role -> override.
    layout_overrides: HashMap<LayoutKey, HashMap<Role, AccessOverride>>,
}

/// Read-mostly store for the three permission tiers.
///
/// Administrative writes are visible to subsequent resolutions without a
/// process restart; request processing only reads.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_access::{FieldAccess, PermissionStore, Role};
/// use trellis_fields::EntityType;
///
/// let store = PermissionStore::new();
/// let tenant = Uuid::now_v7();
///
/// store.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::read_only());
/// assert_eq!(
///     store.baseline(tenant, EntityType::Agent, Role::VendorUser),
///     Some(FieldAccess::read_only())
/// );
/// ```
#[derive(Debug, Default)]
pub struct PermissionStore {
    tiers: RwLock<Tiers>,
}

impl PermissionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity baseline access for a role.
    ///
    /// One record per (tenant, entity_type, role); setting again replaces
    /// the previous value.
    pub fn set_baseline(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        role: Role,
        access: FieldAccess,
    ) {
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .baselines
            .entry((tenant_id, entity_type))
            .or_default()
            .insert(role, access);
    }

    /// Get the entity baseline access for a role.
    ///
    /// # Returns
    ///
    /// `None` when no baseline record exists for the role; the resolver
    /// treats that as deny-by-default.
    pub fn baseline(&self, tenant_id: Uuid, entity_type: EntityType, role: Role) -> Option<FieldAccess> {
        let tiers = self.tiers.read().unwrap_or_else(PoisonError::into_inner);
        tiers
            .baselines
            .get(&(tenant_id, entity_type))
            .and_then(|by_role| by_role.get(&role))
            .copied()
    }

    /// Set a field-level override for a role.
    pub fn set_field_override(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: impl Into<String>,
        role: Role,
        access: AccessOverride,
    ) {
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .field_overrides
            .entry((tenant_id, entity_type, field_name.into()))
            .or_default()
            .insert(role, access);
    }

    /// Get the field-level override for a role, if any.
    pub fn field_override(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: &str,
        role: Role,
    ) -> Option<AccessOverride> {
        let tiers = self.tiers.read().unwrap_or_else(PoisonError::into_inner);
        tiers
            .field_overrides
            .get(&(tenant_id, entity_type, field_name.to_string()))
            .and_then(|by_role| by_role.get(&role))
            .copied()
    }

    /// Remove a field-level override for a role.
    ///
    /// # Returns
    ///
    /// `true` if an override was present, `false` otherwise
    pub fn clear_field_override(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: &str,
        role: Role,
    ) -> bool {
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .field_overrides
            .get_mut(&(tenant_id, entity_type, field_name.to_string()))
            .map(|by_role| by_role.remove(&role).is_some())
            .unwrap_or(false)
    }

    /// Set a layout-scoped override for a role.
    ///
    /// Scoped to a (request_type, workflow_stage) pair; the most specific
    /// of the three tiers.
    pub fn set_layout_override(
        &self,
        tenant_id: Uuid,
        request_type: impl Into<String>,
        workflow_stage: impl Into<String>,
        field_name: impl Into<String>,
        role: Role,
        access: AccessOverride,
    ) {
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .layout_overrides
            .entry((
                tenant_id,
                request_type.into(),
                workflow_stage.into(),
                field_name.into(),
            ))
            .or_default()
            .insert(role, access);
    }

    /// Get the layout-scoped override for a role, if any.
    pub fn layout_override(
        &self,
        tenant_id: Uuid,
        request_type: &str,
        workflow_stage: &str,
        field_name: &str,
        role: Role,
    ) -> Option<AccessOverride> {
        let tiers = self.tiers.read().unwrap_or_else(PoisonError::into_inner);
        tiers
            .layout_overrides
            .get(&(
                tenant_id,
                request_type.to_string(),
                workflow_stage.to_string(),
                field_name.to_string(),
            ))
            .and_then(|by_role| by_role.get(&role))
            .copied()
    }

    /// Remove a layout-scoped override for a role.
    ///
    /// # Returns
    ///
    /// `true` if an override was present, `false` otherwise
    pub fn clear_layout_override(
        &self,
        tenant_id: Uuid,
        request_type: &str,
        workflow_stage: &str,
        field_name: &str,
        role: Role,
    ) -> bool {
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .layout_overrides
            .get_mut(&(
                tenant_id,
                request_type.to_string(),
                workflow_stage.to_string(),
                field_name.to_string(),
            ))
            .map(|by_role| by_role.remove(&role).is_some())
            .unwrap_or(false)
    }
}
