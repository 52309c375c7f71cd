//! Permission resolver
//!
//! The single place the three-tier override merge exists. Callers depend
//! on the resolved [`FieldAccess`] output and never on the raw override
//! records.

use std::sync::Arc;

use uuid::Uuid;

use trellis_fields::{EntityType, FieldRegistry};

use crate::access::FieldAccess;
use crate::error::AccessResult;
use crate::roles::Role;
use crate::store::PermissionStore;

/// Resolves effective field access from the three permission tiers.
///
/// The merge is most-specific-wins:
///
/// 1. Entity baseline for the role, or deny-by-default when absent
/// 2. Field override, replacing only the keys it sets
/// 3. Layout override, replacing only the keys it sets
///
/// followed by edit-implies-view normalization. Resolution is pure over
/// current store state, has no side effects, and is safe to call
/// concurrently or memoize per-request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use trellis_access::{FieldAccess, PermissionResolver, PermissionStore, Role};
/// use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
///
/// let registry = Arc::new(FieldRegistry::new());
/// let store = Arc::new(PermissionStore::new());
/// let tenant = Uuid::now_v7();
///
/// registry
///     .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
///     .unwrap();
/// store.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::read_only());
///
/// let resolver = PermissionResolver::new(registry, store);
/// let access = resolver
///     .resolve(tenant, EntityType::Agent, "name", "agent_onboarding", "new", Role::VendorUser)
///     .unwrap();
/// assert_eq!(access, FieldAccess::read_only());
/// ```
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    registry: Arc<FieldRegistry>,
    store: Arc<PermissionStore>,
}

impl PermissionResolver {
    /// Create a resolver over a field catalog and permission store.
    pub fn new(registry: Arc<FieldRegistry>, store: Arc<PermissionStore>) -> Self {
        Self { registry, store }
    }

    /// Resolve effective access for one field.
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant the resolution runs in
    /// * `entity_type` - Entity type owning the field
    /// * `field_name` - Catalog field name
    /// * `request_type` - Request type scoping the layout tier
    /// * `workflow_stage` - Workflow stage scoping the layout tier
    /// * `role` - Role to resolve for
    ///
    /// Disabled catalog fields resolve to deny regardless of the stored
    /// tiers: disabling removes a field from every rendered view without
    /// breaking historical layouts that still reference it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the (entity_type, field_name)
    /// pair is not in the catalog. Unknown fields are never silently
    /// denied.
    pub fn resolve(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: &str,
        request_type: &str,
        workflow_stage: &str,
        role: Role,
    ) -> AccessResult<FieldAccess> {
        let def = self.registry.require(tenant_id, entity_type, field_name)?;
        if !def.is_enabled {
            return Ok(FieldAccess::deny());
        }

        // Tier 1: baseline, deny when no record exists for the role.
        let mut access = self
            .store
            .baseline(tenant_id, entity_type, role)
            .unwrap_or_else(FieldAccess::deny);

        // Tier 2: field override.
        if let Some(ov) = self
            .store
            .field_override(tenant_id, entity_type, field_name, role)
        {
            access = ov.apply(access);
        }

        // Tier 3: layout override, most specific.
        if let Some(ov) =
            self.store
                .layout_override(tenant_id, request_type, workflow_stage, field_name, role)
        {
            access = ov.apply(access);
        }

        Ok(access.normalized())
    }
}
