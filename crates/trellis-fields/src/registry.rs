//! Field catalog registry
//!
//! This module provides the per-tenant catalog of known fields for each
//! entity type. Fields are registered when an entity type is provisioned,
//! are read-only at runtime, and are never deleted, only disabled.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{EntityType, FieldKind};

/// Errors from field catalog operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The (entity_type, field_name) pair is not in the catalog.
    ///
    /// Surfaced as a configuration error by consumers so that
    /// misconfiguration is visible instead of masked as "no access".
    #[error("Unknown field '{field_name}' for entity type '{}'", entity_type.as_str())]
    UnknownField {
        /// Entity type the lookup was for.
        entity_type: EntityType,
        /// Field name that was not found.
        field_name: String,
    },

    /// A field with this name is already registered for the entity type.
    #[error("Field '{field_name}' already registered for entity type '{}'", entity_type.as_str())]
    DuplicateField {
        /// Entity type the registration was for.
        entity_type: EntityType,
        /// Field name that collided.
        field_name: String,
    },
}

/// Result type for field catalog operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// A single catalog entry describing one field of an entity type.
///
/// # Examples
///
/// ```
/// use trellis_fields::{EntityType, FieldDef, FieldKind};
///
/// let def = FieldDef::new(EntityType::Agent, "name", FieldKind::Text);
/// assert!(def.is_enabled);
/// assert_eq!(def.field_name, "name");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDef {
    /// Entity type this field belongs to.
    pub entity_type: EntityType,

    /// Field name, unique within the entity type.
    pub field_name: String,

    /// Kind of value the field holds.
    pub kind: FieldKind,

    /// Whether the field is currently enabled.
    ///
    /// Disabled fields stay in the catalog (referenced by historical
    /// layouts and records) but are excluded from new layouts.
    pub is_enabled: bool,
}

impl FieldDef {
    /// Create a new enabled field definition.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - Entity type the field belongs to
    /// * `field_name` - Field name, unique within the entity type
    /// * `kind` - Kind of value the field holds
    pub fn new(entity_type: EntityType, field_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            entity_type,
            field_name: field_name.into(),
            kind,
            is_enabled: true,
        }
    }
}

/// Per-tenant catalog of known fields.
///
/// The registry is read-mostly: administrative registration happens at
/// provisioning time, resolution reads happen on every request. Writes
/// are visible to subsequent reads without a restart.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
///
/// let registry = FieldRegistry::new();
/// let tenant = Uuid::now_v7();
/// registry
///     .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
///     .unwrap();
/// assert!(registry.get(tenant, EntityType::Agent, "name").is_some());
/// ```
#[derive(Debug, Default)]
pub struct FieldRegistry {
    /// (tenant, entity_type, field_name) -> definition.
    fields: RwLock<HashMap<(Uuid, EntityType, String), FieldDef>>,
}

impl FieldRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field for a tenant.
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant the field belongs to
    /// * `def` - The field definition
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DuplicateField`] if the (entity_type,
    /// field_name) pair is already registered for the tenant.
    pub fn register(&self, tenant_id: Uuid, def: FieldDef) -> FieldResult<()> {
        let key = (tenant_id, def.entity_type, def.field_name.clone());
        let mut fields = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        if fields.contains_key(&key) {
            return Err(FieldError::DuplicateField {
                entity_type: def.entity_type,
                field_name: def.field_name,
            });
        }
        fields.insert(key, def);
        Ok(())
    }

    /// Look up a field definition.
    ///
    /// # Returns
    ///
    /// `Some(FieldDef)` if registered (enabled or not), `None` otherwise.
    pub fn get(&self, tenant_id: Uuid, entity_type: EntityType, field_name: &str) -> Option<FieldDef> {
        let fields = self.fields.read().unwrap_or_else(PoisonError::into_inner);
        fields
            .get(&(tenant_id, entity_type, field_name.to_string()))
            .cloned()
    }

    /// Look up a field definition, failing if it is not in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] for unregistered fields.
    pub fn require(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: &str,
    ) -> FieldResult<FieldDef> {
        self.get(tenant_id, entity_type, field_name)
            .ok_or_else(|| FieldError::UnknownField {
                entity_type,
                field_name: field_name.to_string(),
            })
    }

    /// Get all fields for an entity type, sorted by field name.
    pub fn fields_for(&self, tenant_id: Uuid, entity_type: EntityType) -> Vec<FieldDef> {
        let fields = self.fields.read().unwrap_or_else(PoisonError::into_inner);
        let mut result: Vec<FieldDef> = fields
            .iter()
            .filter(|((t, et, _), _)| *t == tenant_id && *et == entity_type)
            .map(|(_, def)| def.clone())
            .collect();
        result.sort_by(|a, b| a.field_name.cmp(&b.field_name));
        result
    }

    /// Disable a field.
    ///
    /// The catalog entry is retained; only `is_enabled` flips. Fields are
    /// never removed from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] if the field is not registered.
    pub fn disable(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        field_name: &str,
    ) -> FieldResult<()> {
        let mut fields = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        match fields.get_mut(&(tenant_id, entity_type, field_name.to_string())) {
            Some(def) => {
                def.is_enabled = false;
                Ok(())
            }
            None => Err(FieldError::UnknownField {
                entity_type,
                field_name: field_name.to_string(),
            }),
        }
    }
}
