//! # Trellis Access
//!
//! Hierarchical field-level permission resolution for the Trellis
//! platform, shared by the layout and workflow crates.
//!
//! ## Overview
//!
//! The trellis-access crate handles:
//! - **Roles**: The closed set of roles that act in approval pipelines
//! - **Field access**: The resolved `{view, edit}` pair per field/role
//! - **Permission tiers**: Entity baselines, field overrides, and
//!   layout-scoped overrides
//! - **Resolution**: The single three-tier override merge
//!
//! ## Architecture
//!
//! ```text
//! effective = layout_override ∘ field_override ∘ baseline (deny default)
//!
//! Most specific wins, key by key:
//!   baseline:         (tenant, entity_type)                     per role
//!   field override:   (tenant, entity_type, field)              per role
//!   layout override:  (tenant, request_type, stage, field)      per role
//! ```
//!
//! A tier may set only one of `view`/`edit` and inherit the other; an
//! explicit `false` in a more specific tier beats an inherited `true`.
//! The resolved value always satisfies edit ⇒ view.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use trellis_access::{AccessOverride, FieldAccess, PermissionResolver, PermissionStore, Role};
//! use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
//!
//! let registry = Arc::new(FieldRegistry::new());
//! let store = Arc::new(PermissionStore::new());
//! let tenant = Uuid::now_v7();
//!
//! registry
//!     .register(tenant, FieldDef::new(EntityType::Agent, "status", FieldKind::Select))
//!     .unwrap();
//! store.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::read_only());
//! store.set_field_override(
//!     tenant,
//!     EntityType::Agent,
//!     "status",
//!     Role::VendorUser,
//!     AccessOverride::default().with_edit(true),
//! );
//!
//! let resolver = PermissionResolver::new(registry, store);
//! let access = resolver
//!     .resolve(tenant, EntityType::Agent, "status", "agent_onboarding", "new", Role::VendorUser)
//!     .unwrap();
//! assert_eq!(access, FieldAccess::editable());
//! ```

pub mod access;
pub mod error;
pub mod resolver;
pub mod roles;
pub mod store;

// Re-export main types for convenience
pub use access::{AccessOverride, FieldAccess};
pub use error::{AccessError, AccessResult};
pub use resolver::PermissionResolver;
pub use roles::Role;
pub use store::PermissionStore;
