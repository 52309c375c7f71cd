//! # Trellis Fields
//!
//! Entity field catalog for the Trellis platform, shared across the
//! access, layout, and workflow crates.
//!
//! ## Overview
//!
//! The trellis-fields crate handles:
//! - **Entity types**: The closed set of reviewable entity kinds
//! - **Field kinds**: What sort of value each field holds
//! - **Field catalog**: Per-tenant registry of known fields
//!
//! ## Architecture
//!
//! ```text
//! FieldDef = EntityType + field name + FieldKind [+ enabled flag]
//!
//! Examples:
//!   (agent, "name", text)        - agent display name
//!   (vendor, "tax_id", text)     - vendor tax identifier
//!   (agent, "status", select)    - lifecycle status
//! ```
//!
//! The catalog is the source of truth for which fields exist: permission
//! resolution and layout validation both refuse to operate on fields the
//! catalog does not know, so configuration mistakes surface as errors
//! rather than silent denials.
//!
//! ## Usage
//!
//! ```rust
//! use uuid::Uuid;
//! use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
//!
//! let registry = FieldRegistry::new();
//! let tenant = Uuid::now_v7();
//!
//! registry
//!     .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
//!     .unwrap();
//!
//! let def = registry.require(tenant, EntityType::Agent, "name").unwrap();
//! assert!(def.is_enabled);
//! ```

pub mod entity;
pub mod registry;

// Re-export main types for convenience
pub use entity::{EntityType, FieldKind};
pub use registry::{FieldDef, FieldError, FieldRegistry, FieldResult};
