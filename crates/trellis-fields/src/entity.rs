//! # Entity and Field Types
//!
//! Defines the entity types managed by the platform and the kinds of
//! fields they can carry. Every reviewable record in Trellis belongs to
//! exactly one entity type.

use serde::{Deserialize, Serialize};

/// Entity types that move through approval pipelines.
///
/// Each entity type has its own field catalog, baseline permissions,
/// and workflow configurations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// AI agent registrations (onboarding, capability review).
    Agent,
    /// Vendor organizations supplying agents or services.
    Vendor,
    /// Products offered by vendors.
    Product,
    /// Services offered by vendors.
    Service,
}

impl EntityType {
    /// Get the string representation of the entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Agent => "agent",
            EntityType::Vendor => "vendor",
            EntityType::Product => "product",
            EntityType::Service => "service",
        }
    }

    /// Parse entity type from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(EntityType)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_fields::EntityType;
    ///
    /// assert_eq!(EntityType::parse("agent"), Some(EntityType::Agent));
    /// assert_eq!(EntityType::parse("VENDOR"), Some(EntityType::Vendor));
    /// assert_eq!(EntityType::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "agent" | "agents" => Some(EntityType::Agent),
            "vendor" | "vendors" => Some(EntityType::Vendor),
            "product" | "products" => Some(EntityType::Product),
            "service" | "services" => Some(EntityType::Service),
            _ => None,
        }
    }

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityType::Agent => "Agent",
            EntityType::Vendor => "Vendor",
            EntityType::Product => "Product",
            EntityType::Service => "Service",
        }
    }

    /// Get all entity types.
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Agent,
            EntityType::Vendor,
            EntityType::Product,
            EntityType::Service,
        ]
    }
}

/// Kind of value a catalog field holds.
///
/// The kind drives form rendering and input validation in the UI layer;
/// the core only records it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text.
    Text,
    /// Numeric value.
    Number,
    /// Calendar date.
    Date,
    /// Boolean flag.
    Boolean,
    /// One of a fixed set of options.
    Select,
    /// Reference to another entity.
    Reference,
    /// Arbitrary structured payload.
    Json,
}

impl FieldKind {
    /// Get the string representation of the field kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::Select => "select",
            FieldKind::Reference => "reference",
            FieldKind::Json => "json",
        }
    }

    /// Parse field kind from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "string" => Some(FieldKind::Text),
            "number" | "numeric" => Some(FieldKind::Number),
            "date" => Some(FieldKind::Date),
            "boolean" | "bool" => Some(FieldKind::Boolean),
            "select" => Some(FieldKind::Select),
            "reference" => Some(FieldKind::Reference),
            "json" => Some(FieldKind::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_parse() {
        assert_eq!(EntityType::parse("agent"), Some(EntityType::Agent));
        assert_eq!(EntityType::parse("agents"), Some(EntityType::Agent));
        assert_eq!(EntityType::parse("VENDOR"), Some(EntityType::Vendor));
        assert_eq!(EntityType::parse("invalid"), None);
    }

    #[test]
    fn test_entity_type_roundtrip() {
        for et in EntityType::all() {
            assert_eq!(EntityType::parse(et.as_str()), Some(*et));
        }
    }

    #[test]
    fn test_field_kind_parse() {
        assert_eq!(FieldKind::parse("text"), Some(FieldKind::Text));
        assert_eq!(FieldKind::parse("BOOL"), Some(FieldKind::Boolean));
        assert_eq!(FieldKind::parse("unknown"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&EntityType::Agent).unwrap();
        assert_eq!(json, "\"agent\"");
        let kind: FieldKind = serde_json::from_str("\"select\"").unwrap();
        assert_eq!(kind, FieldKind::Select);
    }
}
