//! Layout domain models
//!
//! A layout is the ordered grouping of catalog fields into sections for
//! one (request_type, workflow_stage) pair. Layouts are authored by
//! administrators; the view generator combines them with permission
//! resolution at request time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trellis_fields::{EntityType, FieldRegistry};

use crate::error::{LayoutError, LayoutResult};

/// One section of a layout.
///
/// # Examples
///
/// ```
/// use trellis_layout::Section;
///
/// let section = Section::new("identity", "Identity", 10)
///     .with_tab("general")
///     .with_fields(["name", "status"]);
/// assert_eq!(section.field_names.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    /// Section id, unique within the layout.
    pub id: String,

    /// Human-readable section title.
    pub title: String,

    /// Display order; sections are emitted ascending, ties broken by id.
    pub order: u32,

    /// Tab this section belongs to. Sections without a tab are grouped
    /// under a default tab in the generated view.
    pub tab: Option<String>,

    /// Catalog field names shown in this section, in display order.
    #[serde(default)]
    pub field_names: Vec<String>,

    /// Agent types this section applies to. Empty means all.
    ///
    /// Matched against the optional agent_type/agent_category parameters
    /// of view generation; non-matching sections are skipped entirely.
    #[serde(default)]
    pub agent_types: Vec<String>,
}

impl Section {
    /// Create a new section with no fields.
    ///
    /// # Arguments
    ///
    /// * `id` - Section id, unique within the layout
    /// * `title` - Human-readable title
    /// * `order` - Display order
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order,
            tab: None,
            field_names: Vec::new(),
            agent_types: Vec::new(),
        }
    }

    /// Set the tab this section belongs to.
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self
    }

    /// Set the fields shown in this section.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_names = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict this section to specific agent types.
    pub fn with_agent_types<I, S>(mut self, agent_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agent_types = agent_types.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether this section applies to the given agent type and
    /// category. An empty restriction list applies to everything.
    pub fn applies_to(&self, agent_type: Option<&str>, agent_category: Option<&str>) -> bool {
        if self.agent_types.is_empty() {
            return true;
        }
        agent_type
            .map(|t| self.agent_types.iter().any(|a| a == t))
            .unwrap_or(false)
            || agent_category
                .map(|c| self.agent_types.iter().any(|a| a == c))
                .unwrap_or(false)
    }
}

/// Ordered grouping of fields into sections for one
/// (request_type, workflow_stage) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layout {
    /// Request type this layout renders.
    pub request_type: String,

    /// Workflow stage this layout renders at.
    pub workflow_stage: String,

    /// Sections in authored order; display order is the `order` field.
    pub sections: Vec<Section>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new(request_type: impl Into<String>, workflow_stage: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            workflow_stage: workflow_stage.into(),
            sections: Vec::new(),
        }
    }

    /// Add a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Validate this layout against the field catalog.
    ///
    /// Checks that section ids are unique and that every referenced field
    /// is registered and enabled for the entity type.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: [`LayoutError::DuplicateSection`],
    /// [`LayoutError::DisabledField`], or a catalog lookup failure.
    pub fn validate(
        &self,
        registry: &FieldRegistry,
        tenant_id: Uuid,
        entity_type: EntityType,
    ) -> LayoutResult<()> {
        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(LayoutError::DuplicateSection {
                    section_id: section.id.clone(),
                });
            }
            for field_name in &section.field_names {
                let def = registry.require(tenant_id, entity_type, field_name)?;
                if !def.is_enabled {
                    return Err(LayoutError::DisabledField {
                        section_id: section.id.clone(),
                        field_name: field_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Get sections in display order: ascending `order`, ties broken by
    /// lexicographic section id.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_fields::{FieldDef, FieldKind};

    fn registry_with(tenant: Uuid, fields: &[&str]) -> FieldRegistry {
        let registry = FieldRegistry::new();
        for name in fields {
            registry
                .register(tenant, FieldDef::new(EntityType::Agent, *name, FieldKind::Text))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_validate_ok() {
        let tenant = Uuid::now_v7();
        let registry = registry_with(tenant, &["name", "status"]);
        let layout = Layout::new("agent_onboarding", "new")
            .with_section(Section::new("identity", "Identity", 10).with_fields(["name", "status"]));

        assert!(layout.validate(&registry, tenant, EntityType::Agent).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_section_ids() {
        let tenant = Uuid::now_v7();
        let registry = registry_with(tenant, &["name"]);
        let layout = Layout::new("agent_onboarding", "new")
            .with_section(Section::new("identity", "Identity", 10))
            .with_section(Section::new("identity", "Identity Again", 20));

        let err = layout.validate(&registry, tenant, EntityType::Agent).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateSection { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let tenant = Uuid::now_v7();
        let registry = registry_with(tenant, &["name"]);
        let layout = Layout::new("agent_onboarding", "new")
            .with_section(Section::new("identity", "Identity", 10).with_fields(["missing"]));

        let err = layout.validate(&registry, tenant, EntityType::Agent).unwrap_err();
        assert!(matches!(err, LayoutError::Field(_)));
    }

    #[test]
    fn test_validate_rejects_disabled_field() {
        let tenant = Uuid::now_v7();
        let registry = registry_with(tenant, &["name"]);
        registry.disable(tenant, EntityType::Agent, "name").unwrap();
        let layout = Layout::new("agent_onboarding", "new")
            .with_section(Section::new("identity", "Identity", 10).with_fields(["name"]));

        let err = layout.validate(&registry, tenant, EntityType::Agent).unwrap_err();
        assert!(matches!(err, LayoutError::DisabledField { .. }));
    }

    #[test]
    fn test_ordered_sections_ties_break_by_id() {
        let layout = Layout::new("agent_onboarding", "new")
            .with_section(Section::new("zeta", "Z", 10))
            .with_section(Section::new("alpha", "A", 10))
            .with_section(Section::new("first", "F", 5));

        let ids: Vec<&str> = layout.ordered_sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "alpha", "zeta"]);
    }

    #[test]
    fn test_section_agent_filter() {
        let open = Section::new("identity", "Identity", 10);
        assert!(open.applies_to(None, None));
        assert!(open.applies_to(Some("chatbot"), None));

        let restricted = Section::new("model", "Model", 20).with_agent_types(["llm", "ml_model"]);
        assert!(restricted.applies_to(Some("llm"), None));
        assert!(restricted.applies_to(None, Some("ml_model")));
        assert!(!restricted.applies_to(Some("chatbot"), None));
        assert!(!restricted.applies_to(None, None));
    }
}
