//! View generation
//!
//! Combines an authored layout with permission resolution into the
//! tab/section/field structure one role sees at one workflow stage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trellis_access::{PermissionResolver, Role};
use trellis_fields::EntityType;

use crate::error::LayoutResult;
use crate::store::LayoutStore;

/// Default tab for sections that do not declare one.
const DEFAULT_TAB: &str = "details";

/// Parameters for generating a role-specific view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRequest {
    /// Tenant the view is generated in.
    pub tenant_id: Uuid,

    /// Entity type the fields belong to.
    pub entity_type: EntityType,

    /// Request type selecting the layout.
    pub request_type: String,

    /// Workflow stage selecting the layout.
    pub workflow_stage: String,

    /// Role the view is generated for.
    pub role: Role,

    /// Agent type for section filtering, if the entity is an agent.
    pub agent_type: Option<String>,

    /// Agent category for section filtering, if the entity is an agent.
    pub agent_category: Option<String>,
}

impl ViewRequest {
    /// Create a view request without agent filtering.
    pub fn new(
        tenant_id: Uuid,
        entity_type: EntityType,
        request_type: impl Into<String>,
        workflow_stage: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            tenant_id,
            entity_type,
            request_type: request_type.into(),
            workflow_stage: workflow_stage.into(),
            role,
            agent_type: None,
            agent_category: None,
        }
    }

    /// Set the agent type filter.
    pub fn with_agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    /// Set the agent category filter.
    pub fn with_agent_category(mut self, agent_category: impl Into<String>) -> Self {
        self.agent_category = Some(agent_category.into());
        self
    }
}

/// One field in a generated view. Present only when the role can see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldView {
    /// Catalog field name.
    pub name: String,
    /// Whether the role may edit the field at this stage.
    pub can_edit: bool,
}

/// One section in a generated view, containing only visible fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionView {
    /// Section id from the layout.
    pub id: String,
    /// Section title.
    pub title: String,
    /// Tab the section belongs to.
    pub tab: String,
    /// Visible fields in layout order.
    pub fields: Vec<FieldView>,
}

/// One tab in a generated view, referencing its sections by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabView {
    /// Tab label.
    pub title: String,
    /// Section ids shown under this tab, in display order.
    pub section_ids: Vec<String>,
}

/// The role-specific form structure for one stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormView {
    /// Request type the view was generated for.
    pub request_type: String,

    /// Workflow stage the view was generated for.
    pub workflow_stage: String,

    /// Tabs in order of first appearance.
    pub tabs: Vec<TabView>,

    /// Sections with at least one visible field, in display order.
    pub sections: Vec<SectionView>,

    /// Section ids dropped because permission filtering left them with
    /// zero visible fields. Informational; callers may ignore it.
    pub omitted_sections: Vec<String>,
}

/// Generates role-specific views from layouts and resolved permissions.
///
/// Stateless and safe to call concurrently; repeated calls with unchanged
/// configuration produce identical output.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use trellis_access::{FieldAccess, PermissionResolver, PermissionStore, Role};
/// use trellis_fields::{EntityType, FieldDef, FieldKind, FieldRegistry};
/// use trellis_layout::{Layout, LayoutStore, Section, ViewGenerator, ViewRequest};
///
/// let registry = Arc::new(FieldRegistry::new());
/// let permissions = Arc::new(PermissionStore::new());
/// let layouts = Arc::new(LayoutStore::new());
/// let tenant = Uuid::now_v7();
///
/// registry
///     .register(tenant, FieldDef::new(EntityType::Agent, "name", FieldKind::Text))
///     .unwrap();
/// permissions.set_baseline(tenant, EntityType::Agent, Role::VendorUser, FieldAccess::read_only());
/// layouts.set(
///     tenant,
///     Layout::new("agent_onboarding", "new")
///         .with_section(Section::new("identity", "Identity", 10).with_fields(["name"])),
/// );
///
/// let generator = ViewGenerator::new(
///     Arc::clone(&layouts),
///     PermissionResolver::new(registry, permissions),
/// );
/// let view = generator
///     .generate(&ViewRequest::new(tenant, EntityType::Agent, "agent_onboarding", "new", Role::VendorUser))
///     .unwrap();
/// assert_eq!(view.sections.len(), 1);
/// assert!(!view.sections[0].fields[0].can_edit);
/// ```
#[derive(Debug, Clone)]
pub struct ViewGenerator {
    layouts: Arc<LayoutStore>,
    resolver: PermissionResolver,
}

impl ViewGenerator {
    /// Create a generator over a layout store and permission resolver.
    pub fn new(layouts: Arc<LayoutStore>, resolver: PermissionResolver) -> Self {
        Self { layouts, resolver }
    }

    /// Generate the view one role sees for one (request_type, stage).
    ///
    /// Rules:
    /// - A field is included iff its resolved `view` is true; `can_edit`
    ///   carries the resolved `edit`.
    /// - Sections are emitted in ascending `order`, ties broken by id.
    /// - Sections whose agent-type restriction does not match the request
    ///   are skipped.
    /// - Sections left empty by permission filtering are omitted from
    ///   `sections` but listed in `omitted_sections`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LayoutError::NotFound`] when no layout is
    /// configured, and configuration errors from permission resolution.
    pub fn generate(&self, request: &ViewRequest) -> LayoutResult<FormView> {
        let layout = self.layouts.require(
            request.tenant_id,
            &request.request_type,
            &request.workflow_stage,
        )?;

        let mut sections = Vec::new();
        let mut omitted_sections = Vec::new();

        for section in layout.ordered_sections() {
            if !section.applies_to(request.agent_type.as_deref(), request.agent_category.as_deref())
            {
                continue;
            }

            let mut fields = Vec::new();
            for field_name in &section.field_names {
                let access = self.resolver.resolve(
                    request.tenant_id,
                    request.entity_type,
                    field_name,
                    &request.request_type,
                    &request.workflow_stage,
                    request.role,
                )?;
                if access.view {
                    fields.push(FieldView {
                        name: field_name.clone(),
                        can_edit: access.edit,
                    });
                }
            }

            if fields.is_empty() {
                omitted_sections.push(section.id.clone());
            } else {
                sections.push(SectionView {
                    id: section.id.clone(),
                    title: section.title.clone(),
                    tab: section.tab.clone().unwrap_or_else(|| DEFAULT_TAB.to_string()),
                    fields,
                });
            }
        }

        let tabs = Self::group_tabs(&sections);

        Ok(FormView {
            request_type: request.request_type.clone(),
            workflow_stage: request.workflow_stage.clone(),
            tabs,
            sections,
            omitted_sections,
        })
    }

    /// Group emitted sections into tabs, in order of first appearance.
    fn group_tabs(sections: &[SectionView]) -> Vec<TabView> {
        let mut tabs: Vec<TabView> = Vec::new();
        for section in sections {
            match tabs.iter_mut().find(|t| t.title == section.tab) {
                Some(tab) => tab.section_ids.push(section.id.clone()),
                None => tabs.push(TabView {
                    title: section.tab.clone(),
                    section_ids: vec![section.id.clone()],
                }),
            }
        }
        tabs
    }
}
