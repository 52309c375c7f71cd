//! Layout store
//!
//! Read-mostly store of authored layouts, keyed by
//! (tenant, request_type, workflow_stage). Administrative writes are
//! visible to subsequent view generation without a restart.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::error::{LayoutError, LayoutResult};
use crate::layout::Layout;

/// Store of authored layouts.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_layout::{Layout, LayoutStore, Section};
///
/// let store = LayoutStore::new();
/// let tenant = Uuid::now_v7();
///
/// let layout = Layout::new("agent_onboarding", "new")
///     .with_section(Section::new("identity", "Identity", 10).with_fields(["name"]));
/// store.set(tenant, layout);
///
/// assert!(store.get(tenant, "agent_onboarding", "new").is_some());
/// assert!(store.get(tenant, "agent_onboarding", "pending_approval").is_none());
/// ```
#[derive(Debug, Default)]
pub struct LayoutStore {
    /// (tenant, request_type, workflow_stage) -> layout.
    layouts: RwLock<HashMap<(Uuid, String, String), Layout>>,
}

impl LayoutStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a layout, replacing any previous layout for the same
    /// (request_type, workflow_stage) pair.
    pub fn set(&self, tenant_id: Uuid, layout: Layout) {
        let key = (
            tenant_id,
            layout.request_type.clone(),
            layout.workflow_stage.clone(),
        );
        let mut layouts = self.layouts.write().unwrap_or_else(PoisonError::into_inner);
        layouts.insert(key, layout);
    }

    /// Look up a layout.
    pub fn get(&self, tenant_id: Uuid, request_type: &str, workflow_stage: &str) -> Option<Layout> {
        let layouts = self.layouts.read().unwrap_or_else(PoisonError::into_inner);
        layouts
            .get(&(tenant_id, request_type.to_string(), workflow_stage.to_string()))
            .cloned()
    }

    /// Look up a layout, failing explicitly when none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotFound`] — never an empty layout — so
    /// callers can tell "nothing to show" apart from "misconfigured".
    pub fn require(
        &self,
        tenant_id: Uuid,
        request_type: &str,
        workflow_stage: &str,
    ) -> LayoutResult<Layout> {
        self.get(tenant_id, request_type, workflow_stage)
            .ok_or_else(|| LayoutError::NotFound {
                request_type: request_type.to_string(),
                workflow_stage: workflow_stage.to_string(),
            })
    }
}
