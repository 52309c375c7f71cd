//! # Field Access
//!
//! Core permission value types: the resolved `{view, edit}` pair and the
//! partial override applied by the more specific permission tiers.

use serde::{Deserialize, Serialize};

/// Resolved access to a single field for a single role.
///
/// This is the output type of permission resolution; call sites depend on
/// it and never on the raw override records.
///
/// # Examples
///
/// ```
/// use trellis_access::FieldAccess;
///
/// let access = FieldAccess::deny();
/// assert!(!access.view);
/// assert!(!access.edit);
///
/// // edit without view is meaningless and gets normalized away
/// let odd = FieldAccess { view: false, edit: true };
/// assert_eq!(odd.normalized(), FieldAccess { view: true, edit: true });
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FieldAccess {
    /// Whether the field is visible.
    pub view: bool,
    /// Whether the field is editable.
    pub edit: bool,
}

impl FieldAccess {
    /// No access at all. The fail-closed default when no baseline exists.
    pub fn deny() -> Self {
        Self {
            view: false,
            edit: false,
        }
    }

    /// Visible but not editable.
    pub fn read_only() -> Self {
        Self {
            view: true,
            edit: false,
        }
    }

    /// Visible and editable.
    pub fn editable() -> Self {
        Self {
            view: true,
            edit: true,
        }
    }

    /// Enforce the edit-implies-view invariant.
    ///
    /// A misconfigured override can produce `edit=true, view=false`; the
    /// normalized form promotes `view` to `true` in that case.
    pub fn normalized(self) -> Self {
        Self {
            view: self.view || self.edit,
            edit: self.edit,
        }
    }
}

/// Partial `{view, edit}` override from a more specific permission tier.
///
/// A key set to `None` inherits the value from the less specific tier; a
/// key set to `Some(false)` explicitly revokes an inherited `true`. An
/// override with both keys `None` behaves identically to no record.
///
/// # Examples
///
/// ```
/// use trellis_access::{AccessOverride, FieldAccess};
///
/// let base = FieldAccess::read_only();
/// let grant_edit = AccessOverride::default().with_edit(true);
/// assert_eq!(grant_edit.apply(base), FieldAccess { view: true, edit: true });
///
/// // revoking view also clears an inherited edit grant
/// let revoke_view = AccessOverride::default().with_view(false);
/// assert_eq!(revoke_view.apply(FieldAccess::editable()), FieldAccess::deny());
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessOverride {
    /// Override for `view`, or `None` to inherit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<bool>,

    /// Override for `edit`, or `None` to inherit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,
}

impl AccessOverride {
    /// Set the `view` override.
    pub fn with_view(mut self, view: bool) -> Self {
        self.view = Some(view);
        self
    }

    /// Set the `edit` override.
    pub fn with_edit(mut self, edit: bool) -> Self {
        self.edit = Some(edit);
        self
    }

    /// Check whether this override inherits everything.
    pub fn is_inherit(&self) -> bool {
        self.view.is_none() && self.edit.is_none()
    }

    /// Apply this override on top of a less specific access value.
    ///
    /// Keys present in the override replace the base value; absent keys
    /// inherit it. An explicit `view: false` also clears an inherited
    /// `edit`, so a revoked field cannot be resurrected by the
    /// edit-implies-view normalization; an override that sets `edit`
    /// itself keeps that value.
    pub fn apply(&self, base: FieldAccess) -> FieldAccess {
        let edit = match (self.view, self.edit) {
            (Some(false), None) => false,
            (_, edit) => edit.unwrap_or(base.edit),
        };
        FieldAccess {
            view: self.view.unwrap_or(base.view),
            edit,
        }
    }
}
