//! Platform roles
//!
//! This module defines the closed set of roles that participate in
//! approval pipelines. Role checks elsewhere in the platform match
//! exhaustively on this enum; there are no free-form role strings.

use serde::{Deserialize, Serialize};

/// Role an actor holds within a tenant.
///
/// Roles are partially hierarchical: the two admin roles bypass
/// stage-level role checks, while the reviewer roles are peers that each
/// own specific workflow stages.
///
/// # Permission Model
///
/// - **VendorUser**: Submits and revises entities under review
/// - **ProcurementReviewer**: Reviews commercial fields
/// - **SecurityReviewer**: Reviews security posture fields
/// - **ComplianceReviewer**: Reviews regulatory fields
/// - **TenantAdmin**: Administers one tenant; bypasses stage role checks
/// - **PlatformAdmin**: Administers the platform; bypasses stage role checks
///
/// # Examples
///
/// ```
/// use trellis_access::Role;
///
/// assert!(Role::TenantAdmin.is_admin());
/// assert!(!Role::SecurityReviewer.is_admin());
/// assert_eq!(Role::VendorUser.as_str(), "vendor_user");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits and revises entities under review.
    VendorUser = 0,

    /// Reviews commercial/procurement fields.
    ProcurementReviewer = 1,

    /// Reviews security posture fields.
    SecurityReviewer = 2,

    /// Reviews regulatory/compliance fields.
    ComplianceReviewer = 3,

    /// Tenant administrator (bypasses stage role checks).
    TenantAdmin = 4,

    /// Platform administrator (bypasses stage role checks).
    PlatformAdmin = 5,
}

impl Role {
    /// Check if this role has admin privileges.
    ///
    /// Admin roles bypass per-stage role checks in the workflow engine.
    ///
    /// # Returns
    ///
    /// `true` for TenantAdmin and PlatformAdmin
    pub fn is_admin(&self) -> bool {
        *self >= Role::TenantAdmin
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_access::Role;
    ///
    /// assert_eq!(Role::parse("vendor_user"), Some(Role::VendorUser));
    /// assert_eq!(Role::parse("TENANT_ADMIN"), Some(Role::TenantAdmin));
    /// assert_eq!(Role::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vendor_user" => Some(Self::VendorUser),
            "procurement_reviewer" => Some(Self::ProcurementReviewer),
            "security_reviewer" => Some(Self::SecurityReviewer),
            "compliance_reviewer" => Some(Self::ComplianceReviewer),
            "tenant_admin" => Some(Self::TenantAdmin),
            "platform_admin" => Some(Self::PlatformAdmin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VendorUser => "vendor_user",
            Self::ProcurementReviewer => "procurement_reviewer",
            Self::SecurityReviewer => "security_reviewer",
            Self::ComplianceReviewer => "compliance_reviewer",
            Self::TenantAdmin => "tenant_admin",
            Self::PlatformAdmin => "platform_admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VendorUser => "Vendor User",
            Self::ProcurementReviewer => "Procurement Reviewer",
            Self::SecurityReviewer => "Security Reviewer",
            Self::ComplianceReviewer => "Compliance Reviewer",
            Self::TenantAdmin => "Tenant Admin",
            Self::PlatformAdmin => "Platform Admin",
        }
    }

    /// Get all roles.
    pub fn all() -> &'static [Role] {
        &[
            Role::VendorUser,
            Role::ProcurementReviewer,
            Role::SecurityReviewer,
            Role::ComplianceReviewer,
            Role::TenantAdmin,
            Role::PlatformAdmin,
        ]
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::VendorUser
    }
}
