//! # Trellis Layout
//!
//! Stage-scoped form layouts and role-specific view generation for the
//! Trellis platform.
//!
//! ## Overview
//!
//! The trellis-layout crate handles:
//! - **Layouts**: Ordered grouping of catalog fields into sections for a
//!   (request_type, workflow_stage) pair
//! - **Layout store**: Tenant-scoped storage of authored layouts
//! - **View generation**: Combining a layout with permission resolution
//!   into the tab/section/field structure one role sees
//!
//! ## Architecture
//!
//! ```text
//! FormView = Layout(request_type, stage) × resolve(field, role) per field
//!
//! - field included   iff resolved view = true
//! - can_edit         =   resolved edit
//! - section omitted  iff zero visible fields (recorded, not silent)
//! - section order    =   ascending order, ties by section id
//! ```
//!
//! A missing layout is an explicit [`LayoutError::NotFound`], never an
//! empty view, so callers can distinguish "nothing to show" from
//! "misconfigured".

pub mod error;
pub mod layout;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use error::{LayoutError, LayoutResult};
pub use layout::{Layout, Section};
pub use store::LayoutStore;
pub use view::{FieldView, FormView, SectionView, TabView, ViewGenerator, ViewRequest};
