//! # Permissions System
//!
//! The permissions module decides, field by field, whether a caller context
//! may read or write a document.
//!
//! ## Components
//!
//! * `permission_manager` - Resolves one field rule against a context
//! * `permission_wrapper` - Concurrent permission checks over a set of fields
//! * `types` - Rules, contexts and schema-wide default policies
//!
//! Each schema field may carry a read rule and a write rule. A rule is either
//! a fixed boolean or a predicate over the caller context and the document.
//! Fields without a rule fall back to the schema's [`PermissionsPolicy`].

pub mod permission_manager;
pub mod permission_wrapper;
pub mod types;

pub use permission_manager::{DecisionSource, FieldPermissionResult, PermissionManager};
pub use permission_wrapper::PermissionWrapper;
pub use types::{AccessKind, Context, PermissionRule, PermissionsPolicy};
