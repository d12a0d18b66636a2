pub mod policy;
pub mod rule;

pub use policy::{AccessKind, PermissionsPolicy, DEFAULT_CAN_READ, DEFAULT_CAN_WRITE};
pub use rule::{truthy, Context, PermissionRule, Predicate, PredicateOutput};
