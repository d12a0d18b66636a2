use serde::{Deserialize, Serialize};
use std::fmt;

/// Default read permission applied to fields that declare no read rule.
pub const DEFAULT_CAN_READ: bool = true;
/// Default write permission applied to fields that declare no write rule.
pub const DEFAULT_CAN_WRITE: bool = false;

/// The two operations a field can be guarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Schema-wide fallback permissions.
///
/// A policy is fixed when a schema is built and is never mutated afterwards.
/// Fields without an explicit rule for an operation take the matching default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsPolicy {
    pub default_can_read: bool,
    pub default_can_write: bool,
}

impl PermissionsPolicy {
    #[must_use]
    pub const fn new(default_can_read: bool, default_can_write: bool) -> Self {
        Self {
            default_can_read,
            default_can_write,
        }
    }

    /// Returns the fallback for the given operation.
    #[must_use]
    pub const fn default_for(&self, access: AccessKind) -> bool {
        match access {
            AccessKind::Read => self.default_can_read,
            AccessKind::Write => self.default_can_write,
        }
    }
}

impl Default for PermissionsPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CAN_READ, DEFAULT_CAN_WRITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_reads_but_does_not_write() {
        let policy = PermissionsPolicy::default();
        assert!(policy.default_for(AccessKind::Read));
        assert!(!policy.default_for(AccessKind::Write));
    }

    #[test]
    fn test_custom_policy() {
        let policy = PermissionsPolicy::new(false, true);
        assert!(!policy.default_for(AccessKind::Read));
        assert!(policy.default_for(AccessKind::Write));
    }
}
