//! # Error Handling
//!
//! Unified error type for fieldguard operations.
//!
//! Field denial on the read path is not an error: denied fields are simply
//! omitted from the projection. Every other failure surfaces as one of the
//! variants below and fails the whole read or write operation.

use thiserror::Error;

/// Boxed error returned by user supplied permission predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for the entire crate.
#[derive(Error, Debug)]
pub enum GuardError {
    // ========== Configuration Errors ==========
    /// Invalid schema declaration or policy configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field was explicitly requested but has no descriptor in the schema
    #[error("Field not found: {field} in schema {schema}")]
    FieldNotFound { schema: String, field: String },

    // ========== Permission Errors ==========
    /// One or more patch keys failed their write permission check.
    ///
    /// The whole patch is rejected; `denied` lists the offending keys for
    /// diagnostics only and implies nothing about the other keys.
    #[error("insufficient permission")]
    InsufficientPermission { denied: Vec<String> },

    /// A user supplied permission predicate failed
    #[error("Permission predicate for field {field} failed: {source}")]
    Predicate {
        field: String,
        #[source]
        source: BoxError,
    },

    // ========== Data Errors ==========
    /// A value does not fit the declared kind of its field
    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Failure reported by the storage collaborator
    #[error("Storage error: {0}")]
    Storage(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    /// Returns true when the error is the aggregate write denial.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::InsufficientPermission { .. })
    }

    /// Keys that caused an [`GuardError::InsufficientPermission`], empty otherwise.
    #[must_use]
    pub fn denied_fields(&self) -> &[String] {
        match self {
            Self::InsufficientPermission { denied } => denied,
            _ => &[],
        }
    }
}

/// Conversion from serde_json::Error to GuardError
impl From<serde_json::Error> for GuardError {
    fn from(error: serde_json::Error) -> Self {
        GuardError::Serialization(error.to_string())
    }
}

/// Conversion from toml::de::Error to GuardError
impl From<toml::de::Error> for GuardError {
    fn from(error: toml::de::Error) -> Self {
        GuardError::Config(error.to_string())
    }
}

/// Result type alias for operations that can result in a GuardError
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_permission_message() {
        let err = GuardError::InsufficientPermission {
            denied: vec!["falsy".to_string()],
        };
        assert_eq!(err.to_string(), "insufficient permission");
        assert!(err.is_permission_denied());
        assert_eq!(err.denied_fields(), ["falsy".to_string()]);
    }

    #[test]
    fn test_storage_error_is_not_permission_error() {
        let err = GuardError::Storage("validation failed".to_string());
        assert!(!err.is_permission_denied());
        assert!(err.denied_fields().is_empty());
    }

    #[test]
    fn test_predicate_error_keeps_source() {
        let source: BoxError = "lookup failed".into();
        let err = GuardError::Predicate {
            field: "func".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("func"));
    }
}
