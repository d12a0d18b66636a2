use crate::permissions::types::{AccessKind, PermissionRule};
use crate::schema::types::Schema;
use std::fmt;
use std::sync::Arc;

/// Shape of the value a field holds.
#[derive(Clone)]
pub enum FieldKind {
    /// Plain value
    Scalar,
    /// Array of plain values
    ScalarArray,
    /// Embedded document governed by its own schema
    Subdocument(Arc<Schema>),
    /// Array of embedded documents sharing one schema
    SubdocumentArray(Arc<Schema>),
    /// Reference to a document of the `target` schema
    Reference { target: String },
    /// Array of references to documents of the `target` schema
    ReferenceArray { target: String },
}

impl FieldKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::ScalarArray => "scalar array",
            Self::Subdocument(_) => "subdocument",
            Self::SubdocumentArray(_) => "subdocument array",
            Self::Reference { .. } => "reference",
            Self::ReferenceArray { .. } => "reference array",
        }
    }

    /// Schema name a reference field points to.
    #[must_use]
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            Self::Reference { target } | Self::ReferenceArray { target } => Some(target),
            _ => None,
        }
    }
}

// Nested schemas print by name only; they can be large.
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("Scalar"),
            Self::ScalarArray => f.write_str("ScalarArray"),
            Self::Subdocument(schema) => write!(f, "Subdocument({})", schema.name()),
            Self::SubdocumentArray(schema) => write!(f, "SubdocumentArray({})", schema.name()),
            Self::Reference { target } => write!(f, "Reference({target})"),
            Self::ReferenceArray { target } => write!(f, "ReferenceArray({target})"),
        }
    }
}

/// Declaration of one schema field and its permission rules.
///
/// A field carries at most one read rule and one write rule. A missing
/// rule means the schema policy default applies.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    read_rule: Option<PermissionRule>,
    write_rule: Option<PermissionRule>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            read_rule: None,
            write_rule: None,
        }
    }

    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar)
    }

    #[must_use]
    pub fn scalar_array(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::ScalarArray)
    }

    #[must_use]
    pub fn subdocument(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::new(name, FieldKind::Subdocument(schema))
    }

    #[must_use]
    pub fn subdocument_array(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::new(name, FieldKind::SubdocumentArray(schema))
    }

    #[must_use]
    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Reference {
                target: target.into(),
            },
        )
    }

    #[must_use]
    pub fn reference_array(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::ReferenceArray {
                target: target.into(),
            },
        )
    }

    /// Sets the read rule, replacing any previous one.
    #[must_use]
    pub fn can_read(mut self, rule: impl Into<PermissionRule>) -> Self {
        self.read_rule = Some(rule.into());
        self
    }

    /// Sets the write rule, replacing any previous one.
    #[must_use]
    pub fn can_write(mut self, rule: impl Into<PermissionRule>) -> Self {
        self.write_rule = Some(rule.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub fn read_rule(&self) -> Option<&PermissionRule> {
        self.read_rule.as_ref()
    }

    #[must_use]
    pub fn write_rule(&self) -> Option<&PermissionRule> {
        self.write_rule.as_ref()
    }

    #[must_use]
    pub fn rule(&self, access: AccessKind) -> Option<&PermissionRule> {
        match access {
            AccessKind::Read => self.read_rule(),
            AccessKind::Write => self.write_rule(),
        }
    }
}
