use crate::document::Document;
use crate::schema::types::FieldKind;
use serde_json::Value;

/// A reference slot: either the bare id of the target document, or the
/// target itself once the storage layer has populated it.
#[derive(Debug, Clone)]
pub enum Reference {
    Id(String),
    Populated(Box<Document>),
}

impl Reference {
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    #[must_use]
    pub fn populated(document: Document) -> Self {
        Self::Populated(Box::new(document))
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }

    /// Id of the target, when known. A populated target that was never
    /// saved has none.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Populated(document) => document.id(),
        }
    }

    /// Collapses a populated reference back to its id.
    #[must_use]
    pub fn depopulate(self) -> Self {
        match self {
            Self::Populated(document) => match document.id() {
                Some(id) => Self::Id(id.to_string()),
                None => Self::Populated(document),
            },
            id => id,
        }
    }
}

/// Value stored in a document field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Plain value, or array of plain values
    Scalar(Value),
    /// Embedded governed document
    Subdocument(Box<Document>),
    /// Array of embedded governed documents
    Subdocuments(Vec<Document>),
    Reference(Reference),
    References(Vec<Reference>),
}

impl FieldValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// True when this value holds at least one populated reference.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Reference(reference) => reference.is_populated(),
            Self::References(references) => references.iter().any(Reference::is_populated),
            _ => false,
        }
    }

    /// Checks that this value fits a field of the given kind.
    ///
    /// Nested documents must carry the declared schema (by name), populated
    /// references must point at the declared target schema.
    pub fn check_kind(&self, kind: &FieldKind) -> Result<(), String> {
        match (kind, self) {
            (FieldKind::Scalar, Self::Scalar(Value::Array(_))) => {
                Err("expected a scalar, found an array".to_string())
            }
            (FieldKind::Scalar, Self::Scalar(_)) => Ok(()),
            (FieldKind::ScalarArray, Self::Scalar(Value::Array(_) | Value::Null)) => Ok(()),
            (FieldKind::Subdocument(schema), Self::Subdocument(document)) => {
                check_schema(schema.name(), document)
            }
            (FieldKind::SubdocumentArray(schema), Self::Subdocuments(documents)) => documents
                .iter()
                .try_for_each(|document| check_schema(schema.name(), document)),
            (FieldKind::Reference { target }, Self::Reference(reference)) => {
                check_reference(target, reference)
            }
            (FieldKind::ReferenceArray { target }, Self::References(references)) => references
                .iter()
                .try_for_each(|reference| check_reference(target, reference)),
            (kind, value) => Err(format!(
                "expected a {}, found {}",
                kind.label(),
                value.label()
            )),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Scalar(Value::Array(_)) => "an array of scalars",
            Self::Scalar(_) => "a scalar",
            Self::Subdocument(_) => "a subdocument",
            Self::Subdocuments(_) => "an array of subdocuments",
            Self::Reference(_) => "a reference",
            Self::References(_) => "an array of references",
        }
    }
}

fn check_schema(expected: &str, document: &Document) -> Result<(), String> {
    if document.schema().name() == expected {
        Ok(())
    } else {
        Err(format!(
            "expected a {} document, found {}",
            expected,
            document.schema().name()
        ))
    }
}

fn check_reference(target: &str, reference: &Reference) -> Result<(), String> {
    match reference {
        Reference::Id(_) => Ok(()),
        Reference::Populated(document) => check_schema(target, document),
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(Value::String(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Value::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Value::from(value))
    }
}

impl From<Document> for FieldValue {
    fn from(document: Document) -> Self {
        Self::Subdocument(Box::new(document))
    }
}

impl From<Vec<Document>> for FieldValue {
    fn from(documents: Vec<Document>) -> Self {
        Self::Subdocuments(documents)
    }
}

impl From<Reference> for FieldValue {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl From<Vec<Reference>> for FieldValue {
    fn from(references: Vec<Reference>) -> Self {
        Self::References(references)
    }
}
