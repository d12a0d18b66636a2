//! # Governed Documents
//!
//! A [`Document`] is a runtime instance of a [`Schema`]. It owns its field
//! values, embeds governed sub-documents by value and holds references to
//! other documents either as bare ids or, once the storage layer has
//! resolved them, as populated documents.
//!
//! The two guarded operations hang off the document itself:
//!
//! * [`Document::read`] - redacted projection for a caller context
//! * [`Document::write`] - all-or-nothing partial update for a caller context

pub mod patch;
pub mod value;

pub use patch::Patch;
pub use value::{FieldValue, Reference};

use crate::error::{GuardError, GuardResult};
use crate::guard_core::{ProjectionOptions, Projector, Updater};
use crate::permissions::types::Context;
use crate::schema::types::{FieldKind, Schema};
use crate::store::DocumentStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Document {
    id: Option<String>,
    schema: Arc<Schema>,
    values: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Creates an empty, unsaved document.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            id: None,
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Creates a document and sets each of `values`, validating every one.
    pub fn with_values<I, K, V>(schema: Arc<Schema>, values: I) -> GuardResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut document = Self::new(schema);
        for (field, value) in values {
            document.set(field.as_ref(), value)?;
        }
        Ok(document)
    }

    /// Hydrates a document from a JSON object, following the schema.
    ///
    /// Sub-document fields take nested objects (or arrays of objects) and
    /// are built against their own schema. Reference fields take string ids
    /// and stay unpopulated.
    ///
    /// # Errors
    ///
    /// [`GuardError::FieldNotFound`] for a key with no descriptor and
    /// [`GuardError::InvalidValue`] for a value of the wrong shape.
    pub fn from_json(schema: Arc<Schema>, json: Value) -> GuardResult<Self> {
        let Value::Object(members) = json else {
            return Err(GuardError::InvalidValue {
                field: schema.name().to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };

        let mut document = Self::new(schema.clone());
        for (field, raw) in members {
            let descriptor = schema.require_field(&field)?;
            let value = hydrate(&field, descriptor.kind(), raw)?;
            document.set(&field, value)?;
        }
        Ok(document)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Current value of a scalar field.
    #[must_use]
    pub fn get_scalar(&self, field: &str) -> Option<&Value> {
        self.get(field).and_then(FieldValue::as_scalar)
    }

    /// Fields that currently hold a value.
    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Sets one field after checking it against the schema.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> GuardResult<()> {
        let value = value.into();
        self.validate_value(field, &value)?;
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Checks that `value` may be stored in `field` without storing it.
    pub fn validate_value(&self, field: &str, value: &FieldValue) -> GuardResult<()> {
        let descriptor = self.schema.require_field(field)?;
        value
            .check_kind(descriptor.kind())
            .map_err(|reason| GuardError::InvalidValue {
                field: field.to_string(),
                reason,
            })
    }

    /// Stores a value that has already passed [`Document::validate_value`].
    pub(crate) fn insert_validated(&mut self, field: String, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    /// True when `field` holds at least one resolved reference.
    #[must_use]
    pub fn is_populated(&self, field: &str) -> bool {
        self.get(field).is_some_and(FieldValue::is_populated)
    }

    /// Redacted view of this document for `context`.
    ///
    /// Fields the context may not read are absent from the result. Nested
    /// governed documents are filtered by their own schema's rules.
    pub async fn read(&self, context: &Context, options: &ProjectionOptions) -> GuardResult<Value> {
        Projector::new().project(context, self, options).await
    }

    /// Applies `patch` if `context` may write every field it names, then
    /// persists through `store`.
    ///
    /// On any failure this document is left unchanged. On success it is
    /// replaced with the saved document, which is also returned.
    pub async fn write<S>(
        &mut self,
        store: &S,
        context: &Context,
        patch: Patch,
    ) -> GuardResult<Document>
    where
        S: DocumentStore + ?Sized,
    {
        Updater::new().update(store, context, self, patch).await
    }
}

fn hydrate(field: &str, kind: &FieldKind, raw: Value) -> GuardResult<FieldValue> {
    let invalid = |reason: &str| GuardError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    match kind {
        FieldKind::Scalar | FieldKind::ScalarArray => Ok(FieldValue::Scalar(raw)),
        FieldKind::Subdocument(schema) => {
            Document::from_json(schema.clone(), raw).map(FieldValue::from)
        }
        FieldKind::SubdocumentArray(schema) => match raw {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Document::from_json(schema.clone(), item))
                .collect::<GuardResult<Vec<_>>>()
                .map(FieldValue::Subdocuments),
            _ => Err(invalid("expected an array of objects")),
        },
        FieldKind::Reference { .. } => match raw {
            Value::String(id) => Ok(FieldValue::Reference(Reference::Id(id))),
            _ => Err(invalid("expected a reference id")),
        },
        FieldKind::ReferenceArray { .. } => match raw {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(id) => Ok(Reference::Id(id)),
                    _ => Err(invalid("expected an array of reference ids")),
                })
                .collect::<GuardResult<Vec<_>>>()
                .map(FieldValue::References),
            _ => Err(invalid("expected an array of reference ids")),
        },
    }
}
