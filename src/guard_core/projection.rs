use crate::document::{Document, FieldValue, Reference};
use crate::error::GuardResult;
use crate::permissions::permission_manager::PermissionManager;
use crate::permissions::types::Context;
use crate::schema::types::FieldDescriptor;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options for a projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// Copy computed fields into the output. They are not permission checked.
    #[serde(default)]
    pub virtuals: bool,
}

impl ProjectionOptions {
    #[must_use]
    pub fn with_virtuals() -> Self {
        Self { virtuals: true }
    }
}

/// Builds redacted views of governed documents.
///
/// Every declared field of the document's schema is checked against the
/// context. Denied fields and fields without a value are left out of the
/// output entirely. Sub-documents and populated references are projected
/// recursively with the same context; unpopulated references are emitted
/// as their id.
///
/// All fields of one document are checked concurrently, and a document's
/// projection completes only once every field has an outcome. The first
/// error (a failing predicate, say) fails the whole projection.
#[derive(Debug, Default, Clone)]
pub struct Projector {
    permission_manager: PermissionManager,
}

impl Projector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects every readable field of `document`.
    ///
    /// The result is a fresh JSON object; changing it never touches the
    /// document. Key order carries no meaning.
    pub async fn project(
        &self,
        context: &Context,
        document: &Document,
        options: &ProjectionOptions,
    ) -> GuardResult<Value> {
        self.project_document(context, document, options)
            .await
            .map(Value::Object)
    }

    /// Projects only the named fields of `document`.
    ///
    /// # Errors
    ///
    /// A name with no descriptor in the schema is a configuration error
    /// ([`crate::GuardError::FieldNotFound`]); nothing is evaluated in that case.
    pub async fn project_fields(
        &self,
        context: &Context,
        document: &Document,
        field_names: &[&str],
        options: &ProjectionOptions,
    ) -> GuardResult<Value> {
        let schema = document.schema();
        let descriptors = field_names
            .iter()
            .map(|name| schema.require_field(name))
            .collect::<GuardResult<Vec<_>>>()?;

        self.project_descriptors(context, document, descriptors, options)
            .await
            .map(Value::Object)
    }

    fn project_document<'a>(
        &'a self,
        context: &'a Context,
        document: &'a Document,
        options: &'a ProjectionOptions,
    ) -> BoxFuture<'a, GuardResult<Map<String, Value>>> {
        let descriptors = document.schema().fields().collect();
        self.project_descriptors(context, document, descriptors, options)
    }

    // Boxed so nested documents can recurse back into it.
    fn project_descriptors<'a>(
        &'a self,
        context: &'a Context,
        document: &'a Document,
        descriptors: Vec<&'a FieldDescriptor>,
        options: &'a ProjectionOptions,
    ) -> BoxFuture<'a, GuardResult<Map<String, Value>>> {
        async move {
            let branches = descriptors
                .into_iter()
                .map(|descriptor| self.project_field(context, document, descriptor, options));
            let outcomes = try_join_all(branches).await?;

            let mut projected: Map<String, Value> = outcomes.into_iter().flatten().collect();
            if options.virtuals {
                for virtual_field in document.schema().virtuals() {
                    projected.insert(
                        virtual_field.name().to_string(),
                        virtual_field.compute(document),
                    );
                }
            }
            Ok(projected)
        }
        .boxed()
    }

    async fn project_field(
        &self,
        context: &Context,
        document: &Document,
        descriptor: &FieldDescriptor,
        options: &ProjectionOptions,
    ) -> GuardResult<Option<(String, Value)>> {
        let name = descriptor.name();
        let allowed = self
            .permission_manager
            .resolve(
                name,
                descriptor.read_rule(),
                context,
                document,
                document.schema().policy().default_can_read,
            )
            .await?;

        if !allowed {
            debug!("read of {}.{} denied", document.schema().name(), name);
            return Ok(None);
        }
        let Some(value) = document.get(name) else {
            return Ok(None);
        };

        let projected = self.project_value(context, value, options).await?;
        Ok(Some((name.to_string(), projected)))
    }

    async fn project_value(
        &self,
        context: &Context,
        value: &FieldValue,
        options: &ProjectionOptions,
    ) -> GuardResult<Value> {
        match value {
            FieldValue::Scalar(value) => Ok(value.clone()),
            FieldValue::Subdocument(document) => self
                .project_document(context, document, options)
                .await
                .map(Value::Object),
            FieldValue::Subdocuments(documents) => {
                let elements = documents
                    .iter()
                    .map(|document| self.project_document(context, document, options));
                let projected = try_join_all(elements).await?;
                Ok(Value::Array(projected.into_iter().map(Value::Object).collect()))
            }
            FieldValue::Reference(reference) => {
                self.project_reference(context, reference, options).await
            }
            FieldValue::References(references) => {
                let elements = references
                    .iter()
                    .map(|reference| self.project_reference(context, reference, options));
                Ok(Value::Array(try_join_all(elements).await?))
            }
        }
    }

    async fn project_reference(
        &self,
        context: &Context,
        reference: &Reference,
        options: &ProjectionOptions,
    ) -> GuardResult<Value> {
        match reference {
            Reference::Id(id) => Ok(Value::String(id.clone())),
            Reference::Populated(document) => self
                .project_document(context, document, options)
                .await
                .map(Value::Object),
        }
    }
}
