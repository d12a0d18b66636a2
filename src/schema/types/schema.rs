use crate::document::Document;
use crate::error::{GuardError, GuardResult};
use crate::permissions::types::PermissionsPolicy;
use crate::schema::types::FieldDescriptor;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type VirtualGetter = dyn Fn(&Document) -> Value + Send + Sync;

/// Computed, non-stored field.
///
/// Virtual fields are copied into a projection only when requested and are
/// never permission checked.
#[derive(Clone)]
pub struct VirtualField {
    name: String,
    getter: Arc<VirtualGetter>,
}

impl VirtualField {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn compute(&self, document: &Document) -> Value {
        (self.getter)(document)
    }
}

impl fmt::Debug for VirtualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable description of a governed document type.
///
/// Fields keep their declaration order. The [`PermissionsPolicy`] is fixed at
/// build time.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    virtuals: Vec<VirtualField>,
    policy: PermissionsPolicy,
}

impl Schema {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            virtuals: Vec::new(),
            policy: PermissionsPolicy::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn policy(&self) -> &PermissionsPolicy {
        &self.policy
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    /// Like [`Schema::field`] but a missing descriptor is a configuration error.
    pub fn require_field(&self, name: &str) -> GuardResult<&FieldDescriptor> {
        self.field(name).ok_or_else(|| GuardError::FieldNotFound {
            schema: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn virtuals(&self) -> impl Iterator<Item = &VirtualField> {
        self.virtuals.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder returned by [`Schema::builder`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    virtuals: Vec<VirtualField>,
    policy: PermissionsPolicy,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    #[must_use]
    pub fn virtual_field<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Document) -> Value + Send + Sync + 'static,
    {
        self.virtuals.push(VirtualField {
            name: name.into(),
            getter: Arc::new(getter),
        });
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: PermissionsPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Finalizes the schema.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] for an empty schema name, an empty field
    /// name, or a name declared twice (stored and virtual fields share one
    /// namespace).
    pub fn build(self) -> GuardResult<Arc<Schema>> {
        if self.name.trim().is_empty() {
            return Err(GuardError::Config("Schema name cannot be empty".to_string()));
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        for (position, descriptor) in self.fields.iter().enumerate() {
            if descriptor.name().is_empty() {
                return Err(GuardError::Config(format!(
                    "Schema {} declares a field with an empty name",
                    self.name
                )));
            }
            if index.insert(descriptor.name().to_string(), position).is_some() {
                return Err(GuardError::Config(format!(
                    "Field {} declared more than once in schema {}",
                    descriptor.name(),
                    self.name
                )));
            }
        }
        for virtual_field in &self.virtuals {
            if index.contains_key(virtual_field.name())
                || self
                    .virtuals
                    .iter()
                    .filter(|other| other.name() == virtual_field.name())
                    .count()
                    > 1
            {
                return Err(GuardError::Config(format!(
                    "Virtual field {} collides with another field in schema {}",
                    virtual_field.name(),
                    self.name
                )));
            }
        }

        Ok(Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            index,
            virtuals: self.virtuals,
            policy: self.policy,
        }))
    }
}
