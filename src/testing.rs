//! Fixture schemas shared by unit and integration tests.
//!
//! Every fixture declares the same four guarded fields, differing only in
//! the kind of value they hold:
//!
//! * `implicit` - no rules, policy defaults apply
//! * `truthy` - readable and writable by anyone
//! * `falsy` - never readable or writable
//! * `func` - readable and writable when the context itself is truthy

use crate::document::Document;
use crate::permissions::types::{PermissionRule, PermissionsPolicy};
use crate::schema::types::{FieldDescriptor, Schema};
use serde_json::json;
use std::sync::Arc;

/// Predicate rule that permits exactly when the context is truthy.
#[must_use]
pub fn context_echo() -> PermissionRule {
    PermissionRule::predicate(|_, context| context.value().clone())
}

fn guarded_fields<F>(declare: F) -> Vec<FieldDescriptor>
where
    F: Fn(&str) -> FieldDescriptor,
{
    vec![
        declare("implicit"),
        declare("truthy")
            .can_read(PermissionRule::allow())
            .can_write(PermissionRule::allow()),
        declare("falsy")
            .can_read(PermissionRule::deny())
            .can_write(PermissionRule::deny()),
        declare("func")
            .can_read(context_echo())
            .can_write(context_echo()),
    ]
}

fn build(name: &str, fields: Vec<FieldDescriptor>, policy: PermissionsPolicy) -> Arc<Schema> {
    fields
        .into_iter()
        .fold(Schema::builder(name).policy(policy), |builder, field| {
            builder.field(field)
        })
        .build()
        .expect("fixture schema is valid")
}

/// `Test`: scalar fields.
#[must_use]
pub fn test_schema() -> Arc<Schema> {
    build(
        "Test",
        guarded_fields(|name| FieldDescriptor::scalar(name)),
        PermissionsPolicy::default(),
    )
}

/// `Array`: arrays of scalars.
#[must_use]
pub fn array_schema() -> Arc<Schema> {
    build(
        "Array",
        guarded_fields(|name| FieldDescriptor::scalar_array(name)),
        PermissionsPolicy::default(),
    )
}

/// `Embedded`: one `Test` sub-document per field.
#[must_use]
pub fn embedded_schema() -> Arc<Schema> {
    let inner = test_schema();
    build(
        "Embedded",
        guarded_fields(|name| FieldDescriptor::subdocument(name, inner.clone())),
        PermissionsPolicy::default(),
    )
}

/// `Subdocument`: arrays of `Test` sub-documents.
#[must_use]
pub fn subdocument_schema() -> Arc<Schema> {
    let inner = test_schema();
    build(
        "Subdocument",
        guarded_fields(|name| FieldDescriptor::subdocument_array(name, inner.clone())),
        PermissionsPolicy::default(),
    )
}

/// `SubSubdocument`: one readable array of `Subdocument` documents.
#[must_use]
pub fn subsubdocument_schema() -> Arc<Schema> {
    build(
        "SubSubdocument",
        vec![FieldDescriptor::subdocument_array("truthy", subdocument_schema())
            .can_read(PermissionRule::allow())
            .can_write(PermissionRule::allow())],
        PermissionsPolicy::default(),
    )
}

/// `Ref`: references to `Test` documents.
#[must_use]
pub fn ref_schema() -> Arc<Schema> {
    build(
        "Ref",
        guarded_fields(|name| FieldDescriptor::reference(name, "Test")),
        PermissionsPolicy::default(),
    )
}

/// `RefArray`: arrays of references to `Test` documents.
#[must_use]
pub fn refarray_schema() -> Arc<Schema> {
    build(
        "RefArray",
        guarded_fields(|name| FieldDescriptor::reference_array(name, "Test")),
        PermissionsPolicy::default(),
    )
}

/// `Defaults`: a single rule-less field under the given policy.
#[must_use]
pub fn defaults_schema(policy: PermissionsPolicy) -> Arc<Schema> {
    build("Defaults", vec![FieldDescriptor::scalar("implicit")], policy)
}

/// `Test` document holding `{implicit: "a", truthy: "b", falsy: "c", func: "d"}`.
#[must_use]
pub fn test_document() -> Document {
    Document::from_json(
        test_schema(),
        json!({"implicit": "a", "truthy": "b", "falsy": "c", "func": "d"}),
    )
    .expect("fixture document is valid")
}
