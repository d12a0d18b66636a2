//! # Schema Declarations
//!
//! A [`Schema`] lists the fields of a governed document type, the shape of
//! each field's value and the optional read/write rules attached to it.
//! Schemas are built once through [`Schema::builder`] and shared behind an
//! `Arc` by every document of that type.

pub mod types;

pub use types::{FieldDescriptor, FieldKind, Schema, SchemaBuilder, VirtualField};
