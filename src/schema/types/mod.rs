pub mod field;
pub mod schema;

pub use field::{FieldDescriptor, FieldKind};
pub use schema::{Schema, SchemaBuilder, VirtualField};
