//! # fieldguard
//!
//! Field-level read/write access control for schema-governed documents.
//!
//! Each schema field may declare a read rule and a write rule: a fixed
//! boolean, or a predicate over a caller-supplied [`Context`] that may
//! complete asynchronously. Fields without a rule fall back to the schema's
//! [`PermissionsPolicy`].
//!
//! ## Core Components
//!
//! * `permissions` - Rule model and the resolver that evaluates it
//! * `schema` - Field descriptors and schemas
//! * `document` - Governed document instances, values and patches
//! * `guard_core` - The projector (read path) and updater (write path)
//! * `store` - The storage collaborator interface and an in-memory store
//! * `config` - Default-permission configuration from TOML or JSON
//! * `logging` - `env_logger` setup for the `log` output of this crate
//! * `error` - Error types
//!
//! ## Example
//!
//! ```rust
//! use fieldguard::{Context, Document, FieldDescriptor, MemoryStore, Patch, PermissionRule,
//!     ProjectionOptions, Schema};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::builder("Account")
//!     .field(FieldDescriptor::scalar("name").can_write(PermissionRule::allow()))
//!     .field(
//!         FieldDescriptor::scalar("email")
//!             .can_read(PermissionRule::predicate(|_, ctx| ctx.get("admin").cloned())),
//!     )
//!     .build()?;
//!
//! let store = MemoryStore::new();
//! let mut account =
//!     Document::from_json(schema, json!({"name": "ada", "email": "ada@example.com"}))?;
//!
//! let public = account.read(&Context::none(), &ProjectionOptions::default()).await?;
//! assert_eq!(public, json!({"name": "ada"}));
//!
//! account.write(&store, &Context::none(), Patch::new().set("name", "ada l.")).await?;
//! assert!(account.write(&store, &Context::none(), Patch::new().set("email", "x")).await.is_err());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod guard_core;
pub mod logging;
pub mod permissions;
pub mod schema;
pub mod store;
pub mod testing;

pub use config::GuardConfig;
pub use document::{Document, FieldValue, Patch, Reference};
pub use error::{BoxError, GuardError, GuardResult};
pub use guard_core::{ProjectionOptions, Projector, Updater};
pub use logging::LoggingSystem;
pub use permissions::{
    AccessKind, Context, DecisionSource, FieldPermissionResult, PermissionManager,
    PermissionRule, PermissionWrapper, PermissionsPolicy,
};
pub use schema::{FieldDescriptor, FieldKind, Schema, SchemaBuilder, VirtualField};
pub use store::{DocumentStore, MemoryStore};
