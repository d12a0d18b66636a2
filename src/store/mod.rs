//! # Storage Collaborator
//!
//! fieldguard does not store anything itself. Persistence and reference
//! resolution are delegated to a [`DocumentStore`]; the guard calls `save`
//! only after a write has been fully authorized.

pub mod memory;

pub use memory::MemoryStore;

use crate::document::{Document, FieldValue, Reference};
use crate::error::{GuardError, GuardResult};
use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, warn};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a document and returns the canonical saved instance, which
    /// may differ from the input (for example an assigned id).
    async fn save(&self, document: Document) -> GuardResult<Document>;

    /// Looks up a document of schema `target` by id.
    async fn resolve(&self, target: &str, id: &str) -> GuardResult<Option<Document>>;

    /// Replaces the ids held by a reference field with the documents they
    /// point to. Ids that cannot be resolved stay unpopulated.
    ///
    /// Only the named field is populated; references inside the resolved
    /// documents stay as ids, so the graph handed to a projection is finite.
    async fn populate(&self, document: &mut Document, field: &str) -> GuardResult<()> {
        let target = {
            let descriptor = document.schema().require_field(field)?;
            match descriptor.kind().reference_target() {
                Some(target) => target.to_string(),
                None => {
                    return Err(GuardError::Config(format!(
                        "Field {} of schema {} is not a reference",
                        field,
                        document.schema().name()
                    )))
                }
            }
        };

        let populated = match document.get(field).cloned() {
            None => return Ok(()),
            Some(FieldValue::Reference(reference)) => {
                FieldValue::Reference(self.resolve_reference(&target, reference).await?)
            }
            Some(FieldValue::References(references)) => {
                let resolving = references
                    .into_iter()
                    .map(|reference| self.resolve_reference(&target, reference));
                FieldValue::References(try_join_all(resolving).await?)
            }
            Some(other) => other,
        };
        document.set(field, populated)
    }

    /// Resolves one reference slot against schema `target`.
    async fn resolve_reference(&self, target: &str, reference: Reference) -> GuardResult<Reference> {
        let id = match reference {
            Reference::Id(id) => id,
            populated => return Ok(populated),
        };
        match self.resolve(target, &id).await? {
            Some(resolved) => {
                debug!("Populated {} reference {}", target, id);
                Ok(Reference::populated(resolved))
            }
            None => {
                warn!("{} reference {} could not be resolved", target, id);
                Ok(Reference::Id(id))
            }
        }
    }
}
