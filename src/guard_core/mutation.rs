use crate::document::{Document, Patch};
use crate::error::{GuardError, GuardResult};
use crate::permissions::permission_wrapper::PermissionWrapper;
use crate::permissions::types::{AccessKind, Context};
use crate::store::DocumentStore;
use log::{debug, info};

/// Applies partial updates to governed documents.
///
/// An update runs in three phases, strictly in this order:
/// 1. Write permission for every patch key is checked concurrently
/// 2. Every patch value is validated against its field descriptor
/// 3. The patch is merged into a copy of the document and saved
///
/// Nothing is assigned before all permission checks have resolved, and
/// the store is only called when every key was permitted. A single denied
/// key (unknown keys included) rejects the whole patch.
#[derive(Debug, Default, Clone)]
pub struct Updater {
    permission_wrapper: PermissionWrapper,
}

impl Updater {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `patch` into `document` on behalf of `context`.
    ///
    /// The merge is shallow: patched fields are overwritten, every other
    /// field keeps its value. An empty patch is trivially permitted and
    /// simply re-saves the document.
    ///
    /// # Returns
    ///
    /// The document as saved by `store`. `document` is replaced with the
    /// same value.
    ///
    /// # Errors
    ///
    /// * [`GuardError::InsufficientPermission`] when any key is denied
    /// * [`GuardError::Predicate`] when a write predicate fails
    /// * [`GuardError::InvalidValue`] when a value does not fit its field
    /// * whatever `store` returns when saving fails, unchanged
    ///
    /// In every error case `document` is left as it was.
    pub async fn update<S>(
        &self,
        store: &S,
        context: &Context,
        document: &mut Document,
        patch: Patch,
    ) -> GuardResult<Document>
    where
        S: DocumentStore + ?Sized,
    {
        debug!(
            "write of {:?} requested on {}",
            patch.fields().collect::<Vec<_>>(),
            document.schema().name()
        );

        let results = self
            .permission_wrapper
            .check_field_permissions(context, document, patch.fields(), AccessKind::Write)
            .await?;
        let denied = PermissionWrapper::denied_fields(&results);
        if !denied.is_empty() {
            debug!(
                "write to {} rejected, denied fields: {:?}",
                document.schema().name(),
                denied
            );
            return Err(GuardError::InsufficientPermission { denied });
        }

        for (field, value) in patch.iter() {
            document.validate_value(field, value)?;
        }

        let mut staged = document.clone();
        for (field, value) in patch {
            staged.insert_validated(field, value);
        }

        let saved = store.save(staged).await?;
        info!(
            "write permitted and saved for {} document {}",
            saved.schema().name(),
            saved.id().unwrap_or("<unassigned>")
        );
        *document = saved.clone();
        Ok(saved)
    }
}
