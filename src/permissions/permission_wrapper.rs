use crate::document::Document;
use crate::error::GuardResult;
use crate::permissions::permission_manager::{FieldPermissionResult, PermissionManager};
use crate::permissions::types::{AccessKind, Context};
use futures::future::try_join_all;

/// Runs permission checks for a batch of fields.
///
/// Every field is checked concurrently and the call returns once all of
/// them are known. A failing predicate aborts the batch; the outcomes of
/// the remaining fields are discarded.
#[derive(Debug, Default, Clone)]
pub struct PermissionWrapper {
    permission_manager: PermissionManager,
}

impl PermissionWrapper {
    /// Creates a new PermissionWrapper instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permission_manager(&self) -> &PermissionManager {
        &self.permission_manager
    }

    /// Checks every name in `field_names` for `access` on `document`.
    ///
    /// The returned results are in the same order as `field_names`. Names
    /// without a schema descriptor come back denied.
    pub async fn check_field_permissions<'a, I>(
        &self,
        context: &Context,
        document: &Document,
        field_names: I,
        access: AccessKind,
    ) -> GuardResult<Vec<FieldPermissionResult>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let checks = field_names.into_iter().map(|field_name| {
            self.permission_manager
                .check_field(context, document, field_name, access)
        });
        try_join_all(checks).await
    }

    /// Names of the fields in `results` that were denied.
    #[must_use]
    pub fn denied_fields(results: &[FieldPermissionResult]) -> Vec<String> {
        results
            .iter()
            .filter(|result| !result.allowed)
            .map(|result| result.field_name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::permission_manager::DecisionSource;
    use crate::testing::test_schema;

    #[tokio::test]
    async fn test_check_write_permissions_in_order() {
        let wrapper = PermissionWrapper::new();
        let doc = Document::new(test_schema());
        let results = wrapper
            .check_field_permissions(
                &Context::none(),
                &doc,
                ["truthy", "implicit", "missing"],
                AccessKind::Write,
            )
            .await
            .unwrap();

        let allowed: Vec<bool> = results.iter().map(|r| r.allowed).collect();
        assert_eq!(allowed, vec![true, false, false]);
        assert_eq!(results[2].source, DecisionSource::MissingField);
        assert_eq!(
            PermissionWrapper::denied_fields(&results),
            vec!["implicit".to_string(), "missing".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let wrapper = PermissionWrapper::new();
        let doc = Document::new(test_schema());
        let results = wrapper
            .check_field_permissions(&Context::none(), &doc, Vec::<&str>::new(), AccessKind::Write)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
