use crate::document::Document;
use crate::error::{GuardError, GuardResult};
use crate::permissions::types::{truthy, AccessKind, Context, PermissionRule, PredicateOutput};
use log::{debug, warn};
use serde::Serialize;

/// Where a permission decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionSource {
    /// The field declares a fixed boolean rule
    Literal,
    /// The field declares a predicate, evaluated against the context
    Predicate,
    /// No rule declared, the schema policy default applied
    Default,
    /// The field has no descriptor; always denied
    MissingField,
}

/// Result of a field-level permission check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPermissionResult {
    /// Name of the field being checked
    pub field_name: String,
    /// Operation the field was checked for
    pub access: AccessKind,
    /// Whether access is allowed
    pub allowed: bool,
    /// Which part of the declaration produced the outcome
    pub source: DecisionSource,
}

/// Resolves field permission rules for a document and a caller context.
///
/// Resolution follows three cases:
/// 1. No rule declared: the schema policy default for the operation
/// 2. A literal rule: its value, without touching the context
/// 3. A predicate: invoked with the document and the context, awaited when
///    it defers, and coerced with [`truthy`]
///
/// Nothing is cached between calls; every check re-evaluates its rule.
#[derive(Debug, Default, Clone)]
pub struct PermissionManager {}

impl PermissionManager {
    /// Creates a new PermissionManager instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one rule to a permit/deny outcome.
    ///
    /// # Arguments
    ///
    /// * `field_name` - Field the rule belongs to, used to attribute predicate errors
    /// * `rule` - Declared rule, `None` when the field has no rule for the operation
    /// * `context` - Caller context handed to predicates
    /// * `document` - Document instance the field belongs to
    /// * `default` - Policy default used when `rule` is `None`
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Predicate`] when a predicate fails, either
    /// immediately or while its deferred result is awaited.
    pub async fn resolve(
        &self,
        field_name: &str,
        rule: Option<&PermissionRule>,
        context: &Context,
        document: &Document,
        default: bool,
    ) -> GuardResult<bool> {
        self.decide(field_name, rule, context, document, default)
            .await
            .map(|(allowed, _)| allowed)
    }

    /// Checks one named field of `document` for the given operation.
    ///
    /// A field without a descriptor fails closed: the result is a denial
    /// tagged [`DecisionSource::MissingField`].
    pub async fn check_field(
        &self,
        context: &Context,
        document: &Document,
        field_name: &str,
        access: AccessKind,
    ) -> GuardResult<FieldPermissionResult> {
        let schema = document.schema();
        let Some(descriptor) = schema.field(field_name) else {
            warn!(
                "schema path for {} does not exist in {}, denying {}",
                field_name,
                schema.name(),
                access
            );
            return Ok(FieldPermissionResult {
                field_name: field_name.to_string(),
                access,
                allowed: false,
                source: DecisionSource::MissingField,
            });
        };

        let rule = descriptor.rule(access);
        let default = schema.policy().default_for(access);
        let (allowed, source) = self
            .decide(field_name, rule, context, document, default)
            .await?;

        if !allowed {
            match source {
                DecisionSource::Literal => {
                    debug!("{} permission for {} hard coded to false", access, field_name)
                }
                DecisionSource::Predicate => {
                    debug!("{} permission for {} evaluated to false", access, field_name)
                }
                DecisionSource::Default => {
                    debug!("{} permission for {} defaulted to false", access, field_name)
                }
                DecisionSource::MissingField => {}
            }
        }

        Ok(FieldPermissionResult {
            field_name: field_name.to_string(),
            access,
            allowed,
            source,
        })
    }

    async fn decide(
        &self,
        field_name: &str,
        rule: Option<&PermissionRule>,
        context: &Context,
        document: &Document,
        default: bool,
    ) -> GuardResult<(bool, DecisionSource)> {
        let predicate = match rule {
            None => return Ok((default, DecisionSource::Default)),
            Some(PermissionRule::Literal(allowed)) => {
                return Ok((*allowed, DecisionSource::Literal))
            }
            Some(PermissionRule::Predicate(predicate)) => predicate,
        };

        let to_guard_error = |source| GuardError::Predicate {
            field: field_name.to_string(),
            source,
        };
        let value = match predicate.evaluate(document, context).map_err(to_guard_error)? {
            PredicateOutput::Ready(value) => value,
            PredicateOutput::Deferred(pending) => pending.await.map_err(to_guard_error)?,
        };

        Ok((truthy(&value), DecisionSource::Predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::permissions::types::PermissionsPolicy;
    use crate::schema::types::{FieldDescriptor, Schema};
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Arc<Schema> {
        Schema::builder("Rules")
            .field(FieldDescriptor::scalar("plain"))
            .field(
                FieldDescriptor::scalar("owner")
                    .can_read(PermissionRule::predicate(|doc, ctx| {
                        let owner = doc.get_scalar("owner");
                        owner.is_some() && owner == ctx.get("user")
                    }))
                    .can_write(PermissionRule::deny()),
            )
            .policy(PermissionsPolicy::new(true, false))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_absent_rule_uses_default() {
        let manager = PermissionManager::new();
        let doc = Document::new(schema());
        assert!(manager
            .resolve("plain", None, &Context::none(), &doc, true)
            .await
            .unwrap());
        assert!(!manager
            .resolve("plain", None, &Context::from(true), &doc, false)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_literal_rule_ignores_context() {
        let manager = PermissionManager::new();
        let doc = Document::new(schema());
        let deny = PermissionRule::deny();
        assert!(!manager
            .resolve("plain", Some(&deny), &Context::from(true), &doc, true)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_predicate_sees_document_and_context() {
        let manager = PermissionManager::new();
        let mut doc = Document::new(schema());
        doc.set("owner", "alice").unwrap();

        let alice = Context::new(json!({"user": "alice"}));
        let bob = Context::new(json!({"user": "bob"}));
        let owner_read = manager
            .check_field(&alice, &doc, "owner", AccessKind::Read)
            .await
            .unwrap();
        assert!(owner_read.allowed);
        assert_eq!(owner_read.source, DecisionSource::Predicate);

        let other_read = manager
            .check_field(&bob, &doc, "owner", AccessKind::Read)
            .await
            .unwrap();
        assert!(!other_read.allowed);
    }

    #[tokio::test]
    async fn test_deferred_predicate_is_awaited_and_coerced() {
        let manager = PermissionManager::new();
        let doc = Document::new(schema());
        let rule = PermissionRule::async_predicate(|_, ctx| {
            let role = ctx.get("role").cloned().unwrap_or_default();
            async move {
                tokio::task::yield_now().await;
                Ok::<_, BoxError>(role)
            }
        });

        let admin = Context::new(json!({"role": "admin"}));
        assert!(manager
            .resolve("plain", Some(&rule), &admin, &doc, false)
            .await
            .unwrap());
        let empty = Context::new(json!({"role": ""}));
        assert!(!manager
            .resolve("plain", Some(&rule), &empty, &doc, true)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_predicate_error_is_attributed_to_field() {
        let manager = PermissionManager::new();
        let doc = Document::new(schema());
        let rule = PermissionRule::try_predicate(|_, _| Err::<bool, _>("directory offline"));

        let err = manager
            .resolve("plain", Some(&rule), &Context::none(), &doc, true)
            .await
            .unwrap_err();
        match err {
            GuardError::Predicate { field, source } => {
                assert_eq!(field, "plain");
                assert_eq!(source.to_string(), "directory offline");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_field_fails_closed() {
        let manager = PermissionManager::new();
        let doc = Document::new(schema());
        let result = manager
            .check_field(&Context::from(true), &doc, "nope", AccessKind::Write)
            .await
            .unwrap();
        assert!(!result.allowed);
        assert_eq!(result.source, DecisionSource::MissingField);
    }
}
