//! Permission rules attached to schema fields and the caller context they
//! are evaluated against.

use crate::document::Document;
use crate::error::BoxError;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Coerces a predicate result to a permit/deny decision.
///
/// `null`, `false`, `0` and the empty string deny. Every other value permits,
/// including empty arrays and objects.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Opaque caller-supplied value passed unchanged to every predicate rule.
///
/// It can carry an identity, a role set, request metadata or a bare
/// truthy/falsy signal. [`Context::none`] stands for "no context at all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Value);

impl Context {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn none() -> Self {
        Self(Value::Null)
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Looks up a key when the context is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        truthy(&self.0)
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<bool> for Context {
    fn from(value: bool) -> Self {
        Self(Value::Bool(value))
    }
}

impl From<&str> for Context {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for Context {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

/// What a predicate hands back: a value available now, or one to await.
pub enum PredicateOutput {
    Ready(Value),
    Deferred(BoxFuture<'static, Result<Value, BoxError>>),
}

impl fmt::Debug for PredicateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

type PredicateFn =
    dyn Fn(&Document, &Context) -> Result<PredicateOutput, BoxError> + Send + Sync;

/// A context-dependent rule.
///
/// The document the field belongs to is passed alongside the context so a
/// rule can compare, for example, an owner field with the caller identity.
/// Predicates are evaluated fresh on every check and must not rely on side
/// effects.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn evaluate(
        &self,
        document: &Document,
        context: &Context,
    ) -> Result<PredicateOutput, BoxError> {
        (self.0)(document, context)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Permission rule declared on a field for one operation.
///
/// An absent rule (`None` at the descriptor level) means the schema policy
/// default applies.
#[derive(Debug, Clone)]
pub enum PermissionRule {
    /// Fixed outcome, the context is never consulted
    Literal(bool),
    /// Outcome computed from the context and the document
    Predicate(Predicate),
}

impl PermissionRule {
    #[must_use]
    pub fn allow() -> Self {
        Self::Literal(true)
    }

    #[must_use]
    pub fn deny() -> Self {
        Self::Literal(false)
    }

    /// Synchronous, infallible predicate. The result is coerced with [`truthy`].
    pub fn predicate<F, V>(f: F) -> Self
    where
        F: Fn(&Document, &Context) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::Predicate(Predicate(Arc::new(move |document, context| {
            Ok(PredicateOutput::Ready(f(document, context).into()))
        })))
    }

    /// Synchronous predicate that may fail. A failure aborts the whole
    /// read or write operation.
    pub fn try_predicate<F, V, E>(f: F) -> Self
    where
        F: Fn(&Document, &Context) -> Result<V, E> + Send + Sync + 'static,
        V: Into<Value>,
        E: Into<BoxError>,
    {
        Self::Predicate(Predicate(Arc::new(move |document, context| {
            f(document, context)
                .map(|value| PredicateOutput::Ready(value.into()))
                .map_err(Into::into)
        })))
    }

    /// Predicate whose result has to be awaited, e.g. one that consults an
    /// external service. The returned future owns whatever it needs from
    /// the document and context.
    pub fn async_predicate<F, Fut, V, E>(f: F) -> Self
    where
        F: Fn(&Document, &Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        V: Into<Value>,
        E: Into<BoxError>,
    {
        Self::Predicate(Predicate(Arc::new(move |document, context| {
            let pending = f(document, context);
            Ok(PredicateOutput::Deferred(
                async move { pending.await.map(Into::into).map_err(Into::into) }.boxed(),
            ))
        })))
    }
}

impl From<bool> for PermissionRule {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_denies_js_falsy_values() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
    }

    #[test]
    fn test_truthy_permits_everything_else() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!(-3.5)));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
        assert!(truthy(&json!({"role": "admin"})));
    }

    #[test]
    fn test_context_conversions() {
        assert!(!Context::none().is_truthy());
        assert!(Context::from(true).is_truthy());
        assert!(!Context::from(false).is_truthy());
        assert!(Context::from("admin").is_truthy());

        let ctx = Context::new(json!({"user": "alice"}));
        assert_eq!(ctx.get("user"), Some(&json!("alice")));
        assert_eq!(ctx.get("role"), None);
    }

    #[test]
    fn test_literal_rule_from_bool() {
        assert!(matches!(PermissionRule::from(true), PermissionRule::Literal(true)));
        assert!(matches!(PermissionRule::deny(), PermissionRule::Literal(false)));
    }
}
