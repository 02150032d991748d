//! Guarded field resolver.
//!
//! [`GuardedResolver`] encapsulates the full enforcement flow for one field:
//! authorize the request context → delegate to the wrapped resolver.
//!
//! The checklist is chosen once when the guard is built (see
//! [`GuardRegistry`](super::registry::GuardRegistry)) and never changes
//! afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use field_auth_sdk::{Decision, FieldAuthError, FieldResolver, ResolveInfo};
use serde_json::Value;

use super::evaluator::{CompiledCheck, Evaluator};

/// Resolver that authorizes before delegating.
///
/// Cloneable and cheap to pass around (`Arc` inside). Denied requests never
/// reach the wrapped resolver.
///
/// # Example
///
/// ```ignore
/// let checks = compile_checks(&[CheckSpec::new("role", "EQ", "admin")])?;
/// let guarded = GuardedResolver::new(
///     Arc::new(DefaultFieldResolver),
///     checks.into(),
///     Arc::new(Evaluator::default()),
/// );
///
/// let salary = guarded.resolve(&employee, &args, &context, &info).await?;
/// ```
#[derive(Clone)]
pub struct GuardedResolver {
    inner: Arc<dyn FieldResolver>,
    checks: Arc<[CompiledCheck]>,
    evaluator: Arc<Evaluator>,
}

impl GuardedResolver {
    /// Create a new guard around `inner`.
    #[must_use]
    pub fn new(
        inner: Arc<dyn FieldResolver>,
        checks: Arc<[CompiledCheck]>,
        evaluator: Arc<Evaluator>,
    ) -> Self {
        Self {
            inner,
            checks,
            evaluator,
        }
    }

    /// The checklist this guard enforces.
    #[must_use]
    pub fn checks(&self) -> &[CompiledCheck] {
        &self.checks
    }

    /// Authorize without resolving.
    #[must_use]
    pub fn authorize(&self, context: &Value, info: &ResolveInfo) -> Decision {
        self.evaluator
            .authorize(context, &self.checks, &info.field_name)
    }
}

#[async_trait]
impl FieldResolver for GuardedResolver {
    #[tracing::instrument(
        skip_all,
        fields(parent_type = %info.parent_type, field = %info.field_name)
    )]
    async fn resolve(
        &self,
        root: &Value,
        args: &Value,
        context: &Value,
        info: &ResolveInfo,
    ) -> Result<Value, FieldAuthError> {
        self.authorize(context, info).into_result()?;

        self.inner
            .resolve(root, args, context, info)
            .await
            .inspect_err(|e| {
                if !e.is_denial() {
                    tracing::error!(error = %e, "guarded field resolution failed");
                }
            })
    }
}

impl std::fmt::Debug for GuardedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedResolver")
            .field("checks", &self.checks)
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

/// Resolver that reads the field of the same name from the parent value.
///
/// Used when a guarded field declares no resolver of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldResolver;

#[async_trait]
impl FieldResolver for DefaultFieldResolver {
    async fn resolve(
        &self,
        root: &Value,
        _args: &Value,
        _context: &Value,
        info: &ResolveInfo,
    ) -> Result<Value, FieldAuthError> {
        Ok(root.get(&info.field_name).cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::evaluator::compile_checks;
    use field_auth_sdk::CheckSpec;
    use serde_json::json;

    /// Counts calls and returns a fixed value.
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl CountingResolver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FieldResolver for CountingResolver {
        async fn resolve(
            &self,
            _root: &Value,
            _args: &Value,
            _context: &Value,
            _info: &ResolveInfo,
        ) -> Result<Value, FieldAuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(100_000))
        }
    }

    /// Always fails.
    struct FailingResolver;

    #[async_trait]
    impl FieldResolver for FailingResolver {
        async fn resolve(
            &self,
            _root: &Value,
            _args: &Value,
            _context: &Value,
            _info: &ResolveInfo,
        ) -> Result<Value, FieldAuthError> {
            Err(FieldAuthError::Resolver("boom".to_owned()))
        }
    }

    fn guard(inner: Arc<dyn FieldResolver>, specs: &[CheckSpec]) -> GuardedResolver {
        let checks = compile_checks(specs).unwrap();
        GuardedResolver::new(inner, checks.into(), Arc::new(Evaluator::default()))
    }

    fn info() -> ResolveInfo {
        ResolveInfo::new("Employee", "salary")
    }

    #[tokio::test]
    async fn allowed_request_delegates_and_returns_result_unchanged() {
        let inner = CountingResolver::new();
        let g = guard(inner.clone(), &[CheckSpec::new("role", "EQ", "admin")]);
        let context = json!({"user": {"id": 1}, "role": "admin"});

        let value = g
            .resolve(&json!({}), &json!({}), &context, &info())
            .await
            .unwrap();

        assert_eq!(value, json!(100_000));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn denied_request_never_reaches_inner_resolver() {
        let inner = CountingResolver::new();
        let g = guard(inner.clone(), &[CheckSpec::new("role", "EQ", "admin")]);
        let context = json!({"user": {"id": 1}, "role": "guest"});

        let err = g
            .resolve(&json!({}), &json!({}), &context, &info())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FieldAuthError::Forbidden {
                field_name: "salary".to_owned()
            }
        );
        assert!(!err.to_string().contains("guest"));
        assert_eq!(inner.calls(), 0);
    }

    #[tokio::test]
    async fn unauthenticated_request_is_rejected() {
        let inner = CountingResolver::new();
        let g = guard(inner.clone(), &[]);

        let err = g
            .resolve(&json!({}), &json!({}), &json!({}), &info())
            .await
            .unwrap_err();

        assert_eq!(err, FieldAuthError::Unauthenticated);
        assert_eq!(inner.calls(), 0);
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let g = guard(Arc::new(FailingResolver), &[]);
        let context = json!({"user": true});

        let err = g
            .resolve(&json!({}), &json!({}), &context, &info())
            .await
            .unwrap_err();

        assert_eq!(err, FieldAuthError::Resolver("boom".to_owned()));
    }

    #[tokio::test]
    async fn guards_compose() {
        let inner = CountingResolver::new();
        let outer_specs = [CheckSpec::new("tier", "EQ", "gold")];
        let inner_guard = guard(inner.clone(), &[CheckSpec::new("role", "EQ", "admin")]);
        let g = guard(Arc::new(inner_guard), &outer_specs);

        let ok = json!({"user": 1, "tier": "gold", "role": "admin"});
        assert!(g.resolve(&json!({}), &json!({}), &ok, &info()).await.is_ok());

        let not_admin = json!({"user": 1, "tier": "gold", "role": "guest"});
        assert!(g
            .resolve(&json!({}), &json!({}), &not_admin, &info())
            .await
            .is_err());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn default_resolver_reads_parent_field() {
        let root = json!({"salary": 42});
        let r = DefaultFieldResolver;

        let value = r
            .resolve(&root, &json!({}), &json!({}), &info())
            .await
            .unwrap();
        assert_eq!(value, json!(42));

        let missing = r
            .resolve(&json!({}), &json!({}), &json!({}), &info())
            .await
            .unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn debug_impl() {
        let g = guard(Arc::new(DefaultFieldResolver), &[]);
        let dbg = format!("{g:?}");
        assert!(dbg.contains("GuardedResolver"));
    }
}
