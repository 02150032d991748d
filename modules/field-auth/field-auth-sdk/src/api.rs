//! Public resolver trait for guarded fields.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FieldAuthError;
use crate::models::ResolveInfo;

/// Field resolution logic wrapped by the authorization guard.
///
/// Mirrors the host schema's `(root, args, context, info)` resolver
/// contract. The guard implements this trait too, so guarded resolvers
/// can be handed back to the host wherever a plain resolver is expected:
///
/// ```ignore
/// let inner: Arc<dyn FieldResolver> = Arc::new(SalaryResolver::new(db));
/// let guarded: Arc<dyn FieldResolver> = Arc::new(registry.wrap("Employee", "salary", inner));
///
/// let value = guarded.resolve(&root, &args, &context, &info).await?;
/// ```
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// Resolve a single field value.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Forbidden` when a guard denies access
    /// - `Resolver` for failures inside the resolution logic itself
    async fn resolve(
        &self,
        root: &Value,
        args: &Value,
        context: &Value,
        info: &ResolveInfo,
    ) -> Result<Value, FieldAuthError>;
}
