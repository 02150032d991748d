//! Check compilation and evaluation.
//!
//! ## Evaluation order (fail-closed)
//!
//! | step | condition | result |
//! |------|-----------|--------|
//! | auth gate | user field configured and not truthy | `Deny(Unauthenticated)` |
//! | check `i` | operator test fails | `Deny(CheckFailed)`, later checks skipped |
//! | end | every check passed | `Allow` |

use std::cmp::Ordering;

use field_auth_sdk::{CheckSpec, Decision, Denial, DenyReason, FieldAuthError, OperatorKind};
use serde_json::Value;
use tracing::{debug, info};

use super::coerce;
use super::path::{CompiledPath, compile_path};
use super::walk::walk;
use crate::config::{FieldAuthConfig, GreaterThanMode};

/// A declared check with its operator validated and its path compiled.
///
/// Immutable after compilation; share it across requests behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCheck {
    op: OperatorKind,
    declared: String,
    accessor: CompiledPath,
}

impl CompiledCheck {
    /// Field-path expression, as declared.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        self.accessor.expression()
    }

    #[inline]
    #[must_use]
    pub fn op(&self) -> OperatorKind {
        self.op
    }

    /// Declared literal.
    #[inline]
    #[must_use]
    pub fn declared(&self) -> &str {
        &self.declared
    }

    #[inline]
    #[must_use]
    pub fn accessor(&self) -> &CompiledPath {
        &self.accessor
    }
}

/// Compile a single check declaration.
///
/// The operator is validated before the path so that an unknown token is
/// reported even when the path is also malformed.
///
/// # Errors
///
/// - [`FieldAuthError::UnknownOperator`] for a token outside the enumeration
/// - [`FieldAuthError::PathSyntax`] for a malformed field path
pub fn compile_check(spec: &CheckSpec) -> Result<CompiledCheck, FieldAuthError> {
    let op: OperatorKind = spec.op.parse()?;
    let accessor = compile_path(&spec.field)?;
    debug!(field = %spec.field, op = %op, steps = accessor.steps().len(), "compiled check");
    Ok(CompiledCheck {
        op,
        declared: spec.value.clone(),
        accessor,
    })
}

/// Compile a checklist; the first failure aborts the whole list.
///
/// # Errors
///
/// Same as [`compile_check`].
pub fn compile_checks(specs: &[CheckSpec]) -> Result<Vec<CompiledCheck>, FieldAuthError> {
    specs.iter().map(compile_check).collect()
}

/// Applies compiled checklists to request contexts.
///
/// Stateless apart from its configuration; cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Evaluator {
    user_field: Option<String>,
    greater_than: GreaterThanMode,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&FieldAuthConfig::default())
    }
}

impl Evaluator {
    #[must_use]
    pub fn new(config: &FieldAuthConfig) -> Self {
        Self {
            user_field: config.user_field().map(ToOwned::to_owned),
            greater_than: config.greater_than,
        }
    }

    /// Authorize access to `field_name` for the given request context.
    ///
    /// Runs the authentication gate, then every check in declaration order,
    /// stopping at the first failure. Denials are logged with full
    /// diagnostics; the returned [`Decision`] carries the same detail.
    #[must_use]
    pub fn authorize(
        &self,
        context: &Value,
        checks: &[CompiledCheck],
        field_name: &str,
    ) -> Decision {
        if let Some(user_field) = self.user_field.as_deref() {
            let user = context.as_object().and_then(|map| map.get(user_field));
            if !coerce::is_truthy(user) {
                info!(
                    field = %field_name,
                    user_field,
                    "field access denied: user not authenticated"
                );
                return Decision::Deny(Denial {
                    field_name: field_name.to_owned(),
                    reason: DenyReason::Unauthenticated,
                });
            }
        }

        for check in checks {
            debug!(
                field = %field_name,
                path = %check.field(),
                op = %check.op(),
                "evaluating check"
            );
            let resolved = walk(context, check.accessor());
            let value = resolved.as_deref();
            if self.passes(check, value) {
                continue;
            }

            let actual = coerce::render(value);
            info!(
                field = %field_name,
                path = %check.field(),
                actual = %actual,
                op = %check.op(),
                declared = %check.declared(),
                "field access denied: context.{} ({}) {} {}",
                check.field(),
                actual,
                check.op().failure_phrase(),
                check.declared()
            );
            return Decision::Deny(Denial {
                field_name: field_name.to_owned(),
                reason: DenyReason::CheckFailed {
                    path: check.field().to_owned(),
                    op: check.op(),
                    declared: check.declared().to_owned(),
                    actual,
                },
            });
        }

        Decision::Allow
    }

    /// Whether `value` satisfies a single check.
    #[must_use]
    pub fn passes(&self, check: &CompiledCheck, value: Option<&Value>) -> bool {
        let declared = check.declared();
        let ordering = || coerce::compare(value, declared);
        match check.op() {
            OperatorKind::LessThan => ordering() == Some(Ordering::Less),
            OperatorKind::LessThanEqual => {
                matches!(ordering(), Some(Ordering::Less | Ordering::Equal))
            }
            OperatorKind::Equal => coerce::loose_eq(value, declared),
            OperatorKind::NotEqual => !coerce::loose_eq(value, declared),
            OperatorKind::GreaterThanEqual => {
                matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
            }
            OperatorKind::GreaterThan => match self.greater_than {
                GreaterThanMode::Strict => ordering() == Some(Ordering::Greater),
                GreaterThanMode::Inclusive => {
                    matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
                }
            },
            OperatorKind::Contains => contains(value, declared),
            OperatorKind::NotContains => !contains(value, declared),
        }
    }
}

/// Array membership by strict equality; scalars fall back to strict equality.
fn contains(value: Option<&Value>, declared: &str) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| coerce::strict_eq(Some(item), declared)),
        other => coerce::strict_eq(other, declared),
    }
}
