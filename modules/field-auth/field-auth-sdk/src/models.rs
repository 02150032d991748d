//! Domain models for the `field_auth` module.
//!
//! Check declarations flow in as [`CheckSpec`]; authorization outcomes flow
//! out as [`Decision`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldAuthError;

/// A single declared check, as authored in the schema.
///
/// `op` is kept as the raw token (or alias) so that an unsupported token is
/// reported as a configuration defect when the check is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    /// Field-path expression resolved against the request context
    /// (e.g. `"user.roles"`, `"[0].x"`).
    pub field: String,
    /// Operator token (e.g. `"EQUAL"`, `"GTE"`).
    pub op: String,
    /// Literal compared against the resolved value.
    pub value: String,
}

impl CheckSpec {
    /// Create a new check declaration.
    #[must_use]
    pub fn new(field: impl Into<String>, op: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

/// Comparison operator applied by a check.
///
/// Closed set; each kind accepts a canonical token and its short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    LessThan,
    LessThanEqual,
    Equal,
    NotEqual,
    GreaterThanEqual,
    GreaterThan,
    Contains,
    NotContains,
}

impl OperatorKind {
    /// Every accepted token, aliases first, in declaration-surface order.
    pub const TOKENS: &'static [(&'static str, Self)] = &[
        ("LT", Self::LessThan),
        ("LTE", Self::LessThanEqual),
        ("E", Self::Equal),
        ("EQ", Self::Equal),
        ("NE", Self::NotEqual),
        ("NEQ", Self::NotEqual),
        ("GTE", Self::GreaterThanEqual),
        ("GT", Self::GreaterThan),
        ("LESS_THAN", Self::LessThan),
        ("LESS_THAN_EQUAL", Self::LessThanEqual),
        ("EQUAL", Self::Equal),
        ("NOT_EQUAL", Self::NotEqual),
        ("GREATER_THAN_EQUAL", Self::GreaterThanEqual),
        ("GREATER_THAN", Self::GreaterThan),
        ("CONTAINS", Self::Contains),
        ("NOT_CONTAINS", Self::NotContains),
    ];

    /// Canonical token for this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "LESS_THAN",
            Self::LessThanEqual => "LESS_THAN_EQUAL",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::GreaterThanEqual => "GREATER_THAN_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
        }
    }

    /// Phrase describing a failed check, e.g. `"is not less than"`.
    #[must_use]
    pub fn failure_phrase(self) -> &'static str {
        match self {
            Self::LessThan => "is not less than",
            Self::LessThanEqual => "is not less than or equal to",
            Self::Equal => "is not equal to",
            Self::NotEqual => "is equal to",
            Self::GreaterThanEqual => "is not greater than or equal to",
            Self::GreaterThan => "is not greater than",
            Self::Contains => "does not contain",
            Self::NotContains => "contains",
        }
    }
}

impl FromStr for OperatorKind {
    type Err = FieldAuthError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| FieldAuthError::UnknownOperator {
                token: token.to_owned(),
            })
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property access in a compiled field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Named member access (`.name` or `['name']`).
    Key(String),
    /// Numeric index access (`[0]`).
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Host-supplied metadata about the field being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    /// Name of the enclosing type (e.g. `"Query"`, `"Employee"`).
    pub parent_type: String,
    /// Name of the field being resolved.
    pub field_name: String,
}

impl ResolveInfo {
    #[must_use]
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The configured user field was missing or falsy.
    Unauthenticated,
    /// A declared check did not pass.
    CheckFailed {
        /// Field-path expression of the failing check.
        path: String,
        /// Operator of the failing check.
        op: OperatorKind,
        /// Declared literal.
        declared: String,
        /// Rendered resolved value (`undefined` when the path was absent).
        actual: String,
    },
}

/// A denied authorization with server-side diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Name of the protected field.
    pub field_name: String,
    pub reason: DenyReason,
}

impl Denial {
    /// Convert into the caller-facing error, dropping diagnostic detail.
    #[must_use]
    pub fn into_error(self) -> FieldAuthError {
        match self.reason {
            DenyReason::Unauthenticated => FieldAuthError::Unauthenticated,
            DenyReason::CheckFailed { .. } => FieldAuthError::Forbidden {
                field_name: self.field_name,
            },
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DenyReason::Unauthenticated => {
                write!(f, "user not authenticated for \"{}\"", self.field_name)
            }
            DenyReason::CheckFailed {
                path,
                op,
                declared,
                actual,
            } => write!(
                f,
                "context.{path} ({actual}) {} {declared}; access to \"{}\" denied",
                op.failure_phrase(),
                self.field_name
            ),
        }
    }
}

/// Outcome of authorizing one field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The denial, if any.
    #[must_use]
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allow => None,
            Self::Deny(denial) => Some(denial),
        }
    }

    /// Convert into a `Result` for propagation with `?`.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the authentication gate failed
    /// - `Forbidden` if a declared check failed
    pub fn into_result(self) -> Result<(), FieldAuthError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial.into_error()),
        }
    }
}
