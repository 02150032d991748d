//! Error types for the `field_auth` module.

/// Errors raised while building or enforcing field guards.
///
/// Variants split into two classes:
/// - setup defects (`PathSyntax`, `UnknownOperator`, `InvalidConfig`) that
///   abort schema construction;
/// - request-time denials (`Unauthenticated`, `Forbidden`) that are returned
///   to the caller instead of the field value.
///
/// Denial messages are safe to send to the caller: they name the protected
/// field but never the context values that failed a check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldAuthError {
    /// Malformed field-path expression.
    #[error("invalid field path \"{expression}\" at offset {position}: {message}")]
    PathSyntax {
        expression: String,
        position: usize,
        message: String,
    },

    /// Operator token outside the supported enumeration.
    #[error("invalid operation enumeration value \"{token}\"")]
    UnknownOperator { token: String },

    /// Configuration or declaration document could not be loaded.
    #[error("invalid field auth configuration: {message}")]
    InvalidConfig { message: String },

    /// The configured user field is missing or falsy in the request context.
    #[error("User not authenticated")]
    Unauthenticated,

    /// A declared check failed for the protected field.
    #[error("User not allowed to access \"{field_name}\"")]
    Forbidden { field_name: String },

    /// The wrapped resolver failed after authorization passed.
    #[error("field resolution failed: {0}")]
    Resolver(String),
}

impl FieldAuthError {
    /// Returns `true` for request-time authorization outcomes.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Forbidden { .. })
    }

    /// Returns `true` for declaration or configuration defects.
    #[must_use]
    pub fn is_setup_defect(&self) -> bool {
        matches!(
            self,
            Self::PathSyntax { .. } | Self::UnknownOperator { .. } | Self::InvalidConfig { .. }
        )
    }
}
