//! Configuration for the field auth guard.

use field_auth_sdk::FieldAuthError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Guard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldAuthConfig {
    /// Context member whose truthiness marks the caller as authenticated.
    /// Empty disables the authentication gate.
    pub user_field: String,

    /// Semantics of the `GREATER_THAN` operator.
    pub greater_than: GreaterThanMode,
}

impl Default for FieldAuthConfig {
    fn default() -> Self {
        Self {
            user_field: "user".to_owned(),
            greater_than: GreaterThanMode::Strict,
        }
    }
}

impl FieldAuthConfig {
    /// Parse configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FieldAuthError::InvalidConfig`] on malformed YAML or unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self, FieldAuthError> {
        parse_yaml("field auth config", yaml)
    }

    /// The authentication gate's context member, if enabled.
    #[must_use]
    pub fn user_field(&self) -> Option<&str> {
        Some(self.user_field.as_str()).filter(|f| !f.is_empty())
    }
}

/// How `GREATER_THAN` compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GreaterThanMode {
    /// `value > declared`.
    #[default]
    Strict,
    /// `value >= declared`, matching deployments that relied on
    /// `GREATER_THAN` admitting equal values.
    Inclusive,
}

pub(crate) fn parse_yaml<T: DeserializeOwned>(what: &str, yaml: &str) -> Result<T, FieldAuthError> {
    serde_saphyr::from_str(yaml).map_err(|e| FieldAuthError::InvalidConfig {
        message: format!("{what}: {e}"),
    })
}
