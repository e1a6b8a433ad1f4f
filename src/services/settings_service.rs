//! Domain service for typed application settings.

use thiserror::Error;

use crate::models::setting::{CorruptSettingValue, IntegerSetting};
use crate::models::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum SettingError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Setting not found: {context}.{key}")]
    NotFound { context: String, key: String },

    #[error(transparent)]
    Corrupt(#[from] CorruptSettingValue),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SettingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SettingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait SettingsService: Send + Sync {
    /// Current value of an integer setting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingError::NotFound`] when the setting does not exist and
    /// [`SettingError::Corrupt`] when the stored content is not an integer.
    async fn get_integer(&self, context: &str, key: &str) -> Result<Option<i64>, SettingError>;

    async fn list_integers(&self, context: &str) -> Result<Vec<IntegerSetting>, SettingError>;

    /// Creates or updates an integer setting.
    async fn set_integer(
        &self,
        context: &str,
        key: &str,
        value: Option<i64>,
    ) -> Result<IntegerSetting, SettingError>;

    /// Like [`SettingsService::set_integer`] for untyped input (config
    /// imports, form values). Anything but null or a JSON integer is rejected.
    async fn set_integer_value(
        &self,
        context: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<IntegerSetting, SettingError>;

    /// Writes several settings of one context. Nothing is written unless
    /// every value is null or a native integer.
    async fn import_integers(
        &self,
        context: &str,
        entries: &[(String, serde_json::Value)],
    ) -> Result<Vec<IntegerSetting>, SettingError>;
}
