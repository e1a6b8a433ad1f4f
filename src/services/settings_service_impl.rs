//! `SeaORM` implementation of the `SettingsService` trait.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::setting::IntegerSetting;
use crate::models::validation::ValidationErrors;
use crate::services::settings_service::{SettingError, SettingsService};

pub struct SeaOrmSettingsService {
    store: Store,
}

impl SeaOrmSettingsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn load_or_new(&self, context: &str, key: &str) -> Result<IntegerSetting, SettingError> {
        Ok(self
            .store
            .get_integer_setting(context, key)
            .await?
            .unwrap_or_else(|| IntegerSetting::new(context, key)))
    }

    async fn persist(&self, setting: IntegerSetting) -> Result<IntegerSetting, SettingError> {
        setting
            .validate()
            .into_result()
            .map_err(SettingError::Validation)?;

        let saved = self.store.save_integer_setting(&setting).await?;
        info!(
            context = %saved.context,
            key = %saved.key,
            value = ?saved.raw_value(),
            "Saved integer setting"
        );
        Ok(saved)
    }
}

#[async_trait]
impl SettingsService for SeaOrmSettingsService {
    async fn get_integer(&self, context: &str, key: &str) -> Result<Option<i64>, SettingError> {
        let setting = self
            .store
            .get_integer_setting(context, key)
            .await?
            .ok_or_else(|| SettingError::NotFound {
                context: context.to_string(),
                key: key.to_string(),
            })?;

        Ok(setting.value()?)
    }

    async fn list_integers(&self, context: &str) -> Result<Vec<IntegerSetting>, SettingError> {
        Ok(self.store.list_integer_settings(context).await?)
    }

    async fn set_integer(
        &self,
        context: &str,
        key: &str,
        value: Option<i64>,
    ) -> Result<IntegerSetting, SettingError> {
        let mut setting = self.load_or_new(context, key).await?;
        setting.set_value(value);
        self.persist(setting).await
    }

    async fn set_integer_value(
        &self,
        context: &str,
        key: &str,
        value: &Value,
    ) -> Result<IntegerSetting, SettingError> {
        let mut setting = self.load_or_new(context, key).await?;
        setting.set_raw_value(value);
        self.persist(setting).await
    }

    async fn import_integers(
        &self,
        context: &str,
        entries: &[(String, Value)],
    ) -> Result<Vec<IntegerSetting>, SettingError> {
        let mut errors = ValidationErrors::new();
        let mut pending = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            if !IntegerSetting::check_values(std::slice::from_ref(value)) {
                errors.add("value", format!("for '{key}' is not an integer: {value}"));
                continue;
            }

            let mut setting = self.load_or_new(context, key).await?;
            setting.set_raw_value(value);
            for error in setting.validate().iter() {
                errors.add(error.field, format!("for '{key}' {}", error.message));
            }
            pending.push(setting);
        }

        if !errors.is_empty() {
            debug!(context, "Rejected settings import: {errors}");
            return Err(SettingError::Validation(errors));
        }

        let saved = self.store.save_integer_settings(&pending).await?;
        info!(context, count = saved.len(), "Imported integer settings");
        Ok(saved)
    }
}
