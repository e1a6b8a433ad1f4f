use crate::entities::{prelude::*, ubiquo_settings};
use crate::models::setting::{INTEGER_SETTING_TYPE, IntegerSetting};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

pub struct SettingRepository {
    conn: DatabaseConnection,
}

impl SettingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_integer(&self, context: &str, key: &str) -> Result<Option<IntegerSetting>> {
        let setting = UbiquoSettings::find()
            .filter(ubiquo_settings::Column::Context.eq(context))
            .filter(ubiquo_settings::Column::Key.eq(key))
            .filter(ubiquo_settings::Column::SettingType.eq(INTEGER_SETTING_TYPE))
            .one(&self.conn)
            .await
            .context("Failed to query integer setting")?;

        Ok(setting.map(IntegerSetting::from_model))
    }

    pub async fn list_integers(&self, context: &str) -> Result<Vec<IntegerSetting>> {
        let settings = UbiquoSettings::find()
            .filter(ubiquo_settings::Column::Context.eq(context))
            .filter(ubiquo_settings::Column::SettingType.eq(INTEGER_SETTING_TYPE))
            .order_by_asc(ubiquo_settings::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to list integer settings")?;

        Ok(settings.into_iter().map(IntegerSetting::from_model).collect())
    }

    /// Inserts or updates the setting row. Callers validate first.
    pub async fn save_integer(&self, setting: &IntegerSetting) -> Result<IntegerSetting> {
        write_integer(&self.conn, setting).await
    }

    /// Writes every setting in one transaction; either all rows land or none do.
    pub async fn save_integers(&self, settings: &[IntegerSetting]) -> Result<Vec<IntegerSetting>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin settings transaction")?;

        let mut saved = Vec::with_capacity(settings.len());
        for setting in settings {
            saved.push(write_integer(&txn, setting).await?);
        }

        txn.commit()
            .await
            .context("Failed to commit settings transaction")?;

        Ok(saved)
    }
}

async fn write_integer<C: ConnectionTrait>(
    conn: &C,
    setting: &IntegerSetting,
) -> Result<IntegerSetting> {
    let now = chrono::Utc::now().to_rfc3339();

    let mut active = ubiquo_settings::ActiveModel {
        id: setting.id.map_or(NotSet, Set),
        context: Set(setting.context.clone()),
        key: Set(setting.key.clone()),
        value: Set(setting.raw_value().map(str::to_string)),
        setting_type: Set(INTEGER_SETTING_TYPE.to_string()),
        allow_nil: Set(setting.allow_nil),
        created_at: NotSet,
        updated_at: Set(now.clone()),
    };

    let model = if setting.id.is_none() {
        active.created_at = Set(now);
        active
            .insert(conn)
            .await
            .with_context(|| format!("Failed to insert integer setting '{}'", setting.key))?
    } else {
        active
            .update(conn)
            .await
            .with_context(|| format!("Failed to update integer setting '{}'", setting.key))?
    };

    Ok(IntegerSetting::from_model(model))
}
