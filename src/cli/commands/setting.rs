use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmSettingsService, SettingsService};

async fn settings_service(config: &Config) -> anyhow::Result<SeaOrmSettingsService> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    Ok(SeaOrmSettingsService::new(store))
}

pub async fn cmd_setting_get(config: &Config, context: &str, key: &str) -> anyhow::Result<()> {
    let service = settings_service(config).await?;

    match service.get_integer(context, key).await? {
        Some(value) => println!("{context}.{key} = {value}"),
        None => println!("{context}.{key} = (nil)"),
    }

    Ok(())
}

pub async fn cmd_setting_list(config: &Config, context: &str) -> anyhow::Result<()> {
    let service = settings_service(config).await?;
    let settings = service.list_integers(context).await?;

    if settings.is_empty() {
        println!("No integer settings in '{context}'.");
        return Ok(());
    }

    for setting in settings {
        let value = match setting.value() {
            Ok(Some(v)) => v.to_string(),
            Ok(None) => "(nil)".to_string(),
            Err(e) => format!("(corrupt: {e})"),
        };
        println!("{}.{} = {value}", setting.context, setting.key);
    }

    Ok(())
}

/// `value` is parsed as JSON, so `12` is an integer while `"12"` or `1.5`
/// are rejected by validation.
pub async fn cmd_setting_set(
    config: &Config,
    context: &str,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    let service = settings_service(config).await?;

    let value: serde_json::Value =
        serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.into()));
    let setting = service.set_integer_value(context, key, &value).await?;

    println!(
        "{}.{} = {}",
        setting.context,
        setting.key,
        setting.raw_value().unwrap_or("(nil)")
    );

    Ok(())
}
