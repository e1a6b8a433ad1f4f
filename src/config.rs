use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Upper bound for `remember_time_seconds` (ten years).
const MAX_REMEMBER_TIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub authentication: AuthenticationConfig,
}

/// Deployment mode. Bootstrapping the first admin is refused in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    pub environment: Environment,

    /// Locale assigned to the bootstrap admin account.
    pub locale: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/ubiquo.db".to_string(),
            log_level: "info".to_string(),
            environment: Environment::Development,
            locale: "en".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    /// How long `remember_me` keeps a session alive (default: 14 days)
    pub remember_time_seconds: u64,

    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            remember_time_seconds: 14 * 24 * 60 * 60,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl AuthenticationConfig {
    #[must_use]
    pub fn remember_time(&self) -> chrono::Duration {
        i64::try_from(self.remember_time_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::seconds(MAX_REMEMBER_TIME_SECONDS as i64))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ubiquo").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ubiquo").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.authentication.remember_time_seconds == 0 {
            anyhow::bail!("Remember time must be greater than zero");
        }

        if self.authentication.remember_time_seconds > MAX_REMEMBER_TIME_SECONDS {
            anyhow::bail!("Remember time cannot exceed {MAX_REMEMBER_TIME_SECONDS} seconds");
        }

        argon2::Params::new(
            self.authentication.argon2_memory_cost_kib,
            self.authentication.argon2_time_cost,
            self.authentication.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.environment, Environment::Development);
        assert_eq!(config.authentication.remember_time_seconds, 1_209_600);
        assert_eq!(config.authentication.remember_time(), chrono::Duration::days(14));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[authentication]"));
        assert!(toml_str.contains("environment = \"development\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"
            environment = "production"

            [authentication]
            remember_time_seconds = 3600
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.general.environment.is_production());
        assert_eq!(config.authentication.remember_time(), chrono::Duration::hours(1));

        assert_eq!(config.general.locale, "en");
        assert_eq!(config.authentication.argon2_time_cost, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.authentication.remember_time_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.authentication.argon2_time_cost = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.authentication.remember_time_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }
}
