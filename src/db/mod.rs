use crate::entities::ubiquo_roles;
use crate::models::setting::IntegerSetting;
use crate::models::user::UbiquoUser;
use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::setting::SettingRepository;
pub use repositories::user::{UniqueField, UserFilter, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory SQLite database sees its own
        // empty database, so those are pinned to a single connection.
        let in_memory = db_url.contains(":memory:");
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<UbiquoUser>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<UbiquoUser>> {
        self.user_repo().get_by_login(login).await
    }

    pub async fn get_user_by_remember_token(&self, token: &str) -> Result<Option<UbiquoUser>> {
        self.user_repo().get_by_remember_token(token).await
    }

    pub async fn is_user_field_taken(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool> {
        self.user_repo().is_taken(field, value, exclude_id).await
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UbiquoUser>> {
        self.user_repo().list(filter).await
    }

    pub async fn save_user(&self, user: &UbiquoUser) -> Result<UbiquoUser> {
        self.user_repo().save(user).await
    }

    pub async fn ensure_role(&self, name: &str) -> Result<i32> {
        self.user_repo().ensure_role(name).await
    }

    pub async fn list_roles(&self) -> Result<Vec<ubiquo_roles::Model>> {
        self.user_repo().list_roles().await
    }

    // ========== Setting Repository Methods ==========

    #[must_use]
    pub fn setting_repo(&self) -> SettingRepository {
        SettingRepository::new(self.conn.clone())
    }

    pub async fn get_integer_setting(
        &self,
        context: &str,
        key: &str,
    ) -> Result<Option<IntegerSetting>> {
        self.setting_repo().get_integer(context, key).await
    }

    pub async fn list_integer_settings(&self, context: &str) -> Result<Vec<IntegerSetting>> {
        self.setting_repo().list_integers(context).await
    }

    pub async fn save_integer_setting(&self, setting: &IntegerSetting) -> Result<IntegerSetting> {
        self.setting_repo().save_integer(setting).await
    }

    pub async fn save_integer_settings(
        &self,
        settings: &[IntegerSetting],
    ) -> Result<Vec<IntegerSetting>> {
        self.setting_repo().save_integers(settings).await
    }
}
