use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_ubiquo_users_login_lower ON ubiquo_users(lower(login))",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_ubiquo_users_email_lower ON ubiquo_users(lower(email))",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_ubiquo_settings_context_key ON ubiquo_settings(context, \"key\")",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_ubiquo_settings_context_key")
            .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_ubiquo_users_email_lower")
            .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_ubiquo_users_login_lower")
            .await?;

        Ok(())
    }
}
