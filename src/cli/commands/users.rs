use crate::config::Config;
use crate::db::{Store, UserFilter};
use crate::services::{AuthService, FirstAdminOutcome, SeaOrmAuthService};

async fn auth_service(config: &Config) -> anyhow::Result<SeaOrmAuthService> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    SeaOrmAuthService::new(store, config)
}

pub async fn cmd_create_admin(config: &Config, login: &str, password: &str) -> anyhow::Result<()> {
    let service = auth_service(config).await?;

    match service.create_first_admin(login, password).await? {
        FirstAdminOutcome::Created(user) => {
            println!("Created superadmin '{}' ({})", user.login, user.full_name());
        }
        FirstAdminOutcome::Refused => {
            println!("First admin not created: users already exist or running in production.");
        }
        FirstAdminOutcome::Invalid(errors) => {
            println!("First admin not created:");
            for error in errors.iter() {
                println!("  • {} {}", error.field, error.message);
            }
        }
    }

    Ok(())
}

pub async fn cmd_authenticate(config: &Config, login: &str, password: &str) -> anyhow::Result<()> {
    let service = auth_service(config).await?;

    match service.authenticate(login, password).await? {
        Some(user) => println!("✓ Authenticated as {} (ID: {:?})", user.full_name(), user.id),
        None => println!("✗ Authentication failed"),
    }

    Ok(())
}

pub async fn cmd_reset_password(config: &Config, login: &str) -> anyhow::Result<()> {
    let service = auth_service(config).await?;
    let mut user = service.get_user_by_login(login).await?;

    let password = service.reset_password(&mut user).await?;
    println!("New password for '{}': {password}", user.login);

    Ok(())
}

pub async fn cmd_list_users(config: &Config, filter: UserFilter) -> anyhow::Result<()> {
    let service = auth_service(config).await?;
    let users = service.list_users(&filter).await?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let mut flags = Vec::new();
        if user.is_superadmin {
            flags.push("superadmin");
        } else if user.is_admin {
            flags.push("admin");
        }
        if !user.is_active {
            flags.push("inactive");
        }

        println!("• {} <{}>", user.full_name(), user.email);
        println!(
            "  ID: {} | Login: {} | Flags: {}",
            user.id.unwrap_or_default(),
            user.login,
            if flags.is_empty() {
                "-".to_string()
            } else {
                flags.join(", ")
            }
        );
    }

    Ok(())
}
