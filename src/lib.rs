pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use std::path::Path;

use clap::Parser;
use cli::{Cli, Commands, SettingCommands};
pub use config::Config;
use db::UserFilter;
use tracing_subscriber::EnvFilter;

pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::CreateAdmin { login, password } => {
            cli::cmd_create_admin(&config, &login, &password).await
        }

        Commands::Authenticate { login, password } => {
            cli::cmd_authenticate(&config, &login, &password).await
        }

        Commands::ResetPassword { login } => cli::cmd_reset_password(&config, &login).await,

        Commands::Users {
            text,
            admin,
            active,
        } => cli::cmd_list_users(&config, UserFilter { text, admin, active }).await,

        Commands::Setting { command } => match command {
            SettingCommands::Get { context, key } => {
                cli::cmd_setting_get(&config, &context, &key).await
            }
            SettingCommands::List { context } => cli::cmd_setting_list(&config, &context).await,
            SettingCommands::Set {
                context,
                key,
                value,
            } => cli::cmd_setting_set(&config, &context, &key, &value).await,
        },

        Commands::Init => cli::cmd_init(Path::new("config.toml")),
    }
}
