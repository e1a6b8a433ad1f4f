use std::path::Path;

use crate::config::Config;

/// Writes a default `config.toml` unless one already exists.
pub fn cmd_init(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    Config::default().save_to_path(path)?;
    println!("Created default config file: {}", path.display());
    Ok(())
}
