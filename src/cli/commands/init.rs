//! Implementation of the `employee-tracker init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::SqliteGateway;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::PersistenceGateway;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite the config file and reset the database
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub config_written: bool,
    pub database_path: String,
    pub database_reset: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("\nWrote configuration to {}", self.config_path.display()));
        }
        if self.success {
            let verb = if self.database_reset { "reset" } else { "initialized" };
            lines.push(format!("Database {verb} at {}", self.database_path));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let out = initialize(Path::new("."), args.force, config).await?;
    output(&out, json_mode);
    Ok(())
}

/// Write the default config under `base` and bootstrap the configured
/// database. With `force`, an existing config is overwritten and the
/// organization tables are dropped and recreated.
pub async fn initialize(base: &Path, force: bool, config: &Config) -> Result<InitOutput> {
    let config_path = ConfigLoader::config_file_path(base);

    if config_path.exists() && !force {
        return Ok(InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            config_path,
            config_written: false,
            database_path: config.database.path.clone(),
            database_reset: false,
        });
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to serialize default config")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let mut gateway = SqliteGateway::from_config(&config.database);
    gateway.open().await.context("Failed to open database")?;
    let bootstrapped = if force {
        gateway.reset().await
    } else {
        gateway.bootstrap().await
    };
    gateway.close().await;
    bootstrapped.context("Failed to initialize database schema")?;

    Ok(InitOutput {
        success: true,
        message: if force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        config_path,
        config_written: true,
        database_path: config.database.path.clone(),
        database_reset: force,
    })
}
