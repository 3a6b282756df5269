//! Implementation of the `employee-tracker refresh` command.

use anyhow::{Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::PersistenceGateway;
use crate::services::OrgCache;

#[derive(Debug, serde::Serialize)]
pub struct RefreshOutput {
    pub departments: usize,
    pub roles: usize,
    pub employees: usize,
}

impl CommandOutput for RefreshOutput {
    fn to_human(&self) -> String {
        format!(
            "Reloaded {} department(s), {} role(s), {} employee(s).",
            self.departments, self.roles, self.employees
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let mut cache = super::open_cache(config).await?;
    let result = run(&mut cache, json_mode).await;
    cache.close().await;
    result
}

pub async fn run<G: PersistenceGateway>(cache: &mut OrgCache<G>, json_mode: bool) -> Result<()> {
    cache.refresh_caches().await.context("Failed to refresh caches")?;
    let out = RefreshOutput {
        departments: cache.departments().len(),
        roles: cache.roles().len(),
        employees: cache.employees().len(),
    };
    output(&out, json_mode);
    Ok(())
}
