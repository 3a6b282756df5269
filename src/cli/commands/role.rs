//! Role CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::display::{format_salary, list_table, render_list};
use crate::cli::output::{output, truncate, ActionOutput, CommandOutput};
use crate::domain::models::{Config, Role};
use crate::domain::ports::PersistenceGateway;
use crate::services::OrgCache;

#[derive(Args, Debug)]
pub struct RoleArgs {
    #[command(subcommand)]
    pub command: RoleCommands,
}

#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    /// List roles
    List {
        /// Only roles in this department
        #[arg(short, long)]
        department: Option<String>,
    },
    /// Create a role in a department
    Add {
        /// Role title
        title: String,
        /// Yearly salary
        #[arg(short, long)]
        salary: f64,
        /// Department ID
        #[arg(short, long)]
        department: String,
    },
    /// Delete a role and every employee holding it
    Delete {
        /// Role ID
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct RoleOutput {
    pub id: i64,
    pub title: String,
    pub salary: f64,
    pub department_id: i64,
    pub department: String,
}

impl From<&Role> for RoleOutput {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id(),
            title: role.title().to_string(),
            salary: role.salary(),
            department_id: role.department_id(),
            department: role.department().name().to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RoleListOutput {
    pub roles: Vec<RoleOutput>,
    pub total: usize,
}

impl CommandOutput for RoleListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "title", "department", "salary"]);
        for role in &self.roles {
            table.add_row(vec![
                role.id.to_string(),
                truncate(&role.title, 30),
                truncate(&role.department, 24),
                format_salary(role.salary),
            ]);
        }
        render_list("role", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RoleArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut cache = super::open_cache(config).await?;
    let result = run(&mut cache, args, json_mode).await;
    cache.close().await;
    result
}

pub async fn run<G: PersistenceGateway>(
    cache: &mut OrgCache<G>,
    args: RoleArgs,
    json_mode: bool,
) -> Result<()> {
    match args.command {
        RoleCommands::List { department } => {
            let roles = match department {
                Some(id) => cache.get_roles_by_department_id(id.as_str()),
                None => cache.roles(),
            };
            let roles: Vec<RoleOutput> = roles.iter().map(|r| RoleOutput::from(&**r)).collect();
            let total = roles.len();
            output(&RoleListOutput { roles, total }, json_mode);
        }
        RoleCommands::Add { title, salary, department } => {
            let department = cache
                .get_department_by_id(department.as_str())
                .with_context(|| format!("Department {department} not found"))?;
            let role = Role::new(title, salary, &department);
            cache.add_role(&role).await.context("Failed to add role")?;
            let out = ActionOutput::success(format!(
                "Added role {} to {}",
                role.title(),
                department.name()
            ))
            .with_id(role.id());
            output(&out, json_mode);
        }
        RoleCommands::Delete { id } => {
            let removed = cache
                .delete_role_by_id(id.as_str())
                .await
                .context("Failed to delete role")?;
            let out = match removed {
                Some(role) => {
                    ActionOutput::success(format!("Deleted role {}", role.title())).with_id(role.id())
                }
                None => ActionOutput::failure(format!("Role {id} not found")),
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
