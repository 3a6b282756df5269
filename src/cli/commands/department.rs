//! Department CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::display::{format_salary, list_table, render_list};
use crate::cli::output::{output, ActionOutput, CommandOutput};
use crate::domain::models::{Config, Department};
use crate::domain::ports::PersistenceGateway;
use crate::services::OrgCache;

#[derive(Args, Debug)]
pub struct DepartmentArgs {
    #[command(subcommand)]
    pub command: DepartmentCommands,
}

#[derive(Subcommand, Debug)]
pub enum DepartmentCommands {
    /// List departments
    List,
    /// Create a department
    Add {
        /// Department name
        name: String,
    },
    /// Delete a department together with its roles and their employees
    Delete {
        /// Department ID
        id: String,
    },
    /// Show the combined salary of a department's employees
    Budget {
        /// Department ID
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct DepartmentOutput {
    pub id: i64,
    pub name: String,
    pub roles: usize,
    pub employees: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct DepartmentListOutput {
    pub departments: Vec<DepartmentOutput>,
    pub total: usize,
}

impl CommandOutput for DepartmentListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "roles", "employees"]);
        for department in &self.departments {
            table.add_row(vec![
                department.id.to_string(),
                department.name.clone(),
                department.roles.to_string(),
                department.employees.to_string(),
            ]);
        }
        render_list("department", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BudgetOutput {
    pub id: i64,
    pub name: String,
    pub employees: usize,
    pub budget: f64,
}

impl CommandOutput for BudgetOutput {
    fn to_human(&self) -> String {
        format!(
            "{} ({} employee(s)): utilized budget {}",
            self.name,
            self.employees,
            format_salary(self.budget)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: DepartmentArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut cache = super::open_cache(config).await?;
    let result = run(&mut cache, args, json_mode).await;
    cache.close().await;
    result
}

pub async fn run<G: PersistenceGateway>(
    cache: &mut OrgCache<G>,
    args: DepartmentArgs,
    json_mode: bool,
) -> Result<()> {
    match args.command {
        DepartmentCommands::List => {
            let departments: Vec<DepartmentOutput> = cache
                .departments()
                .iter()
                .map(|d| DepartmentOutput {
                    id: d.id(),
                    name: d.name().to_string(),
                    roles: cache.get_roles_by_department(d).len(),
                    employees: cache.get_employees_by_department(d).len(),
                })
                .collect();
            let total = departments.len();
            output(&DepartmentListOutput { departments, total }, json_mode);
        }
        DepartmentCommands::Add { name } => {
            let department = Department::new(name);
            cache
                .add_department(&department)
                .await
                .context("Failed to add department")?;
            let out = ActionOutput::success(format!("Added department {}", department.name()))
                .with_id(department.id());
            output(&out, json_mode);
        }
        DepartmentCommands::Delete { id } => {
            let removed = cache
                .delete_department_by_id(id.as_str())
                .await
                .context("Failed to delete department")?;
            let out = match removed {
                Some(department) => {
                    ActionOutput::success(format!("Deleted department {}", department.name()))
                        .with_id(department.id())
                }
                None => ActionOutput::failure(format!("Department {id} not found")),
            };
            output(&out, json_mode);
        }
        DepartmentCommands::Budget { id } => {
            let department = cache
                .get_department_by_id(id.as_str())
                .with_context(|| format!("Department {id} not found"))?;
            let out = BudgetOutput {
                id: department.id(),
                name: department.name().to_string(),
                employees: cache.get_employees_by_department(&department).len(),
                budget: cache.department_budget(&department),
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
