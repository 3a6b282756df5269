//! Employee CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::rc::Rc;

use crate::cli::display::{format_salary, list_table, render_list};
use crate::cli::output::{output, truncate, ActionOutput, CommandOutput};
use crate::domain::models::{Config, Employee, EmployeeRef};
use crate::domain::ports::PersistenceGateway;
use crate::services::OrgCache;

#[derive(Args, Debug)]
pub struct EmployeeArgs {
    #[command(subcommand)]
    pub command: EmployeeCommands,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// List employees
    List {
        /// Only employees in this department
        #[arg(short, long)]
        department: Option<String>,
        /// Only employees holding this role
        #[arg(short, long)]
        role: Option<String>,
        /// Only direct reports of this employee
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Hire an employee
    Add {
        /// First name
        first_name: String,
        /// Last name
        last_name: String,
        /// Role ID
        #[arg(short, long)]
        role: String,
        /// Manager's employee ID
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Move an employee to another role
    SetRole {
        /// Employee ID
        id: String,
        /// New role ID
        role: String,
    },
    /// Assign a manager, or clear it when no manager is given
    SetManager {
        /// Employee ID
        id: String,
        /// Manager's employee ID
        manager: Option<String>,
    },
    /// Delete an employee; their reports are left without a manager
    Delete {
        /// Employee ID
        id: String,
    },
}

/// One employee row with its role, department and manager resolved.
#[derive(Debug, serde::Serialize)]
pub struct EmployeeOutput {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub department: String,
    pub salary: f64,
    pub manager_id: Option<i64>,
    pub manager: Option<String>,
}

impl EmployeeOutput {
    pub fn build<G: PersistenceGateway>(cache: &OrgCache<G>, employee: &Employee) -> Self {
        let role = employee.role();
        Self {
            id: employee.id(),
            first_name: employee.first_name().to_string(),
            last_name: employee.last_name().to_string(),
            title: role.title().to_string(),
            department: role.department().name().to_string(),
            salary: role.salary(),
            manager_id: employee.manager_id(),
            manager: cache.manager_of(employee).map(|m| m.full_name()),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct EmployeeListOutput {
    pub employees: Vec<EmployeeOutput>,
    pub total: usize,
}

impl CommandOutput for EmployeeListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&[
            "id", "first name", "last name", "title", "department", "salary", "manager",
        ]);
        for e in &self.employees {
            table.add_row(vec![
                e.id.to_string(),
                truncate(&e.first_name, 20),
                truncate(&e.last_name, 20),
                truncate(&e.title, 30),
                truncate(&e.department, 24),
                format_salary(e.salary),
                e.manager.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        render_list("employee", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: EmployeeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut cache = super::open_cache(config).await?;
    let result = run(&mut cache, args, json_mode).await;
    cache.close().await;
    result
}

fn retain_in(employees: &mut Vec<EmployeeRef>, keep: &[EmployeeRef]) {
    employees.retain(|e| keep.iter().any(|k| Rc::ptr_eq(k, e)));
}

fn find_employee<G: PersistenceGateway>(cache: &OrgCache<G>, id: &str) -> Result<EmployeeRef> {
    cache
        .get_employee_by_id(id)
        .with_context(|| format!("Employee {id} not found"))
}

pub async fn run<G: PersistenceGateway>(
    cache: &mut OrgCache<G>,
    args: EmployeeArgs,
    json_mode: bool,
) -> Result<()> {
    match args.command {
        EmployeeCommands::List { department, role, manager } => {
            let mut employees = cache.employees();
            if let Some(id) = department {
                retain_in(&mut employees, &cache.get_employees_by_department_id(id.as_str()));
            }
            if let Some(id) = role {
                retain_in(&mut employees, &cache.get_employees_by_role_id(id.as_str()));
            }
            if let Some(id) = manager {
                retain_in(&mut employees, &cache.get_employees_by_manager_id(id.as_str()));
            }

            let employees: Vec<EmployeeOutput> =
                employees.iter().map(|e| EmployeeOutput::build(cache, e)).collect();
            let total = employees.len();
            output(&EmployeeListOutput { employees, total }, json_mode);
        }
        EmployeeCommands::Add { first_name, last_name, role, manager } => {
            let role = cache
                .get_role_by_id(role.as_str())
                .with_context(|| format!("Role {role} not found"))?;
            let manager = match manager {
                Some(id) => Some(find_employee(cache, &id)?),
                None => None,
            };

            let employee = Employee::new(first_name, last_name, &role, manager.as_ref());
            cache.add_employee(&employee).await.context("Failed to add employee")?;
            let out = ActionOutput::success(format!(
                "Added employee {} as {}",
                employee.full_name(),
                role.title()
            ))
            .with_id(employee.id());
            output(&out, json_mode);
        }
        EmployeeCommands::SetRole { id, role } => {
            let employee = find_employee(cache, &id)?;
            let role = cache
                .get_role_by_id(role.as_str())
                .with_context(|| format!("Role {role} not found"))?;
            cache
                .update_employee_role(&employee, &role)
                .await
                .context("Failed to update employee role")?;
            let out = ActionOutput::success(format!(
                "{} is now {}",
                employee.full_name(),
                role.title()
            ))
            .with_id(employee.id());
            output(&out, json_mode);
        }
        EmployeeCommands::SetManager { id, manager } => {
            let employee = find_employee(cache, &id)?;
            let manager = match manager {
                Some(manager_id) => Some(find_employee(cache, &manager_id)?),
                None => None,
            };
            cache
                .update_employee_manager(&employee, manager.as_ref())
                .await
                .context("Failed to update employee manager")?;
            let message = match manager {
                Some(m) => format!("{} now reports to {}", employee.full_name(), m.full_name()),
                None => format!("{} no longer has a manager", employee.full_name()),
            };
            output(&ActionOutput::success(message).with_id(employee.id()), json_mode);
        }
        EmployeeCommands::Delete { id } => {
            let removed = cache
                .delete_employee_by_id(id.as_str())
                .await
                .context("Failed to delete employee")?;
            let out = match removed {
                Some(employee) => {
                    ActionOutput::success(format!("Deleted employee {}", employee.full_name()))
                        .with_id(employee.id())
                }
                None => ActionOutput::failure(format!("Employee {id} not found")),
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
