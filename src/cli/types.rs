//! Top-level CLI grammar.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::department::DepartmentArgs;
use super::commands::employee::EmployeeArgs;
use super::commands::init::InitArgs;
use super::commands::role::RoleArgs;

#[derive(Parser, Debug)]
#[command(name = "employee-tracker")]
#[command(about = "Employee Tracker - manage departments, roles and employees", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Extra configuration file layered over the project config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default configuration and bootstrap the database
    Init(InitArgs),

    /// Start an interactive session
    Shell,

    /// Reload every table from the database and report counts
    Refresh,

    /// Department management commands
    Department(DepartmentArgs),

    /// Role management commands
    Role(RoleArgs),

    /// Employee management commands
    Employee(EmployeeArgs),
}
