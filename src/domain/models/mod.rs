//! Domain models for the organization hierarchy.

pub mod config;
pub mod department;
pub mod employee;
pub mod id;
pub mod role;

pub use config::{Config, DatabaseConfig, LogFormat, LoggingConfig, RotationPolicy};
pub use department::{Department, DepartmentRef};
pub use employee::{Employee, EmployeeRef};
pub use id::{AsEntityId, UNSAVED_ID};
pub use role::{Role, RoleRef};
