//! Employee Tracker - organization manager over a write-through cache
//!
//! Departments, roles and employees live in `SQLite` and are mirrored in
//! memory by [`OrgCache`]. Reads come from the mirror; writes reach the
//! store first and the mirror second, with deletes cascading through both.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): entity models, errors and the persistence port
//! - **Adapters** (`adapters`): the `SQLite` gateway, pool and migrations
//! - **Service Layer** (`services`): the cache synchronization layer
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): one-shot commands and the interactive shell
//!
//! # Example
//!
//! ```no_run
//! use employee_tracker::{Department, OrgCache, SqliteGateway};
//!
//! # async fn demo() -> employee_tracker::DomainResult<()> {
//! let mut cache = OrgCache::new(SqliteGateway::in_memory());
//! cache.start().await?;
//!
//! let sales = Department::new("Sales");
//! cache.add_department(&sales).await?;
//! assert!(cache.get_department_by_id(sales.id()).is_some());
//!
//! cache.close().await;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::sqlite::SqliteGateway;
pub use domain::models::{
    AsEntityId, Config, DatabaseConfig, Department, DepartmentRef, Employee, EmployeeRef,
    LoggingConfig, Role, RoleRef, UNSAVED_ID,
};
pub use domain::ports::{ExecuteResult, PersistenceGateway, Row, SqlValue};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CacheState, OrgCache};
