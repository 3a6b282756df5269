//! Domain layer for the employee tracker
//!
//! Entity models, errors and the persistence port the cache depends on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
