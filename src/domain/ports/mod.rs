//! Port trait definitions.
//!
//! The cache layer depends on these traits only, so the store behind it can
//! be swapped (SQLite in production, scripted fakes in tests).

pub mod gateway;

pub use gateway::{ExecuteResult, PersistenceGateway, Row, SqlValue};
