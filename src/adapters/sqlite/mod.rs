//! SQLite database adapters for the employee tracker.

pub mod connection;
pub mod gateway;
pub mod migrations;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use gateway::SqliteGateway;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
