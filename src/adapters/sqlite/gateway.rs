//! SQLite implementation of the `PersistenceGateway` port.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, SqlitePool, TypeInfo, ValueRef};

use crate::adapters::sqlite::connection::{create_pool, create_test_pool, verify_connection, PoolConfig};
use crate::adapters::sqlite::migrations::{all_embedded_migrations, Migrator, RESET_SCRIPT};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;
use crate::domain::ports::{ExecuteResult, PersistenceGateway, Row, SqlValue};

#[derive(Debug, Clone)]
enum Target {
    File { url: String, pool_config: PoolConfig },
    Memory,
}

/// Gateway over a single-connection `SQLite` pool.
///
/// The pool is created on `open` and dropped on `close`, so one gateway can
/// go through several open/close cycles. An in-memory gateway starts from an
/// empty database on every open.
pub struct SqliteGateway {
    target: Target,
    pool: Option<SqlitePool>,
}

impl SqliteGateway {
    pub fn new(database_url: impl Into<String>, pool_config: PoolConfig) -> Self {
        Self {
            target: Target::File {
                url: database_url.into(),
                pool_config,
            },
            pool: None,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            config.url(),
            PoolConfig {
                max_connections: config.max_connections,
                ..PoolConfig::default()
            },
        )
    }

    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            pool: None,
        }
    }

    pub fn pool(&self) -> DomainResult<&SqlitePool> {
        self.pool.as_ref().ok_or(DomainError::NotConnected)
    }

    /// Drop every organization table and re-apply the schema.
    pub async fn reset(&self) -> DomainResult<()> {
        let pool = self.pool()?;
        tracing::warn!("resetting organization schema");
        sqlx::raw_sql(RESET_SCRIPT).execute(pool).await?;
        self.bootstrap().await
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn open(&mut self) -> DomainResult<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let pool = match &self.target {
            Target::File { url, pool_config } => create_pool(url, Some(pool_config.clone())).await?,
            Target::Memory => create_test_pool().await?,
        };
        tracing::debug!("database connection opened");
        self.pool = Some(pool);
        Ok(())
    }

    async fn bootstrap(&self) -> DomainResult<()> {
        let pool = self.pool()?;
        verify_connection(pool).await?;

        let applied = Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await?;
        tracing::debug!(applied, "schema bootstrap complete");
        Ok(())
    }

    async fn execute(&self, statement: &str, params: &[SqlValue]) -> DomainResult<ExecuteResult> {
        let pool = self.pool()?;

        let mut query = sqlx::query(statement);
        for param in params {
            query = match param {
                SqlValue::Null => query.bind(None::<i64>),
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Real(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.clone()),
            };
        }

        let result = query.execute(pool).await?;
        Ok(ExecuteResult {
            insert_id: result.last_insert_rowid(),
            affected_rows: result.rows_affected(),
        })
    }

    async fn query(&self, statement: &str) -> DomainResult<Vec<Row>> {
        let pool = self.pool()?;
        let rows = sqlx::query(statement).fetch_all(pool).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            tracing::debug!("database connection closed");
        }
    }

    fn is_open(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| !pool.is_closed())
    }
}

/// Convert a driver row into a column-keyed `Row`, using each value's
/// runtime storage class.
fn convert_row(sqlite_row: &SqliteRow) -> DomainResult<Row> {
    let mut row = Row::new();

    for column in sqlite_row.columns() {
        let index = column.ordinal();
        let (is_null, storage_class) = {
            let raw = sqlite_row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };

        let value = if is_null {
            SqlValue::Null
        } else {
            match storage_class.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(sqlite_row.try_get(index)?),
                "REAL" => SqlValue::Real(sqlite_row.try_get(index)?),
                "BLOB" => {
                    let bytes: Vec<u8> = sqlite_row.try_get(index)?;
                    SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => SqlValue::Text(sqlite_row.try_get(index)?),
            }
        };
        row.insert(column.name(), value);
    }

    Ok(row)
}
