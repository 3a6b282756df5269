//! Persistence gateway port.
//!
//! The cache layer reaches the relational store only through this trait:
//! parameterized statements go through `execute`, bulk reads and static
//! scripts through `query`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// A single bound parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    /// Row id generated by the last INSERT (meaningless for other statements).
    pub insert_id: i64,
    pub affected_rows: u64,
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, SqlValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.get(column)
    }

    fn require(&self, column: &str) -> DomainResult<&SqlValue> {
        self.values
            .get(column)
            .ok_or_else(|| DomainError::MissingColumn(column.to_string()))
    }

    /// Read an integer column. Numeric text is accepted and normalized.
    pub fn get_i64(&self, column: &str) -> DomainResult<i64> {
        self.get_optional_i64(column)?.ok_or_else(|| DomainError::InvalidColumn {
            column: column.to_string(),
            reason: "unexpected NULL".to_string(),
        })
    }

    pub fn get_optional_i64(&self, column: &str) -> DomainResult<Option<i64>> {
        match self.require(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v)),
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Real(v) if v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(v) => {
                Ok(Some(*v as i64))
            }
            SqlValue::Text(s) => s.trim().parse().map(Some).map_err(|_| invalid(column, s)),
            other => Err(invalid(column, other)),
        }
    }

    pub fn get_f64(&self, column: &str) -> DomainResult<f64> {
        match self.require(column)? {
            SqlValue::Real(v) => Ok(*v),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Integer(v) => Ok(*v as f64),
            SqlValue::Text(s) => s.trim().parse().map_err(|_| invalid(column, s)),
            SqlValue::Null => Err(invalid(column, "NULL")),
        }
    }

    pub fn get_string(&self, column: &str) -> DomainResult<String> {
        match self.require(column)? {
            SqlValue::Null => Err(invalid(column, "NULL")),
            value => Ok(value.to_string()),
        }
    }
}

/// 2^63: every integral `f64` in `[-2^63, 2^63)` fits an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn invalid(column: &str, value: impl fmt::Display) -> DomainError {
    DomainError::InvalidColumn {
        column: column.to_string(),
        reason: format!("cannot interpret {value}"),
    }
}

/// Connection to the relational store backing the cache.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Open the underlying connection. Opening an open gateway is a no-op.
    async fn open(&mut self) -> DomainResult<()>;

    /// Create the database if absent and apply the schema. Safe to re-run.
    async fn bootstrap(&self) -> DomainResult<()>;

    /// Run an INSERT/UPDATE/DELETE with bound parameters.
    async fn execute(&self, statement: &str, params: &[SqlValue]) -> DomainResult<ExecuteResult>;

    /// Run an unparameterized statement and collect its rows.
    async fn query(&self, statement: &str) -> DomainResult<Vec<Row>>;

    /// Close the connection. Further statements fail with `NotConnected`.
    async fn close(&mut self);

    fn is_open(&self) -> bool;
}
