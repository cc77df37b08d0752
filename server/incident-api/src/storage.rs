//! Storage gateway: the only path from the services to the SQLite store.
//!
//! Every statement goes through [`StorageGateway::read_rows`] or
//! [`StorageGateway::execute`] with its values passed as bound [`Param`]s.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, ValueRef};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("database: {0}")]
  Database(#[from] sqlx::Error),

  #[error("decode: column {column}: {reason}")]
  Decode { column: String, reason: String },
}

impl StorageError {
  pub fn decode(column: &str, reason: impl Into<String>) -> Self {
    Self::Decode {
      column: column.to_string(),
      reason: reason.into(),
    }
  }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
  Integer(i64),
  Text(String),
}

impl From<i64> for Param {
  fn from(v: i64) -> Self {
    Self::Integer(v)
  }
}

impl From<&str> for Param {
  fn from(v: &str) -> Self {
    Self::Text(v.to_string())
  }
}

impl From<String> for Param {
  fn from(v: String) -> Self {
    Self::Text(v)
  }
}

/// One stored value, tagged with its SQLite storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

/// A result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
  columns: BTreeMap<String, SqlValue>,
}

impl Row {
  pub fn get(&self, column: &str) -> Option<&SqlValue> {
    self.columns.get(column)
  }

  pub fn get_i64(&self, column: &str) -> Result<i64, StorageError> {
    match self.require(column)? {
      SqlValue::Integer(v) => Ok(*v),
      other => Err(StorageError::decode(column, format!("expected integer, got {:?}", other))),
    }
  }

  /// Like [`Row::get_i64`], but a stored NULL is `None`.
  pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, StorageError> {
    match self.require(column)? {
      SqlValue::Null => Ok(None),
      _ => self.get_i64(column).map(Some),
    }
  }

  pub fn get_str(&self, column: &str) -> Result<&str, StorageError> {
    match self.require(column)? {
      SqlValue::Text(v) => Ok(v),
      other => Err(StorageError::decode(column, format!("expected text, got {:?}", other))),
    }
  }

  /// Text form of a non-null value; integers and reals render in decimal.
  pub fn get_display(&self, column: &str) -> Result<String, StorageError> {
    match self.require(column)? {
      SqlValue::Text(v) => Ok(v.clone()),
      SqlValue::Integer(v) => Ok(v.to_string()),
      SqlValue::Real(v) => Ok(v.to_string()),
      SqlValue::Null => Err(StorageError::decode(column, "unexpected null")),
    }
  }

  fn require(&self, column: &str) -> Result<&SqlValue, StorageError> {
    self
      .columns
      .get(column)
      .ok_or_else(|| StorageError::decode(column, "missing column"))
  }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for Row {
  fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
    Self {
      columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    }
  }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Parameterized access to the relational store. No retries; every failure is
/// returned to the caller.
#[async_trait]
pub trait StorageGateway: Send + Sync {
  /// Run a SELECT and return all rows.
  async fn read_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, StorageError>;

  /// Run a mutation and return the number of rows it affected.
  async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError>;
}

/// sqlx-backed gateway over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
  pool: SqlitePool,
}

impl SqliteGateway {
  /// Open an existing database file in read-write mode.
  pub async fn open(config: &Config) -> Result<Self, StorageError> {
    let options = SqliteConnectOptions::new()
      .filename(&config.db_path)
      .create_if_missing(false)
      .read_only(false);
    let pool = SqlitePoolOptions::new()
      .max_connections(config.max_connections)
      .connect_with(options)
      .await?;
    info!(path = %config.db_path.display(), "connected to database");
    Ok(Self { pool })
  }

  /// A private in-memory database on a single long-lived connection.
  pub async fn in_memory() -> Result<Self, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .min_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect_with(options)
      .await?;
    Ok(Self { pool })
  }

  /// Close every pooled connection; waits for checked-out connections.
  pub async fn close(&self) {
    self.pool.close().await;
    info!("database connections closed");
  }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_all<'q>(mut query: SqliteQuery<'q>, params: &'q [Param]) -> SqliteQuery<'q> {
  for param in params {
    query = match param {
      Param::Integer(v) => query.bind(*v),
      Param::Text(v) => query.bind(v.as_str()),
    };
  }
  query
}

/// Decode by storage class: the first type whose compatibility check accepts
/// the stored value wins.
fn decode_row(row: &SqliteRow) -> Result<Row, StorageError> {
  let mut columns = BTreeMap::new();
  for (i, column) in row.columns().iter().enumerate() {
    let is_null = row.try_get_raw(i)?.is_null();
    let value = if is_null {
      SqlValue::Null
    } else if let Ok(v) = row.try_get::<i64, _>(i) {
      SqlValue::Integer(v)
    } else if let Ok(v) = row.try_get::<f64, _>(i) {
      SqlValue::Real(v)
    } else if let Ok(v) = row.try_get::<String, _>(i) {
      SqlValue::Text(v)
    } else {
      let bytes = row.try_get::<Vec<u8>, _>(i)?;
      SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
    };
    columns.insert(column.name().to_string(), value);
  }
  Ok(Row { columns })
}

#[async_trait]
impl StorageGateway for SqliteGateway {
  async fn read_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, StorageError> {
    debug!(sql, ?params, "read_rows");
    let rows = bind_all(sqlx::query(sql), params)
      .fetch_all(&self.pool)
      .await?;
    rows.iter().map(decode_row).collect()
  }

  async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError> {
    debug!(sql, ?params, "execute");
    let result = bind_all(sqlx::query(sql), params)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }
}
