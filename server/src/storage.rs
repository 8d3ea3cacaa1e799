//! Storage collaborator: where records go and where read queries run.
//!
//! # Design
//! Handlers only see the `Storage` trait. `SqliteStorage` is the production
//! implementation; an in-memory SQLite URL gives tests the same engine.
//! Column names for inserts come from client JSON, so they are checked
//! against the table's real columns (read once at connect time) before any
//! SQL is assembled.

use std::collections::HashSet;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use navien_core::query::quote_identifier;
use navien_core::{ApiError, BoundQuery, RecordMapping, Row, TableName};
use serde_json::Value;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
                    | ErrorKind::ForeignKeyViolation
            ) {
                return StorageError::Constraint(db.message().to_string());
            }
        }
        StorageError::Database(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownColumn(_) | StorageError::Constraint(_) => {
                ApiError::StorageRejected(err.to_string())
            }
            StorageError::Database(e) => ApiError::Storage(e.to_string()),
        }
    }
}

pub trait Storage: Send + Sync + 'static {
    fn insert(&self, record: &RecordMapping) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn select(&self, query: &BoundQuery) -> impl Future<Output = Result<Vec<Row>, StorageError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    table: TableName,
    columns: Arc<HashSet<String>>,
}

impl SqliteStorage {
    /// Opens `database_url` and makes sure the demo table exists.
    ///
    /// In-memory databases live as long as their connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(database_url: &str, table: TableName) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool = SqlitePoolOptions::new();
        if is_in_memory(database_url) {
            pool = pool
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool.connect_with(options).await?;
        Self::with_pool(pool, table).await
    }

    pub async fn with_pool(pool: SqlitePool, table: TableName) -> Result<Self, StorageError> {
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                id TEXT PRIMARY KEY NOT NULL, \
                title TEXT NOT NULL, \
                completed BOOLEAN NOT NULL DEFAULT 0, \
                url TEXT\
            )"
        );
        sqlx::query(&create).execute(&pool).await?;

        let info = sqlx::query(&format!("PRAGMA table_info({table})"))
            .fetch_all(&pool)
            .await?;
        let columns = info
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<HashSet<_>, _>>()?;
        tracing::debug!(table = table.as_str(), ?columns, "storage ready");

        Ok(Self {
            pool,
            table,
            columns: Arc::new(columns),
        })
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }
}

impl Storage for SqliteStorage {
    async fn insert(&self, record: &RecordMapping) -> Result<(), StorageError> {
        let row = record.to_row();
        let mut columns = Vec::with_capacity(row.len());
        for key in row.keys() {
            if !self.columns.contains(key) {
                return Err(StorageError::UnknownColumn(key.clone()));
            }
            columns.push(quote_identifier(key));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let mut query = sqlx::query(&sql);
        for value in row.values() {
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => query.bind(n.as_f64()),
                },
                Value::String(s) => query.bind(s.as_str()),
                nested => query.bind(nested.to_string()),
            };
        }
        query
            .execute(&self.pool)
            .await
            .map_err(StorageError::classify)?;
        Ok(())
    }

    async fn select(&self, query: &BoundQuery) -> Result<Vec<Row>, StorageError> {
        let mut statement = sqlx::query(&query.sql);
        for value in &query.binds {
            statement = statement.bind(value.as_str());
        }
        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::classify)?;
        rows.iter()
            .map(row_to_json)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StorageError::from)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Decodes a row by the type each value was stored with. A boolean column
/// only yields JSON booleans for stored `0`/`1`; SQLite keeps whatever else
/// a client sent, and that is returned as it was stored.
fn row_to_json(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let stored = raw.type_info().name().to_ascii_uppercase();
            let value = match stored.as_str() {
                "INTEGER" | "BIGINT" => Value::from(row.try_get::<i64, _>(idx)?),
                "REAL" => Value::from(row.try_get::<f64, _>(idx)?),
                "BLOB" => Value::from(row.try_get::<Vec<u8>, _>(idx)?),
                _ => Value::String(row.try_get::<String, _>(idx)?),
            };
            let declared = column.type_info().name().to_ascii_uppercase();
            if matches!(declared.as_str(), "BOOLEAN" | "BOOL") {
                as_flag(value)
            } else {
                value
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn as_flag(value: Value) -> Value {
    match value.as_i64() {
        Some(0) => Value::Bool(false),
        Some(1) => Value::Bool(true),
        _ => value,
    }
}
