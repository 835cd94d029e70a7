//! SQLite query executor.
//!
//! Provides the `SqliteExecutor` struct that implements the `DatabaseClient`
//! trait for SQLite database files using sqlx. Every call opens its own
//! connection and closes it before returning. Only one statement runs per
//! call: text holding several is refused before the file is opened.

use crate::config::DatabaseConfig;
use crate::db::statements::count_statements;
use crate::db::{
    DatabaseClient, ExecutionError, ExecutionErrorKind, ExecutionOutcome, ResultSet, Row, Value,
};
use crate::error::{RewardError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row as SqlxRow, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Executes queries against one SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl SqliteExecutor {
    /// Creates an executor for the database file at `path`.
    ///
    /// Nothing is opened until a query runs.
    pub fn new(path: impl AsRef<Path>, settings: &DatabaseConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(false)
            .read_only(settings.read_only)
            .busy_timeout(Duration::from_millis(settings.busy_timeout_ms));

        Self { path, options }
    }

    /// Returns the database file this executor targets.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<SqliteConnection> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|e| {
                RewardError::connection(format!(
                    "Failed to open database {}: {e}",
                    self.path.display()
                ))
            })
    }
}

#[async_trait]
impl DatabaseClient for SqliteExecutor {
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        match count_statements(sql) {
            0 => return Ok(ExecutionOutcome::Success(ResultSet::new())),
            1 => {}
            n => {
                return Err(RewardError::multiple_statements(format!(
                    "Can only execute one statement at a time, found {n} in: {sql}"
                )))
            }
        }

        let mut conn = self.open().await?;

        let start = Instant::now();
        let fetched = sqlx::query(sql).persistent(false).fetch_all(&mut conn).await;
        let execution_time = start.elapsed();

        // Release the handle before looking at the result, whatever it is.
        if let Err(e) = conn.close().await {
            warn!("Failed to close {}: {e}", self.path.display());
        }

        match fetched {
            Ok(rows) => {
                debug!(
                    "Query returned {} rows in {:?}: {}",
                    rows.len(),
                    execution_time,
                    sql
                );
                let columns = rows
                    .first()
                    .map(|row| {
                        row.columns()
                            .iter()
                            .map(|col| col.name().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                match rows.iter().map(convert_row).collect::<std::result::Result<Vec<_>, _>>() {
                    Ok(rows) => Ok(ExecutionOutcome::Success(
                        ResultSet::with_data(columns, rows).with_execution_time(execution_time),
                    )),
                    Err(message) => {
                        debug!("Query result could not be decoded: {message}");
                        Ok(ExecutionOutcome::Failure(ExecutionError::new(
                            sql,
                            message,
                            ExecutionErrorKind::Operational,
                            None,
                        )))
                    }
                }
            }
            Err(e) => classify_error(sql, e),
        }
    }
}

/// Sorts an engine error into a query failure or a system fault.
fn classify_error(sql: &str, error: sqlx::Error) -> Result<ExecutionOutcome> {
    if let sqlx::Error::Database(db_error) = &error {
        let code = db_error.code().and_then(|c| c.parse::<i32>().ok());
        if let Some(kind) = code.and_then(ExecutionErrorKind::from_sqlite_code) {
            debug!("Query failed ({kind}, code {code:?}): {}", db_error.message());
            return Ok(ExecutionOutcome::Failure(ExecutionError::new(
                sql,
                db_error.message(),
                kind,
                code,
            )));
        }
    }

    Err(RewardError::connection(format!(
        "Engine failure while executing query: {error}"
    )))
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> std::result::Result<Row, String> {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a single column value, keyed on the value's storage class
/// rather than the column's declared type.
///
/// A value that cannot be decoded is an error, never a silent NULL.
fn convert_value(row: &SqliteRow, index: usize) -> std::result::Result<Value, String> {
    let column = row
        .columns()
        .get(index)
        .map(|col| col.name().to_string())
        .unwrap_or_default();

    let storage_class = {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| format!("Could not read column '{column}': {e}"))?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_uppercase()
    };

    match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get_unchecked::<i64, _>(index).map(Value::Int),
        "REAL" => row.try_get_unchecked::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::Bytes),
        // TEXT and the declared-only affinities (NUMERIC, DATE, ...)
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    }
    .map_err(|e| match row.try_get_unchecked::<Vec<u8>, _>(index) {
        Ok(bytes) if std::str::from_utf8(&bytes).is_err() => format!(
            "Could not decode to UTF-8 column '{column}' with text '{}'",
            String::from_utf8_lossy(&bytes)
        ),
        _ => format!("Could not decode column '{column}': {e}"),
    })
}
