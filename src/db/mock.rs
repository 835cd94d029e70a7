//! Mock database clients for testing.
//!
//! Provide scripted outcomes so reward logic can be tested without a
//! database file.

use super::{DatabaseClient, ExecutionError, ExecutionErrorKind, ExecutionOutcome, ResultSet, Row};
use crate::error::{RewardError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A mock database client that returns predefined outcomes per query.
///
/// Unscripted queries fail the way SQLite reports an unknown table.
#[derive(Default)]
pub struct MockDatabaseClient {
    outcomes: HashMap<String, ExecutionOutcome>,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a mock with no scripted queries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `sql` to succeed with `rows`.
    pub fn with_rows(mut self, sql: impl Into<String>, rows: Vec<Row>) -> Self {
        self.outcomes.insert(
            sql.into(),
            ExecutionOutcome::Success(ResultSet::from_rows(rows)),
        );
        self
    }

    /// Scripts `sql` to fail with an operational error carrying `message`.
    pub fn with_failure(mut self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        let sql = sql.into();
        let error = ExecutionError::new(
            sql.clone(),
            message,
            ExecutionErrorKind::Operational,
            Some(1),
        );
        self.outcomes.insert(sql, ExecutionOutcome::Failure(error));
        self
    }

    /// Returns every query executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        if let Ok(mut log) = self.executed.lock() {
            log.push(sql.to_string());
        }

        Ok(self.outcomes.get(sql).cloned().unwrap_or_else(|| {
            ExecutionOutcome::Failure(ExecutionError::new(
                sql,
                format!("no such table: mock ({sql})"),
                ExecutionErrorKind::Operational,
                Some(1),
            ))
        }))
    }
}

/// A database client whose engine is broken: every call is a system fault.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that fails with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute(&self, _sql: &str) -> Result<ExecutionOutcome> {
        Err(RewardError::connection(self.message.clone()))
    }
}
