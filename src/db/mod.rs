//! Database access layer for sql-reward.
//!
//! Provides a trait-based interface for running queries, so the reward
//! logic can be driven by SQLite files or by scripted mocks.

mod locator;
mod mock;
mod sqlite;
mod statements;
mod types;

pub use locator::DatabaseLocator;
pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use sqlite::SqliteExecutor;
pub use statements::count_statements;
pub use types::{
    ExecutionError, ExecutionErrorKind, ExecutionOutcome, ResultSet, Row, Value,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for query execution.
///
/// `Ok(Failure(..))` means the engine rejected the query; `Err(..)` means
/// the engine or its environment broke and no verdict on the query exists.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and fetches every row it produces.
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome>;
}
