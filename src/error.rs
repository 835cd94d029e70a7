//! Error types for sql-reward.
//!
//! Defines the main error enum used throughout the crate. Candidate query
//! failures are not errors; they are carried as `ExecutionOutcome::Failure`
//! and scored. Everything here aborts a reward computation.

use crate::db::ExecutionError;
use thiserror::Error;

/// Main error type for reward computations.
#[derive(Error, Debug)]
pub enum RewardError {
    /// The database name did not resolve to an existing file.
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The database could not be opened or the engine failed outside of
    /// query evaluation (I/O, corruption, driver errors).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The query text holds more than one statement; nothing was run.
    #[error("Multiple statements: {0}")]
    MultipleStatements(String),

    /// The reference query failed to execute.
    #[error("Solution query error: {0}")]
    SolutionQuery(ExecutionError),

    /// A row-set comparison hit an empty side under the `reject` policy.
    #[error("Degenerate row set: {0}")]
    DegenerateRowSet(String),

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (runtime construction, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RewardError {
    /// Creates a resolution error with the given message.
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a multiple statements error with the given message.
    pub fn multiple_statements(msg: impl Into<String>) -> Self {
        Self::MultipleStatements(msg.into())
    }

    /// Creates a degenerate row set error with the given message.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateRowSet(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "Resolution Error",
            Self::Connection(_) => "Connection Error",
            Self::MultipleStatements(_) => "Multiple Statements",
            Self::SolutionQuery(_) => "Solution Query Error",
            Self::DegenerateRowSet(_) => "Degenerate Row Set",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using RewardError.
pub type Result<T> = std::result::Result<T, RewardError>;
