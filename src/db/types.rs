//! Query result types for sql-reward.
//!
//! Defines the structures used to represent query results and execution
//! outcomes. Values implement set semantics the way SQLite compares them:
//! an integer and a real holding the same number are the same value.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use thiserror::Error;

/// Rows produced by executing a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names, in select-list order.
    pub columns: Vec<String>,

    /// Rows of data, in the order the engine produced them.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    #[serde(with = "duration_serde")]
    pub execution_time: Duration,
}

impl ResultSet {
    /// Creates a new empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a result set with the given columns and rows.
    pub fn with_data(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
        }
    }

    /// Creates a result set from rows alone.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::with_data(Vec::new(), rows)
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows, duplicates included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the distinct rows, ignoring order.
    pub fn distinct_rows(&self) -> HashSet<&Row> {
        self.rows.iter().collect()
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single SQLite value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// INTEGER storage class.
    Int(i64),

    /// REAL storage class.
    Float(f64),

    /// TEXT storage class.
    String(String),

    /// BLOB storage class.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer this value is numerically equal to, if any.
    ///
    /// Reals with no fractional part that fit in an `i64` map to that
    /// integer, so `Int(1)` and `Float(1.0)` compare and hash the same.
    fn as_exact_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                match (self.as_exact_int(), other.as_exact_int()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::Float(f) => match self.as_exact_int() {
                Some(i) => {
                    state.write_u8(1);
                    i.hash(state);
                }
                None => {
                    state.write_u8(2);
                    let bits = if f.is_nan() { f64::NAN.to_bits() } else { f.to_bits() };
                    bits.hash(state);
                }
            },
            Value::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Value::Bytes(b) => {
                state.write_u8(4);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Which class of engine failure a query hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionErrorKind {
    /// Malformed SQL, missing tables or columns, locked or read-only files.
    Operational,
    /// Constraint violations and datatype mismatches.
    Integrity,
}

impl ExecutionErrorKind {
    /// Classifies a SQLite result code (primary or extended).
    ///
    /// Returns `None` for codes that indicate a fault in the environment
    /// rather than in the query (corruption, out-of-memory, misuse, ...).
    pub fn from_sqlite_code(code: i32) -> Option<Self> {
        match code & 0xff {
            // ERROR, PERM, ABORT, BUSY, LOCKED, READONLY, INTERRUPT, IOERR,
            // FULL, CANTOPEN, PROTOCOL, EMPTY, SCHEMA
            1 | 3 | 4 | 5 | 6 | 8 | 9 | 10 | 13 | 14 | 15 | 16 | 17 => Some(Self::Operational),
            // CONSTRAINT, MISMATCH
            19 | 20 => Some(Self::Integrity),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operational => write!(f, "operational"),
            Self::Integrity => write!(f, "integrity"),
        }
    }
}

/// A query that the engine refused to run.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("Error when executing {query}: {message}")]
pub struct ExecutionError {
    /// The SQL text that failed.
    pub query: String,

    /// Engine error message.
    pub message: String,

    /// Failure class.
    pub kind: ExecutionErrorKind,

    /// SQLite extended result code, when the engine reported one.
    pub code: Option<i32>,
}

impl ExecutionError {
    /// Creates a new execution error.
    pub fn new(
        query: impl Into<String>,
        message: impl Into<String>,
        kind: ExecutionErrorKind,
        code: Option<i32>,
    ) -> Self {
        Self {
            query: query.into(),
            message: message.into(),
            kind,
            code,
        }
    }
}

/// Outcome of running one query.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The query ran; these are its rows.
    Success(ResultSet),
    /// The query was rejected by the engine.
    Failure(ExecutionError),
}

impl ExecutionOutcome {
    /// Returns true if the query ran.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> std::result::Result<ResultSet, ExecutionError> {
        match self {
            Self::Success(rows) => Ok(rows),
            Self::Failure(e) => Err(e),
        }
    }
}

/// Serde support for Duration (not natively supported by serde).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos as u64))
    }
}
