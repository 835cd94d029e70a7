//! sql-reward - scores generated SQL against reference queries.
//!
//! A candidate query that runs is rewarded by how well its rows match the
//! solution's rows; one that does not run falls back to how lexically close
//! its text is to the solution's.

pub mod batch;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod reward;

pub use error::{RewardError, Result};
pub use reward::{Reward, RewardScorer};
