//! Command-line argument parsing for sql-reward.

use crate::config::Config;
use crate::error::{RewardError, Result};
use crate::reward::EmptyRowsPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scores generated SQL queries against reference queries.
#[derive(Parser, Debug)]
#[command(name = "sql-reward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding one subdirectory per database
    #[arg(long, value_name = "DIR", env = "SQL_REWARD_DB_DIR", global = true)]
    pub db_dir: Option<PathBuf>,

    /// Open databases read-only so mutating queries fail instead of committing
    #[arg(long, global = true)]
    pub read_only: bool,

    /// How empty result sets are scored: no_penalty or reject
    #[arg(long, value_name = "POLICY", global = true)]
    pub empty_rows: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Score a single candidate query
    Score {
        /// Database name
        #[arg(short = 'd', long, value_name = "NAME")]
        db: String,

        /// Generated query
        #[arg(short = 'c', long, value_name = "SQL")]
        candidate: String,

        /// Reference query
        #[arg(short = 's', long, value_name = "SQL")]
        solution: String,

        /// Print the full breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a JSON Lines file of {db_id, candidate, solution} records
    Batch {
        /// Input file ("-" for stdin)
        #[arg(short = 'i', long, value_name = "PATH")]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Records scored concurrently
        #[arg(short = 'j', long, value_name = "N", default_value = "4")]
        jobs: usize,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(dir) = &self.db_dir {
            config.database.base_dir = dir.clone();
        }
        if self.read_only {
            config.database.read_only = true;
        }
        if let Some(policy) = &self.empty_rows {
            config.scoring.empty_rows = EmptyRowsPolicy::parse(policy).ok_or_else(|| {
                RewardError::config(format!(
                    "Invalid empty-rows policy: {policy}. Expected: no_penalty or reject"
                ))
            })?;
        }
        Ok(())
    }
}
