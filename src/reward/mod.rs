//! Reward computation for generated SQL.
//!
//! A candidate query is scored against a solution query on the same
//! database:
//!
//! - candidate runs: `1.0 + row-set similarity`, in `[1, 2]`
//! - candidate is rejected by the engine: TF-IDF similarity of the two
//!   query texts, in `[0, 1]`
//!
//! The solution is assumed valid; if it fails, scoring fails.

pub mod rows;
pub mod text;

pub use rows::{compare_rows, EmptyRowsPolicy, RowComparison};
pub use text::{cosine_similarity, text_similarity, tokenize, TfidfVectorizer};

use crate::config::Config;
use crate::db::{DatabaseClient, ExecutionError, ExecutionOutcome, SqliteExecutor};
use crate::error::{RewardError, Result};
use serde::Serialize;
use tracing::debug;

/// Offset that lifts row-comparison rewards above every similarity reward.
pub const EXECUTION_BONUS: f64 = 1.0;

/// A computed reward and how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reward {
    /// The scalar reward.
    pub value: f64,

    /// Which branch produced it.
    #[serde(flatten)]
    pub detail: RewardDetail,
}

/// Branch-specific details of a reward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum RewardDetail {
    /// Both queries ran and their rows were compared.
    RowComparison(RowComparison),

    /// The candidate failed and the query texts were compared.
    TextSimilarity {
        similarity: f64,
        candidate_error: ExecutionError,
    },
}

impl Reward {
    /// Returns true if the candidate query executed.
    pub fn candidate_executed(&self) -> bool {
        matches!(self.detail, RewardDetail::RowComparison(_))
    }
}

/// Scores candidate queries against solution queries.
#[derive(Debug, Clone, Default)]
pub struct RewardScorer {
    config: Config,
}

impl RewardScorer {
    /// Creates a scorer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes the reward for `candidate` against `solution` on `db_name`.
    pub async fn score(&self, db_name: &str, candidate: &str, solution: &str) -> Result<f64> {
        self.score_detailed(db_name, candidate, solution)
            .await
            .map(|reward| reward.value)
    }

    /// Like [`score`](Self::score), returning the full breakdown.
    pub async fn score_detailed(
        &self,
        db_name: &str,
        candidate: &str,
        solution: &str,
    ) -> Result<Reward> {
        let path = self.config.database.locator().resolve(db_name)?;
        let executor = SqliteExecutor::new(&path, &self.config.database);
        self.score_with(&executor, candidate, solution).await
    }

    /// Scores using an already constructed client.
    pub async fn score_with(
        &self,
        client: &dyn DatabaseClient,
        candidate: &str,
        solution: &str,
    ) -> Result<Reward> {
        let candidate_rows = match client.execute(candidate).await? {
            ExecutionOutcome::Success(rows) => rows,
            ExecutionOutcome::Failure(candidate_error) => {
                debug!("Candidate failed, using text similarity: {candidate_error}");
                let similarity =
                    text_similarity(candidate, solution, self.config.scoring.max_features);
                return Ok(Reward {
                    value: similarity,
                    detail: RewardDetail::TextSimilarity {
                        similarity,
                        candidate_error,
                    },
                });
            }
        };

        let solution_rows = client
            .execute(solution)
            .await?
            .into_result()
            .map_err(RewardError::SolutionQuery)?;

        let comparison = compare_rows(
            &candidate_rows.rows,
            &solution_rows.rows,
            self.config.scoring.empty_rows,
        )?;
        debug!(
            "Row comparison: excess {:.3}, missing {:.3}",
            comparison.excess_proportion, comparison.missing_proportion
        );

        Ok(Reward {
            value: EXECUTION_BONUS + comparison.score,
            detail: RewardDetail::RowComparison(comparison),
        })
    }

    /// Computes a reward from synchronous code.
    ///
    /// Runs the computation on a private current-thread runtime, so it must
    /// not be called from inside another tokio runtime.
    pub fn score_blocking(&self, db_name: &str, candidate: &str, solution: &str) -> Result<f64> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RewardError::internal(format!("Failed to build runtime: {e}")))?;
        runtime.block_on(self.score(db_name, candidate, solution))
    }
}
