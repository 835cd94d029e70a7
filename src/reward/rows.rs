//! Row-set comparison.
//!
//! Both result sets are treated as sets: order is ignored and duplicate
//! rows collapse.

use crate::db::Row;
use crate::error::{RewardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// How an empty result set feeds the excess/missing proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRowsPolicy {
    /// An empty side contributes a proportion of zero.
    #[default]
    NoPenalty,
    /// Comparing against an empty side is an error.
    Reject,
}

impl EmptyRowsPolicy {
    /// Returns the policy as it appears in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPenalty => "no_penalty",
            Self::Reject => "reject",
        }
    }

    /// Parses a policy from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "no_penalty" => Some(Self::NoPenalty),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for EmptyRowsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from comparing a candidate row set to a solution row set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowComparison {
    /// Distinct candidate rows.
    pub candidate_rows: usize,
    /// Distinct solution rows.
    pub solution_rows: usize,
    /// Candidate rows absent from the solution.
    pub excess_rows: usize,
    /// Solution rows absent from the candidate.
    pub missing_rows: usize,
    /// `excess_rows / candidate_rows`.
    pub excess_proportion: f64,
    /// `missing_rows / solution_rows`.
    pub missing_proportion: f64,
    /// Mean of `1 - excess_proportion` and `1 - missing_proportion`.
    pub score: f64,
}

/// Scores how closely `candidate` reproduces `solution`, in `[0, 1]`.
pub fn compare_rows(
    candidate: &[Row],
    solution: &[Row],
    policy: EmptyRowsPolicy,
) -> Result<RowComparison> {
    let candidate_set: HashSet<&Row> = candidate.iter().collect();
    let solution_set: HashSet<&Row> = solution.iter().collect();

    if policy == EmptyRowsPolicy::Reject {
        if candidate_set.is_empty() {
            return Err(RewardError::degenerate("candidate query returned no rows"));
        }
        if solution_set.is_empty() {
            return Err(RewardError::degenerate("solution query returned no rows"));
        }
    }

    let excess_rows = candidate_set.difference(&solution_set).count();
    let missing_rows = solution_set.difference(&candidate_set).count();

    let excess_proportion = proportion(excess_rows, candidate_set.len());
    let missing_proportion = proportion(missing_rows, solution_set.len());

    if candidate_set.is_empty() || solution_set.is_empty() {
        warn!(
            "Comparing against an empty row set (candidate: {}, solution: {})",
            candidate_set.len(),
            solution_set.len()
        );
    }

    Ok(RowComparison {
        candidate_rows: candidate_set.len(),
        solution_rows: solution_set.len(),
        excess_rows,
        missing_rows,
        excess_proportion,
        missing_proportion,
        score: ((1.0 - excess_proportion) + (1.0 - missing_proportion)) / 2.0,
    })
}

/// `part / whole`, with an empty whole counting as zero.
fn proportion(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
