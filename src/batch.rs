//! Batch scoring of JSON Lines records.
//!
//! Each input line holds one `{"db_id", "candidate", "solution"}` record
//! (an optional `id` is echoed back). Each output line holds the reward
//! breakdown for the record on the same input line, or the error that
//! prevented scoring it. A bad record never aborts the batch.

use crate::error::{RewardError, Result};
use crate::reward::{Reward, RewardScorer};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// One scoring request.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BatchRecord {
    /// Caller-supplied identifier, echoed in the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// Database name.
    pub db_id: String,

    /// Generated query.
    pub candidate: String,

    /// Reference query.
    #[serde(alias = "query")]
    pub solution: String,
}

/// Result for one input line.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// 1-based input line number.
    pub line: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_id: Option<String>,

    #[serde(flatten)]
    pub reward: Option<Reward>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate figures for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Non-blank input lines read.
    pub total: usize,
    /// Records that produced a reward.
    pub scored: usize,
    /// Records that could not be parsed or scored.
    pub errors: usize,
    /// Scored records whose candidate failed to execute.
    pub text_fallbacks: usize,
    /// Mean reward over scored records.
    pub mean_reward: f64,
}

impl BatchSummary {
    fn record(&mut self, result: &BatchResult) {
        self.total += 1;
        match &result.reward {
            Some(reward) => {
                self.scored += 1;
                self.mean_reward += (reward.value - self.mean_reward) / self.scored as f64;
                if !reward.candidate_executed() {
                    self.text_fallbacks += 1;
                }
            }
            None => self.errors += 1,
        }
    }
}

/// Scores every record in `input`, writing one JSON line per record to `output`.
///
/// Up to `jobs` records are scored concurrently; output order always
/// matches input order.
pub async fn score_batch<R, W>(
    scorer: &RewardScorer,
    input: R,
    mut output: W,
    jobs: usize,
) -> Result<BatchSummary>
where
    R: BufRead,
    W: Write,
{
    let mut lines = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line =
            line.map_err(|e| RewardError::internal(format!("Failed to read input: {e}")))?;
        if !line.trim().is_empty() {
            lines.push((index + 1, line));
        }
    }

    let mut results = stream::iter(lines)
        .map(|(line_no, line)| score_line(scorer, line_no, line))
        .buffered(jobs.max(1));

    let mut summary = BatchSummary::default();
    while let Some(result) = results.next().await {
        summary.record(&result);
        serde_json::to_writer(&mut output, &result)
            .map_err(|e| RewardError::internal(format!("Failed to write result: {e}")))?;
        writeln!(output)
            .map_err(|e| RewardError::internal(format!("Failed to write result: {e}")))?;
    }
    output
        .flush()
        .map_err(|e| RewardError::internal(format!("Failed to flush output: {e}")))?;

    info!(
        "Scored {} of {} records ({} errors, {} text fallbacks), mean reward {:.4}",
        summary.scored, summary.total, summary.errors, summary.text_fallbacks, summary.mean_reward
    );
    Ok(summary)
}

async fn score_line(scorer: &RewardScorer, line_no: usize, line: String) -> BatchResult {
    let record: BatchRecord = match serde_json::from_str(&line) {
        Ok(record) => record,
        Err(e) => {
            warn!("Line {line_no}: invalid record: {e}");
            return BatchResult {
                line: line_no,
                id: None,
                db_id: None,
                reward: None,
                error: Some(format!("Invalid record: {e}")),
            };
        }
    };

    let outcome = scorer
        .score_detailed(&record.db_id, &record.candidate, &record.solution)
        .await;
    let (reward, error) = match outcome {
        Ok(reward) => (Some(reward), None),
        Err(e) => {
            warn!("Line {line_no}: {}: {e}", e.category());
            (None, Some(e.to_string()))
        }
    };

    BatchResult {
        line: line_no,
        id: record.id,
        db_id: Some(record.db_id),
        reward,
        error,
    }
}
