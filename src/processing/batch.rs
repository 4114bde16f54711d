//! Multi-resume evaluation
//!
//! Documents are processed strictly one after another and rows come back in
//! input order. A failure on one document becomes an error row; the batch
//! always runs to the end.

use crate::error::Result;
use crate::input::job_description::JobDescription;
use crate::input::manager::{InputManager, ResumeLoader};
use crate::llm::client::GenerativeModel;
use crate::llm::interpreter::InterpretedMatch;
use crate::llm::retry::RetryObserver;
use crate::processing::evaluator::Evaluator;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ERROR_SCORE: &str = "Error";
pub const PROCESSING_FAILED: &str = "Processing failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    Evaluated(InterpretedMatch),
    Failed { error: String },
}

/// One resume's result within a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    pub source_name: String,
    pub outcome: RowOutcome,
}

impl BatchRow {
    pub fn evaluated(source_name: impl Into<String>, result: InterpretedMatch) -> Self {
        Self {
            source_name: source_name.into(),
            outcome: RowOutcome::Evaluated(result),
        }
    }

    pub fn failed(source_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            outcome: RowOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn score(&self) -> Option<u8> {
        match &self.outcome {
            RowOutcome::Evaluated(result) => Some(result.match_percentage),
            RowOutcome::Failed { .. } => None,
        }
    }

    pub fn score_label(&self) -> String {
        self.score()
            .map(|score| score.to_string())
            .unwrap_or_else(|| ERROR_SCORE.to_string())
    }

    pub fn missing_keywords(&self) -> &str {
        match &self.outcome {
            RowOutcome::Evaluated(result) => &result.missing_keywords,
            RowOutcome::Failed { error } => error,
        }
    }

    pub fn final_thoughts(&self) -> &str {
        match &self.outcome {
            RowOutcome::Evaluated(result) => &result.final_thoughts,
            RowOutcome::Failed { .. } => PROCESSING_FAILED,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RowOutcome::Failed { .. })
    }

    pub fn record(&self) -> BatchRecord<'_> {
        BatchRecord {
            resume_name: &self.source_name,
            match_score: match self.score() {
                Some(score) => ScoreCell::Score(score),
                None => ScoreCell::Error(ERROR_SCORE),
            },
            missing_keywords: self.missing_keywords(),
            final_thoughts: self.final_thoughts(),
        }
    }
}

/// Flat, table-shaped view of a row, as exported.
#[derive(Debug, Serialize)]
pub struct BatchRecord<'a> {
    pub resume_name: &'a str,
    pub match_score: ScoreCell,
    pub missing_keywords: &'a str,
    pub final_thoughts: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScoreCell {
    Score(u8),
    Error(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    pub fn new(rows: Vec<BatchRow>) -> Self {
        Self {
            generated_at: Utc::now(),
            rows,
        }
    }

    /// Evaluated rows scoring at least `min_score`, in input order.
    pub fn shortlist(&self, min_score: u8) -> Vec<&BatchRow> {
        self.rows
            .iter()
            .filter(|row| row.score().is_some_and(|score| score >= min_score))
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_failed()).count()
    }

    pub fn evaluated_count(&self) -> usize {
        self.rows.len() - self.failed_count()
    }

    pub fn records(&self) -> Vec<BatchRecord<'_>> {
        self.rows.iter().map(BatchRow::record).collect()
    }
}

/// Retry observer that also hears about document boundaries.
pub trait BatchObserver: RetryObserver {
    fn on_document_started(&self, _index: usize, _total: usize, _source_name: &str) {}
    fn on_document_finished(&self, _row: &BatchRow) {}
}

/// Evaluate every resume in `paths` against `job`, never aborting on a single failure.
pub async fn run_batch<M, L, O>(
    evaluator: &Evaluator<M>,
    loader: &mut L,
    job: &JobDescription,
    paths: &[PathBuf],
    observer: &O,
) -> BatchReport
where
    M: GenerativeModel,
    L: ResumeLoader,
    O: BatchObserver + ?Sized,
{
    let total = paths.len();
    let mut rows = Vec::with_capacity(total);
    info!("Evaluating {} resumes", total);

    for (index, path) in paths.iter().enumerate() {
        let source_name = InputManager::display_name(path);
        observer.on_document_started(index, total, &source_name);

        let row = match evaluate_one(evaluator, loader, job, path, observer).await {
            Ok(result) => BatchRow::evaluated(source_name, result),
            Err(e) => {
                warn!("Evaluation of {} failed: {}", source_name, e);
                BatchRow::failed(source_name, e.to_string())
            }
        };

        observer.on_document_finished(&row);
        rows.push(row);
    }

    let report = BatchReport::new(rows);
    info!(
        "Batch finished: {} evaluated, {} failed",
        report.evaluated_count(),
        report.failed_count()
    );
    report
}

async fn evaluate_one<M, L, O>(
    evaluator: &Evaluator<M>,
    loader: &mut L,
    job: &JobDescription,
    path: &Path,
    observer: &O,
) -> Result<InterpretedMatch>
where
    M: GenerativeModel,
    L: ResumeLoader,
    O: BatchObserver + ?Sized,
{
    let document = loader.load_resume(path).await?;
    let outcome = evaluator
        .percentage_match(Some(document), job, observer)
        .await?;
    Ok(outcome.interpreted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluated(name: &str, score: u8) -> BatchRow {
        BatchRow::evaluated(
            name,
            InterpretedMatch {
                match_percentage: score,
                ..InterpretedMatch::default()
            },
        )
    }

    #[test]
    fn test_failed_row_uses_sentinels() {
        let row = BatchRow::failed("bob.pdf", "Upstream model failure: 500");
        assert_eq!(row.score(), None);
        assert_eq!(row.score_label(), "Error");
        assert_eq!(row.missing_keywords(), "Upstream model failure: 500");
        assert_eq!(row.final_thoughts(), "Processing failed");
    }

    #[test]
    fn test_shortlist_filters_by_score_and_skips_failures() {
        let report = BatchReport::new(vec![
            evaluated("a.pdf", 80),
            BatchRow::failed("b.pdf", "boom"),
            evaluated("c.pdf", 54),
            evaluated("d.pdf", 55),
        ]);

        let names: Vec<&str> = report
            .shortlist(55)
            .iter()
            .map(|row| row.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.pdf", "d.pdf"]);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.evaluated_count(), 3);
    }

    #[test]
    fn test_record_serializes_error_score_as_text() {
        let report = BatchReport::new(vec![evaluated("a.pdf", 70), BatchRow::failed("b.pdf", "boom")]);
        let json = serde_json::to_value(report.records()).unwrap();

        assert_eq!(json[0]["match_score"], 70);
        assert_eq!(json[1]["match_score"], "Error");
        assert_eq!(json[1]["missing_keywords"], "boom");
        assert_eq!(json[1]["final_thoughts"], "Processing failed");
    }
}
