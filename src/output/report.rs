//! Report structures handed to the formatters

use crate::llm::interpreter::InterpretedMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single percentage-match evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub resume_name: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub result: InterpretedMatch,
    /// Present when the job description had to be cut down
    pub truncated_job_chars: Option<usize>,
}

impl MatchReport {
    pub fn new(resume_name: impl Into<String>, model: impl Into<String>, result: InterpretedMatch) -> Self {
        Self {
            resume_name: resume_name.into(),
            model: model.into(),
            generated_at: Utc::now(),
            result,
            truncated_job_chars: None,
        }
    }

    pub fn with_truncation(mut self, original_chars: Option<usize>) -> Self {
        self.truncated_job_chars = original_chars;
        self
    }
}

/// One-word verdict for a score, on the same bands as the console badge.
pub fn verdict(score: u8) -> &'static str {
    match score {
        90..=100 => "EXCELLENT",
        80..=89 => "VERY GOOD",
        70..=79 => "GOOD",
        60..=69 => "FAIR",
        50..=59 => "BELOW AVG",
        _ => "POOR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_bands() {
        assert_eq!(verdict(100), "EXCELLENT");
        assert_eq!(verdict(82), "VERY GOOD");
        assert_eq!(verdict(55), "BELOW AVG");
        assert_eq!(verdict(0), "POOR");
    }
}
