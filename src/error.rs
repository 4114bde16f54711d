//! Error handling for resume-cart

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeCartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The model rejected the call because the request rate or volume quota ran out.
    #[error("Quota exhausted: {message}")]
    QuotaExhausted {
        message: String,
        retry_delay: Option<u64>,
    },

    #[error("Upstream model failure: {0}")]
    Upstream(String),

    #[error("No document provided")]
    NoDocumentProvided,

    #[error("PDF rendering error: {0}")]
    PdfRender(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document export error: {0}")]
    DocumentExport(String),
}

impl ResumeCartError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ResumeCartError::QuotaExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResumeCartError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeCartError {
    fn from(err: anyhow::Error) -> Self {
        ResumeCartError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_display_includes_message() {
        let err = ResumeCartError::QuotaExhausted {
            message: "429 Resource has been exhausted".to_string(),
            retry_delay: Some(12),
        };
        assert!(err.is_quota_exhausted());
        assert_eq!(err.to_string(), "Quota exhausted: 429 Resource has been exhausted");
    }

    #[test]
    fn test_other_errors_are_not_quota() {
        assert!(!ResumeCartError::Upstream("boom".to_string()).is_quota_exhausted());
        assert!(!ResumeCartError::NoDocumentProvided.is_quota_exhausted());
    }
}
