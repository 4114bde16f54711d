//! Application state for one run of the tool
//!
//! Holds the job description, which evaluation mode was chosen and the last
//! batch report. Only the command layer mutates it; starting a new batch
//! clears the previous report.

use crate::error::{Result, ResumeCartError};
use crate::input::job_description::JobDescription;
use crate::processing::batch::BatchReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Single,
    Multiple,
}

#[derive(Debug, Default)]
pub struct Session {
    job: Option<JobDescription>,
    mode: Mode,
    batch: Option<BatchReport>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_job_description(&mut self, job: JobDescription) {
        self.job = Some(job);
    }

    pub fn job_description(&self) -> Option<&JobDescription> {
        self.job.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn select_single(&mut self) -> Result<&JobDescription> {
        self.select(Mode::Single)
    }

    pub fn select_multiple(&mut self) -> Result<&JobDescription> {
        self.select(Mode::Multiple)
    }

    fn select(&mut self, mode: Mode) -> Result<&JobDescription> {
        match self.job.as_ref() {
            Some(job) if !job.is_blank() => {
                self.mode = mode;
                Ok(job)
            }
            _ => Err(ResumeCartError::InvalidInput(
                "Please enter the job description before proceeding.".to_string(),
            )),
        }
    }

    /// Drops the previous batch report before a new run.
    pub fn start_batch(&mut self) {
        self.batch = None;
    }

    pub fn store_batch(&mut self, report: BatchReport) {
        self.batch = Some(report);
    }

    pub fn batch(&self) -> Option<&BatchReport> {
        self.batch.as_ref()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::batch::BatchRow;

    #[test]
    fn test_mode_requires_job_description() {
        let mut session = Session::new();
        assert!(session.select_single().is_err());

        session.set_job_description(JobDescription::new("  ", 8000));
        assert!(session.select_multiple().is_err());
        assert_eq!(session.mode(), Mode::Idle);

        session.set_job_description(JobDescription::new("Rust engineer", 8000));
        assert!(session.select_multiple().is_ok());
        assert_eq!(session.mode(), Mode::Multiple);
    }

    #[test]
    fn test_new_batch_clears_previous_report() {
        let mut session = Session::new();
        session.store_batch(BatchReport::new(vec![BatchRow::failed("a.pdf", "boom")]));
        assert!(session.batch().is_some());

        session.start_batch();
        assert!(session.batch().is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = Session::new();
        session.set_job_description(JobDescription::new("Rust engineer", 8000));
        session.select_single().unwrap();
        session.clear();
        assert!(session.job_description().is_none());
        assert_eq!(session.mode(), Mode::Idle);
    }
}
