//! Input manager: job descriptions and resume documents

use crate::config::InputConfig;
use crate::error::{Result, ResumeCartError};
use crate::input::file_detector::FileType;
use crate::input::job_description::{JobDescription, JobSource, MAX_JOB_DESCRIPTION_CHARS};
use crate::input::pdf_renderer::{DocumentPayload, PdfRenderer};
use log::info;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use tokio::fs;

/// Turns a resume path into a payload the model can read.
pub trait ResumeLoader {
    fn load_resume(&mut self, path: &Path) -> impl Future<Output = Result<DocumentPayload>> + Send;
}

pub struct InputManager {
    renderer: PdfRenderer,
    max_job_chars: usize,
    cache: HashMap<String, DocumentPayload>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            renderer: PdfRenderer::default(),
            max_job_chars: MAX_JOB_DESCRIPTION_CHARS,
            cache: HashMap::new(),
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            renderer: PdfRenderer::new(config.renderer.clone(), config.dpi),
            max_job_chars: config.max_job_description_chars,
            ..Self::new()
        }
    }

    pub async fn load_job_description(&self, source: &JobSource) -> Result<JobDescription> {
        let text = source.read().await?;
        Ok(JobDescription::new(text, self.max_job_chars))
    }

    /// Resume file name as shown in results.
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    async fn render_resume(&mut self, path: &Path) -> Result<DocumentPayload> {
        let key = path.to_string_lossy().to_string();

        if let Some(cached) = self.cache.get(&key) {
            info!("Using cached render for: {}", path.display());
            return Ok(cached.clone());
        }

        if !path.exists() {
            return Err(ResumeCartError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if FileType::from_path(path)? != FileType::Pdf {
            return Err(ResumeCartError::UnsupportedFormat(format!(
                "Resumes must be PDF files: {}",
                path.display()
            )));
        }

        info!("Rendering first page of resume: {}", path.display());
        let bytes = fs::read(path).await?;
        let payload = self.renderer.render_first_page(&bytes).await?;

        self.cache.insert(key, payload.clone());
        Ok(payload)
    }
}

impl ResumeLoader for InputManager {
    async fn load_resume(&mut self, path: &Path) -> Result<DocumentPayload> {
        self.render_resume(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_job_description_is_bounded() {
        let manager = InputManager::new();
        let job = manager
            .load_job_description(&JobSource::Inline("x".repeat(9000)))
            .await
            .unwrap();
        assert_eq!(job.char_count(), 8000);
    }

    #[tokio::test]
    async fn test_non_pdf_resume_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "John Doe").unwrap();

        let mut manager = InputManager::new();
        let result = manager.load_resume(&path).await;
        assert!(matches!(result, Err(ResumeCartError::UnsupportedFormat(_))));
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_missing_resume_rejected() {
        let mut manager = InputManager::new();
        let result = manager.load_resume(Path::new("does/not/exist.pdf")).await;
        assert!(matches!(result, Err(ResumeCartError::InvalidInput(_))));
    }

    #[test]
    fn test_display_name_uses_file_name() {
        assert_eq!(InputManager::display_name(Path::new("/tmp/cvs/alice.pdf")), "alice.pdf");
    }
}
