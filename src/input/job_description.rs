//! Job description input with a character budget

use crate::error::{Result, ResumeCartError};
use crate::input::file_detector::FileType;
use log::{info, warn};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const MAX_JOB_DESCRIPTION_CHARS: usize = 8000;

/// Job description text, cut to a maximum number of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription {
    text: String,
    original_chars: usize,
}

impl JobDescription {
    /// Truncates to `max_chars` characters (not bytes) and logs a warning when it has to.
    pub fn new(text: impl Into<String>, max_chars: usize) -> Self {
        let text = text.into();
        let original_chars = text.chars().count();

        let text = if original_chars > max_chars {
            warn!(
                "Job description too long ({} characters). Trimming to {}.",
                original_chars, max_chars
            );
            text.chars().take(max_chars).collect()
        } else {
            text
        };

        Self {
            text,
            original_chars,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    pub fn was_truncated(&self) -> bool {
        self.original_chars > self.char_count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Where the job description comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    Inline(String),
    File(PathBuf),
}

impl JobSource {
    pub async fn read(&self) -> Result<String> {
        match self {
            JobSource::Inline(text) => Ok(text.clone()),
            JobSource::File(path) => read_job_file(path).await,
        }
    }
}

async fn read_job_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ResumeCartError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    match FileType::from_path(path)? {
        FileType::Text => {
            info!("Reading plain text job description: {}", path.display());
            Ok(fs::read_to_string(path).await?)
        }
        FileType::Markdown => {
            info!("Reading markdown job description: {}", path.display());
            let content = fs::read_to_string(path).await?;
            Ok(markdown_to_text(&content))
        }
        FileType::Pdf => {
            info!("Extracting job description text from PDF: {}", path.display());
            let bytes = fs::read(path).await?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                ResumeCartError::PdfExtraction(format!(
                    "Failed to extract text from PDF '{}': {}",
                    path.display(),
                    e
                ))
            })
        }
        FileType::Unknown => Err(ResumeCartError::UnsupportedFormat(format!(
            "Unsupported job description file: {}",
            path.display()
        ))),
    }
}

/// Flattens markdown to plain text, one block per line.
fn markdown_to_text(markdown: &str) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => current.push_str(&text),
            Event::SoftBreak | Event::HardBreak => current.push(' '),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => {
                let line = current.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
                current.clear();
            }
            _ => {}
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }
    lines.join("\n")
}
