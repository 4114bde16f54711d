//! First-page rasterization of resume PDFs
//!
//! Only page one is ever looked at. It is rendered to JPEG with poppler's
//! `pdftoppm` and handed to the model as base64 inline data.

use crate::error::{Result, ResumeCartError};
use base64::{engine::general_purpose, Engine as _};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::process::Command;

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Base64-encoded document image ready for model submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub mime_type: String,
    pub data: String,
}

impl DocumentPayload {
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self {
            mime_type: JPEG_MIME_TYPE.to_string(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    command: String,
    dpi: u32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("pdftoppm", 150)
    }
}

impl PdfRenderer {
    pub fn new(command: impl Into<String>, dpi: u32) -> Self {
        Self {
            command: command.into(),
            dpi,
        }
    }

    pub async fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<DocumentPayload> {
        if pdf_bytes.is_empty() {
            return Err(ResumeCartError::NoDocumentProvided);
        }

        let temp_dir = tempfile::tempdir()?;
        let pdf_path = temp_dir.path().join("input.pdf");
        let output_root = temp_dir.path().join("page");
        fs::write(&pdf_path, pdf_bytes).await?;

        let output = Command::new(&self.command)
            .arg("-jpeg")
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&pdf_path)
            .arg(&output_root)
            .output()
            .await
            .map_err(|e| {
                ResumeCartError::PdfRender(format!(
                    "Failed to execute {} (install poppler-utils): {}",
                    self.command, e
                ))
            })?;

        if !output.status.success() {
            return Err(ResumeCartError::PdfRender(format!(
                "{} failed: {}",
                self.command,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let jpeg = fs::read(output_root.with_extension("jpg")).await.map_err(|e| {
            ResumeCartError::PdfRender(format!("Failed to read rendered page: {}", e))
        })?;
        debug!("rendered first page: {} bytes of JPEG", jpeg.len());

        Ok(DocumentPayload::jpeg(&jpeg))
    }
}
