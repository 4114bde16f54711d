//! Resume builder: fixed fields into a formatted document
//!
//! Headings and their order are fixed. Field contents are written as given.

use crate::error::{Result, ResumeCartError};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OUTPUT_NAME: &str = "Generated_Resume.pdf";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const BODY_SIZE: f32 = 11.0;
const NAME_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
/// Characters per body line at 11pt Helvetica across the text width.
const BODY_WRAP_CHARS: usize = 90;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub objective: String,
    pub education: String,
    pub skills: String,
    pub experience: String,
    pub projects: String,
    pub certifications: String,
    pub languages: String,
    pub hobbies: String,
}

impl ResumeFields {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ResumeCartError::InvalidInput(format!(
                "Failed to parse resume fields '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn contact_line(&self) -> String {
        format!(
            "Email: {} | Phone: {} | LinkedIn: {}",
            self.email, self.phone, self.linkedin
        )
    }

    /// Section headings with their bodies, in document order.
    pub fn sections(&self) -> [(&'static str, &str); 8] {
        [
            ("Career Objective", self.objective.as_str()),
            ("Education", self.education.as_str()),
            ("Skills", self.skills.as_str()),
            ("Experience", self.experience.as_str()),
            ("Projects", self.projects.as_str()),
            ("Certifications", self.certifications.as_str()),
            ("Languages Known", self.languages.as_str()),
            ("Hobbies", self.hobbies.as_str()),
        ]
    }
}

pub fn build_resume_markdown(fields: &ResumeFields) -> String {
    let mut output = format!("# {}\n\n{}\n", fields.name, fields.contact_line());
    for (heading, body) in fields.sections() {
        output.push_str(&format!("\n## {}\n\n{}\n", heading, body));
    }
    output
}

pub fn build_resume_pdf(fields: &ResumeFields) -> Result<Vec<u8>> {
    let title = if fields.name.trim().is_empty() {
        "Resume"
    } else {
        fields.name.as_str()
    };
    let mut writer = PageWriter::new(title)?;

    writer.line(&fields.name, NAME_SIZE, true);
    writer.gap(2.0);
    writer.paragraph(&fields.contact_line());

    for (heading, body) in fields.sections() {
        writer.gap(4.0);
        writer.line(heading, HEADING_SIZE, true);
        writer.gap(1.0);
        writer.paragraph(body);
    }

    writer.finish()
}

struct PageWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    cursor_mm: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ResumeCartError::DocumentExport(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ResumeCartError::DocumentExport(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let height = size * PT_TO_MM * 1.4;
        if self.cursor_mm - height < MARGIN_MM {
            self.new_page();
        }
        self.cursor_mm -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_mm), font);
    }

    fn paragraph(&mut self, text: &str) {
        for source_line in text.lines() {
            let wrapped = wrap(source_line, BODY_WRAP_CHARS);
            if wrapped.is_empty() {
                self.gap(BODY_SIZE * PT_TO_MM);
            }
            for line in wrapped {
                self.line(&line, BODY_SIZE, false);
            }
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor_mm -= mm;
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ResumeCartError::DocumentExport(e.to_string()))
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
