//! Output formatters for match and batch results

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::chart::percentage_chart;
use crate::output::report::{verdict, MatchReport};
use crate::processing::batch::{BatchReport, BatchRow};
use colored::{Color, Colorize};
use serde_json::json;
use std::path::Path;

/// Trait for formatting evaluation results
pub trait OutputFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String>;
    fn format_batch(&self, report: &BatchReport, min_score: u8) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for scripting
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing results
pub struct MarkdownFormatter;

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let color = match score {
            90..=100 => Color::Green,
            80..=89 => Color::BrightGreen,
            70..=79 => Color::Yellow,
            60..=69 => Color::BrightYellow,
            50..=59 => Color::Red,
            _ => Color::BrightRed,
        };
        let badge = verdict(score);

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_row(&self, index: usize, row: &BatchRow) -> String {
        let score = match row.score() {
            Some(score) => format!("{:>3}% {}", score, self.format_score_badge(score)),
            None => self.colorize("Error", Color::Red),
        };
        format!(
            "  {}. {} | {}\n     Missing: {}\n     Thoughts: {}\n",
            index + 1,
            row.source_name,
            score,
            single_line(row.missing_keywords()),
            single_line(row.final_thoughts())
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();
        let score = report.result.match_percentage;

        output.push_str(&self.format_header("📈 Match Analysis Result", 1));
        output.push_str(&format!(
            "Resume: {} | Model: {} | Generated: {}\n",
            report.resume_name,
            report.model,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if let Some(original) = report.truncated_job_chars {
            output.push_str(&self.colorize(
                &format!("⚠️  Job description was trimmed from {} characters\n", original),
                Color::Yellow,
            ));
        }

        output.push_str(&format!(
            "\n✅ Match Score: {}% {}\n",
            score,
            self.format_score_badge(score)
        ));
        output.push_str(&percentage_chart(score, self.use_colors));
        output.push('\n');

        output.push_str(&self.format_header("❌ Missing Keywords", 2));
        output.push_str(&report.result.missing_keywords);
        output.push('\n');

        output.push_str(&self.format_header("💬 Final Thoughts", 2));
        output.push_str(&report.result.final_thoughts);
        output.push('\n');

        Ok(output)
    }

    fn format_batch(&self, report: &BatchReport, min_score: u8) -> Result<String> {
        let mut output = String::new();
        let shortlist = report.shortlist(min_score);

        output.push_str(&self.format_header("📂 Multi-Resume Evaluation", 1));
        output.push_str(&format!(
            "Generated: {} | {} evaluated, {} failed\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.evaluated_count(),
            report.failed_count()
        ));

        output.push_str(&self.format_header(
            &format!("✅ Shortlisted Resumes (score ≥ {}%)", min_score),
            2,
        ));
        if shortlist.is_empty() {
            output.push_str(&self.colorize("  No resumes reached the minimum score.\n", Color::Yellow));
        }
        for (index, row) in shortlist.iter().enumerate() {
            output.push_str(&self.format_row(index, row));
        }

        output.push_str(&self.format_header("🔍 All Results", 2));
        for (index, row) in report.rows.iter().enumerate() {
            output.push_str(&self.format_row(index, row));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &serde_json::Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        self.render(&serde_json::to_value(report)?)
    }

    fn format_batch(&self, report: &BatchReport, min_score: u8) -> Result<String> {
        let value = json!({
            "generated_at": report.generated_at,
            "min_score": min_score,
            "shortlisted": report
                .shortlist(min_score)
                .into_iter()
                .map(BatchRow::record)
                .collect::<Vec<_>>(),
            "results": report.records(),
        });
        self.render(&value)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn table<'a>(rows: impl IntoIterator<Item = &'a BatchRow>) -> String {
        let mut table = String::from(
            "| Resume Name | Match Score (%) | Missing Keywords | Final Thoughts |\n|---|---|---|---|\n",
        );
        for row in rows {
            table.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&row.source_name),
                row.score_label(),
                escape_cell(row.missing_keywords()),
                escape_cell(row.final_thoughts())
            ));
        }
        table
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!("# Match Analysis: {}\n\n", report.resume_name));
        output.push_str(&format!(
            "*Generated {} with {}*\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.model
        ));
        output.push_str(&format!(
            "**Match Score: {}%** ({})\n\n",
            report.result.match_percentage,
            verdict(report.result.match_percentage)
        ));
        output.push_str("## Missing Keywords\n\n");
        output.push_str(&report.result.missing_keywords);
        output.push_str("\n\n## Final Thoughts\n\n");
        output.push_str(&report.result.final_thoughts);
        output.push('\n');
        Ok(output)
    }

    fn format_batch(&self, report: &BatchReport, min_score: u8) -> Result<String> {
        let mut output = String::from("# Multi-Resume Evaluation\n\n");
        output.push_str(&format!(
            "*Generated {}: {} evaluated, {} failed*\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.evaluated_count(),
            report.failed_count()
        ));
        output.push_str(&format!("## Shortlisted Resumes (score ≥ {}%)\n\n", min_score));
        output.push_str(&Self::table(report.shortlist(min_score)));
        output.push_str("\n## All Results\n\n");
        output.push_str(&Self::table(&report.rows));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Picks the formatter for an output format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new(use_colors: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    pub fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, base_name: &str, timestamp: bool) -> String {
    let stem = Path::new(base_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_match{}.{}", stem, timestamp_suffix, extension)
}
