//! CLI interface for resume-cart

use crate::input::job_description::JobSource;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-cart")]
#[command(about = "Smart resume matching system")]
#[command(long_about = "Evaluate resumes against a job description with a generative model, shortlist batches by match score, and build resumes from plain fields")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Where to read the job description from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct JobArgs {
    /// Path to job description file (TXT, MD, PDF)
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Job description text
    #[arg(long)]
    pub job_text: Option<String>,
}

impl JobArgs {
    pub fn source(&self) -> JobSource {
        match (&self.job, &self.job_text) {
            (Some(path), _) => JobSource::File(path.clone()),
            (None, Some(text)) => JobSource::Inline(text.clone()),
            (None, None) => JobSource::Inline(String::new()),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask for a written evaluation of one resume
    Review {
        /// Path to resume file (PDF)
        #[arg(short, long)]
        resume: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Percentage match, missing keywords and final thoughts for one resume
    Match {
        /// Path to resume file (PDF)
        #[arg(short, long)]
        resume: PathBuf,

        #[command(flatten)]
        job: JobArgs,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Evaluate several resumes and shortlist them by score
    Batch {
        /// Resume files (PDF)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        #[command(flatten)]
        job: JobArgs,

        /// Minimum match score for the shortlist
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        min_score: Option<u8>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Generate a resume document from a TOML file of fields
    Build {
        /// TOML file with name, email, phone, linkedin, objective, education,
        /// skills, experience, projects, certifications, languages, hobbies
        #[arg(short, long)]
        fields: PathBuf,

        /// Output path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write Markdown instead of PDF
        #[arg(long)]
        markdown: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Commands {
    /// Config actions that work on the file location alone, so a broken config can be repaired.
    pub fn repair_action(&self) -> Option<&ConfigAction> {
        match self {
            Commands::Config {
                action: Some(action @ (ConfigAction::Reset | ConfigAction::Path)),
            } => Some(action),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_command() {
        let cli = Cli::try_parse_from([
            "resume-cart",
            "batch",
            "--resumes",
            "a.pdf",
            "b.pdf",
            "--job-text",
            "Rust engineer",
            "--min-score",
            "70",
        ])
        .unwrap();

        match cli.command {
            Commands::Batch {
                resumes,
                job,
                min_score,
                ..
            } => {
                assert_eq!(resumes.len(), 2);
                assert_eq!(min_score, Some(70));
                assert!(matches!(job.source(), JobSource::Inline(text) if text == "Rust engineer"));
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_job_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["resume-cart", "review", "--resume", "a.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "resume-cart",
            "review",
            "--resume",
            "a.pdf",
            "--job",
            "jd.txt",
            "--job-text",
            "inline"
        ])
        .is_err());
    }

    #[test]
    fn test_min_score_range() {
        assert!(Cli::try_parse_from([
            "resume-cart",
            "batch",
            "--resumes",
            "a.pdf",
            "--job-text",
            "x",
            "--min-score",
            "101"
        ])
        .is_err());
    }

    #[test]
    fn test_reset_and_path_skip_config_loading() {
        let reset = Cli::try_parse_from(["resume-cart", "config", "reset"]).unwrap();
        assert!(matches!(reset.command.repair_action(), Some(ConfigAction::Reset)));

        let path = Cli::try_parse_from(["resume-cart", "config", "path"]).unwrap();
        assert!(matches!(path.command.repair_action(), Some(ConfigAction::Path)));

        let show = Cli::try_parse_from(["resume-cart", "config", "show"]).unwrap();
        assert!(show.command.repair_action().is_none());

        let bare = Cli::try_parse_from(["resume-cart", "config"]).unwrap();
        assert!(bare.command.repair_action().is_none());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
    }
}
