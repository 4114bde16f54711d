//! Resume cart: resume to job description matching with a generative model

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::{error, info};
use resume_cart::cli::{self, Cli, Commands, ConfigAction, JobArgs};
use resume_cart::config::{Config, OutputFormat};
use resume_cart::input::job_description::JobDescription;
use resume_cart::input::manager::{InputManager, ResumeLoader};
use resume_cart::llm::client::GeminiClient;
use resume_cart::llm::retry::RetryPolicy;
use resume_cart::output::builder::{self, ResumeFields, DEFAULT_OUTPUT_NAME};
use resume_cart::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_cart::output::progress::ConsoleObserver;
use resume_cart::output::report::MatchReport;
use resume_cart::processing::batch::run_batch;
use resume_cart::processing::evaluator::Evaluator;
use resume_cart::session::Session;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    if let Some(action) = cli.command.repair_action() {
        if let Err(e) = repair_config(action, &config_path) {
            error!("Command failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            process::exit(1);
        }
        return;
    }

    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Review { resume, job } => {
            let mut session = Session::new();
            let mut inputs = InputManager::from_config(&config.input);
            let Some(job) = load_job(&inputs, &job, &mut session).await? else {
                return Ok(());
            };
            if session.select_single().is_err() {
                warn_missing_job();
                return Ok(());
            }

            cli::validate_file_extension(&resume, &["pdf"]).map_err(anyhow::Error::msg)?;
            let evaluator = build_evaluator(&config)?;
            let observer = ConsoleObserver::new(config.output.color_output);
            let document = inputs
                .load_resume(&resume)
                .await
                .with_context(|| format!("Failed to prepare resume {}", resume.display()))?;

            println!("🔍 Reviewing {}...", InputManager::display_name(&resume));
            let text = evaluator.review(Some(document), &job, &observer).await?;

            println!("\n{}", "📝 Response".bold());
            println!("{}", text);
        }

        Commands::Match {
            resume,
            job,
            output,
            save,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let mut session = Session::new();
            let mut inputs = InputManager::from_config(&config.input);
            let Some(job) = load_job(&inputs, &job, &mut session).await? else {
                return Ok(());
            };
            if session.select_single().is_err() {
                warn_missing_job();
                return Ok(());
            }

            cli::validate_file_extension(&resume, &["pdf"]).map_err(anyhow::Error::msg)?;
            let evaluator = build_evaluator(&config)?;
            let observer = ConsoleObserver::new(config.output.color_output);
            let document = inputs
                .load_resume(&resume)
                .await
                .with_context(|| format!("Failed to prepare resume {}", resume.display()))?;

            let resume_name = InputManager::display_name(&resume);
            println!("🔍 Matching {}...", resume_name);
            let outcome = evaluator
                .percentage_match(Some(document), &job, &observer)
                .await?;
            info!("Raw model response: {}", outcome.raw_text);

            let report = MatchReport::new(
                resume_name.clone(),
                evaluator.model().model_name(),
                outcome.interpreted,
            )
            .with_truncation(job.was_truncated().then(|| job.original_chars()));

            let generator = ReportGenerator::new(config.output.color_output);
            let formatted = generator.formatter(format).format_match(&report)?;
            emit(&formatted, format, save.as_deref(), &resume_name)?;
        }

        Commands::Batch {
            resumes,
            job,
            min_score,
            output,
            save,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let min_score = min_score.unwrap_or(config.batch.min_score);
            let mut session = Session::new();
            let mut inputs = InputManager::from_config(&config.input);
            let Some(job) = load_job(&inputs, &job, &mut session).await? else {
                return Ok(());
            };
            if session.select_multiple().is_err() {
                warn_missing_job();
                return Ok(());
            }

            let evaluator = build_evaluator(&config)?;
            let observer = ConsoleObserver::new(config.output.color_output);

            println!("📂 Evaluating {} resumes...", resumes.len());
            session.start_batch();
            let report = run_batch(&evaluator, &mut inputs, &job, &resumes, &observer).await;
            session.store_batch(report);

            let Some(report) = session.batch() else {
                return Ok(());
            };
            let generator = ReportGenerator::new(config.output.color_output);
            let formatted = generator.formatter(format).format_batch(report, min_score)?;
            emit(&formatted, format, save.as_deref(), "batch")?;
        }

        Commands::Build {
            fields,
            out,
            markdown,
        } => {
            let fields = ResumeFields::from_toml_file(&fields)
                .with_context(|| format!("Failed to read resume fields from {}", fields.display()))?;

            let (bytes, default_name) = if markdown {
                (
                    builder::build_resume_markdown(&fields).into_bytes(),
                    Path::new(DEFAULT_OUTPUT_NAME).with_extension("md"),
                )
            } else {
                (builder::build_resume_pdf(&fields)?, PathBuf::from(DEFAULT_OUTPUT_NAME))
            };

            let out = out.unwrap_or(default_name);
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("✅ Resume generated: {}", out.display());
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Model: {}", config.model.name);
                println!("Endpoint: {}", config.model.endpoint);
                println!("API key variable: {}", config.model.api_key_env);
                println!("Request timeout: {}s", config.model.timeout_secs);
                println!("\nRetry:");
                println!("  Max attempts: {}", config.retry.max_attempts);
                println!("  Default delay: {}s", config.retry.default_delay_secs);
                println!("\nInput:");
                println!(
                    "  Job description limit: {} characters",
                    config.input.max_job_description_chars
                );
                println!("  Renderer: {} ({} dpi)", config.input.renderer, config.input.dpi);
                println!("\nBatch minimum score: {}%", config.batch.min_score);
                println!("Output format: {:?}", config.output.format);
            }

            Some(action) => repair_config(&action, config_path)?,
        },
    }

    Ok(())
}

fn repair_config(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Reset => {
            println!("🔄 Resetting configuration to defaults...");
            Config::reset(config_path)
                .with_context(|| format!("Failed to reset {}", config_path.display()))?;
            println!("✅ Configuration reset successfully!");
        }
        ConfigAction::Path => println!("{}", config_path.display()),
        ConfigAction::Show => {}
    }
    Ok(())
}

/// Read the job description into the session; `None` when it is blank.
async fn load_job(
    inputs: &InputManager,
    args: &JobArgs,
    session: &mut Session,
) -> Result<Option<JobDescription>> {
    let job = inputs
        .load_job_description(&args.source())
        .await
        .context("Failed to read job description")?;

    if job.is_blank() {
        warn_missing_job();
        return Ok(None);
    }

    if job.was_truncated() {
        println!(
            "{}",
            format!(
                "⚠️  Job description trimmed to {} characters (was {}).",
                job.char_count(),
                job.original_chars()
            )
            .yellow()
        );
    }

    session.set_job_description(job.clone());
    Ok(Some(job))
}

fn warn_missing_job() {
    println!(
        "{}",
        "⚠️  Please enter the job description before proceeding.".yellow()
    );
}

fn build_evaluator(config: &Config) -> Result<Evaluator<GeminiClient>> {
    let client = GeminiClient::new(&config.model, config.api_key()?)?;
    Ok(Evaluator::new(client, RetryPolicy::from(&config.retry)))
}

fn resolve_format(output: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match output {
        Some(value) => cli::parse_output_format(value).map_err(anyhow::Error::msg),
        None => Ok(config.output.format),
    }
}

/// Print the formatted result, or write it when `save` is given (a directory gets a suggested name).
fn emit(content: &str, format: OutputFormat, save: Option<&Path>, base_name: &str) -> Result<()> {
    match save {
        Some(path) => {
            let target = if path.is_dir() {
                path.join(suggest_filename(format, base_name, true))
            } else {
                path.to_path_buf()
            };
            save_report_to_file(content, &target)
                .with_context(|| format!("Failed to save report to {}", target.display()))?;
            println!("💾 Report saved to {}", target.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
