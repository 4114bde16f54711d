//! Configuration management for resume-cart

use crate::error::{Result, ResumeCartError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub input: InputConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub default_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub max_job_description_chars: usize,
    /// Command used to rasterize the first page of a PDF
    pub renderer: String,
    pub dpi: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub min_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                name: "gemini-2.0-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                timeout_secs: 120,
            },
            retry: RetryConfig {
                max_attempts: 3,
                default_delay_secs: 60,
            },
            input: InputConfig {
                max_job_description_chars: 8000,
                renderer: "pdftoppm".to_string(),
                dpi: 150,
            },
            batch: BatchConfig { min_score: 55 },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the config from `path` (or the default location), writing defaults on first use.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeCartError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeCartError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Overwrite `config_path` with defaults without reading what is there.
    pub fn reset(config_path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(config_path)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-cart")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(ResumeCartError::Configuration(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.batch.min_score > 100 {
            return Err(ResumeCartError::Configuration(format!(
                "batch.min_score must be within 0..=100, got {}",
                self.batch.min_score
            )));
        }
        if self.input.max_job_description_chars == 0 {
            return Err(ResumeCartError::Configuration(
                "input.max_job_description_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Read the model API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ResumeCartError::Configuration(format!(
                    "Missing API key: set {} in the environment or a .env file",
                    self.model.api_key_env
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-2.0-flash");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.default_delay_secs, 60);
        assert_eq!(config.input.max_job_description_chars, 8000);
        assert_eq!(config.batch.min_score, 55);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load(Some(&path)).unwrap();
        assert!(path.exists());

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(created.model.endpoint, reloaded.model.endpoint);
        assert_eq!(reloaded.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        config.save_to(&path).unwrap();

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ResumeCartError::Configuration(_))));
    }

    #[test]
    fn test_reset_repairs_unloadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());

        let reset = Config::reset(&path).unwrap();
        assert_eq!(reset.retry.max_attempts, 3);

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.retry.max_attempts, 3);
    }
}
