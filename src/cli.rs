//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// StanceLens - LLM-powered stance analysis reports for survey comments
///
/// Aggregate comments by stance for every question of a project, have a
/// local AI model analyze each question and synthesize an overall
/// report. Markdown/JSON output, cached analyses. Built in Rust.
///
/// Examples:
///   stancelens --project project.json --comments comments.json
///   stancelens --project project.json --comments comments.json --question q1
///   stancelens --project project.json --comments comments.json --force --format json
///   stancelens --project project.json --comments comments.json --dry-run
///   stancelens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the project definition JSON file
    ///
    /// Contains the project id, name, description, and questions with
    /// their stance options. Not required when using --init-config.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub project: Option<PathBuf>,

    /// Path to the comments JSON file (a top-level array)
    #[arg(long, value_name = "FILE", required_unless_present = "init_config")]
    pub comments: Option<PathBuf>,

    /// Analyze only this question id instead of the whole project
    #[arg(short, long, value_name = "ID")]
    pub question: Option<String>,

    /// Ollama model to use for analysis
    ///
    /// Can also be set via STANCELENS_MODEL env var or .stancelens.toml config.
    #[arg(short, long, default_value = "llama3.2:latest", env = "STANCELENS_MODEL")]
    pub model: String,

    /// Output file path for the report
    #[arg(short, long, default_value = "stance_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Ollama API endpoint URL
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    pub ollama_url: String,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stancelens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path of the JSON store file holding cached analyses
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Skip the analysis cache entirely (in-memory store, nothing persisted)
    #[arg(long)]
    pub no_cache: bool,

    /// Regenerate the report even when a cached one exists
    #[arg(short, long)]
    pub force: bool,

    /// With --force, also regenerate every per-question analysis
    ///
    /// By default a forced project report reuses cached question analyses.
    #[arg(long, requires = "force")]
    pub force_questions: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.1")]
    pub temperature: f32,

    /// Request timeout in seconds
    ///
    /// How long to wait for the LLM to respond. Default: from config or 600s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(long)]
    pub quiet: bool,

    /// Dry run: aggregate stances and print the distribution without calling the LLM
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .stancelens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate input files
        if let Some(ref project) = self.project {
            if !project.exists() {
                return Err(format!("Project file does not exist: {}", project.display()));
            }
        }
        if let Some(ref comments) = self.comments {
            if !comments.exists() {
                return Err(format!(
                    "Comments file does not exist: {}",
                    comments.display()
                ));
            }
        }

        // Validate Ollama URL format (not needed for dry-run)
        if !self.dry_run {
            if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            project: None,
            comments: None,
            question: None,
            model: "test".to_string(),
            output: PathBuf::from("test.md"),
            ollama_url: "http://localhost:11434".to_string(),
            config: None,
            store: None,
            no_cache: false,
            force: false,
            force_questions: false,
            format: OutputFormat::Markdown,
            temperature: 0.1,
            timeout: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_invalid_ollama_url() {
        let mut args = make_args();
        args.ollama_url = "localhost:11434".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_range() {
        let mut args = make_args();
        args.temperature = 1.5;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_project_file() {
        let mut args = make_args();
        args.project = Some(PathBuf::from("/nonexistent/project.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.temperature = 9.0;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
