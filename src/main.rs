//! StanceLens - AI-powered stance analysis reports
//!
//! A CLI tool that buckets survey comments by stance for every question
//! of a project, has an Ollama model analyze each question, and
//! synthesizes an overall project report. Analyses are cached in a JSON
//! document store keyed by project and question.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (input, connection, generation, persistence)

mod cli;
mod config;
mod error;
mod input;
mod llm;
mod models;
mod prompts;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use models::{Comment, Project, Question};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use llm::{OllamaConfig, OllamaGenerator, TextGenerator};
use report::{render, ProjectReportGenerator, ReportOptions, StanceReportGenerator};
use store::{AnalysisStore, JsonFileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("StanceLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the report generation
    match run_report(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Report generation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .stancelens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".stancelens.toml");

    if path.exists() {
        eprintln!("⚠️  .stancelens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .stancelens.toml")?;

    println!("✅ Created .stancelens.toml with default settings.");
    println!("   Edit it to customize model, store path, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete report workflow.
async fn run_report(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load inputs
    let project_path = args.project.as_ref().context("--project is required")?;
    let comments_path = args.comments.as_ref().context("--comments is required")?;

    println!("📥 Loading project: {}", project_path.display());
    let project = input::load_project(project_path)?;
    let comments = input::load_comments(comments_path)?;

    // Handle --dry-run: aggregate and exit
    if args.dry_run {
        return handle_dry_run(&project, &comments);
    }

    // Step 2: Set up collaborators
    println!("🤖 Initializing model client...");
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    println!("   Timeout: {}s", config.model.timeout_seconds);

    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::new(OllamaConfig {
        url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })?);

    let analysis_store: Arc<dyn AnalysisStore> = if args.no_cache {
        info!("Cache disabled, using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let path = std::path::Path::new(&config.store.path);
        info!("Using analysis store at {}", path.display());
        Arc::new(JsonFileStore::open(path)?)
    };

    // Step 3: Generate
    let output = if let Some(ref question_id) = args.question {
        run_question_report(
            &args,
            &project,
            &comments,
            question_id,
            generator,
            analysis_store,
        )
        .await?
    } else {
        run_project_report(
            &args,
            &config,
            &project,
            &comments,
            generator,
            analysis_store,
        )
        .await?
    };

    // Step 4: Write the report
    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    println!(
        "\n✅ Report complete! Saved to: {}",
        args.output.display()
    );

    Ok(())
}

/// Analyze a single question and render it.
async fn run_question_report(
    args: &Args,
    project: &Project,
    comments: &[Comment],
    question_id: &str,
    generator: Arc<dyn TextGenerator>,
    analysis_store: Arc<dyn AnalysisStore>,
) -> Result<String> {
    let question = find_question(project, question_id)?;

    println!("\n🔬 Analyzing question: {}", question.text);
    let reporter = StanceReportGenerator::new(generator, analysis_store);
    let analysis = reporter
        .analyze(
            &project.id,
            &question.text,
            comments,
            &question.stances,
            &question.id,
            args.force,
        )
        .await?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&analysis)?,
        OutputFormat::Markdown => {
            let section = render::QuestionSection {
                question: analysis.question.clone(),
                stances: question
                    .stances
                    .iter()
                    .map(|stance| render::StanceRow {
                        name: stance.name.clone(),
                        count: analysis
                            .stance_analysis
                            .get(&stance.id)
                            .map(|e| e.count)
                            .unwrap_or(0),
                    })
                    .collect(),
                analysis: Some(analysis.analysis.clone()),
            };
            render::render_question_markdown(&section)
        }
    };

    Ok(output)
}

/// Generate the full project report and render it.
async fn run_project_report(
    args: &Args,
    config: &Config,
    project: &Project,
    comments: &[Comment],
    generator: Arc<dyn TextGenerator>,
    analysis_store: Arc<dyn AnalysisStore>,
) -> Result<String> {
    println!(
        "\n🔬 Generating report for '{}' ({} questions, {} comments)...",
        project.name,
        project.questions.len(),
        comments.len()
    );

    let reporter = ProjectReportGenerator::new(generator, analysis_store.clone());
    let opts = ReportOptions {
        force_regenerate: args.force,
        force_questions: args.force_questions,
    };
    let project_report = reporter.generate(project, comments, opts).await?;

    // Per-question narratives for the rendered document, read back from
    // the store (absent ones are simply omitted)
    let narratives: Vec<Option<String>> = project
        .questions
        .iter()
        .map(|question| {
            match analysis_store.find_question_analysis(&project.id, &question.id) {
                Ok(record) => record.map(|r| r.analysis),
                Err(e) => {
                    warn!("Could not read analysis for question {}: {}", question.id, e);
                    None
                }
            }
        })
        .collect();

    let doc = render::build_document(
        project,
        comments,
        &config.model.name,
        project_report.overall_analysis,
        narratives,
    );

    let output = match args.format {
        OutputFormat::Json => render::render_json(&doc)?,
        OutputFormat::Markdown => render::render_markdown(&doc),
    };

    Ok(output)
}

/// Handle --dry-run: aggregate stances, print the distribution, exit.
fn handle_dry_run(project: &Project, comments: &[Comment]) -> Result<()> {
    println!("\n🔍 Dry run: aggregating stances (no LLM call)...\n");

    for question in &project.questions {
        let bucket = report::aggregate_stances(comments, &question.stances, &question.id);
        println!("   ❓ {}", question.text);

        for stance in &question.stances {
            let count = bucket.get(&stance.id).map(|e| e.count).unwrap_or(0);
            println!("      {} — {} comments", stance.name, count);
        }
        println!();
    }

    println!("✅ Dry run complete. No LLM calls were made.");
    Ok(())
}

/// Look up a question by id in the project.
fn find_question<'a>(project: &'a Project, question_id: &str) -> Result<&'a Question> {
    project
        .questions
        .iter()
        .find(|q| q.id == question_id)
        .with_context(|| {
            format!(
                "Question '{}' not found in project '{}'",
                question_id, project.name
            )
        })
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .stancelens.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stance;

    #[test]
    fn test_find_question() {
        let project = Project {
            id: "p1".to_string(),
            name: "Test".to_string(),
            description: None,
            questions: vec![Question {
                id: "q1".to_string(),
                text: "Q?".to_string(),
                stances: vec![Stance {
                    id: "a".to_string(),
                    name: "Pro".to_string(),
                }],
            }],
        };

        assert_eq!(find_question(&project, "q1").unwrap().text, "Q?");
        assert!(find_question(&project, "q9").is_err());
    }
}
