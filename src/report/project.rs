//! Project-level report generation.
//!
//! Fans out per-question analyses concurrently (fail-fast), then asks
//! the text generator to synthesize the overall narrative, with its own
//! project-keyed cache.

use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::ReportError;
use crate::llm::TextGenerator;
use crate::models::{Comment, Project, ProjectAnalysisRecord, ProjectReport};
use crate::prompts;
use crate::report::stance::StanceReportGenerator;
use crate::store::AnalysisStore;

/// Regeneration controls for a project report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Regenerate the project-level report even when cached.
    pub force_regenerate: bool,
    /// Also force-regenerate every per-question analysis. Off by
    /// default: a forced project report reuses cached question
    /// analyses.
    pub force_questions: bool,
}

/// Generates and caches the overall project report.
pub struct ProjectReportGenerator {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn AnalysisStore>,
    stance_generator: StanceReportGenerator,
}

impl ProjectReportGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn AnalysisStore>) -> Self {
        let stance_generator = StanceReportGenerator::new(generator.clone(), store.clone());
        Self {
            generator,
            store,
            stance_generator,
        }
    }

    /// Generate the overall report for a project.
    ///
    /// Unless forced, a cached project record is returned as-is. On a
    /// miss, every question is analyzed (concurrently, fail-fast; a
    /// single failure aborts the batch, leaving already-persisted
    /// question records in place), the synthesis narrative is generated
    /// and the project record upserted.
    pub async fn generate(
        &self,
        project: &Project,
        comments: &[Comment],
        opts: ReportOptions,
    ) -> Result<ProjectReport, ReportError> {
        if !opts.force_regenerate {
            let cached = self.store.find_project_analysis(&project.id).map_err(|e| {
                error!("Cache lookup failed for project {}: {}", project.id, e);
                ReportError::CacheLookup(e)
            })?;

            if let Some(record) = cached {
                info!("Using cached report for project {}", project.id);
                return Ok(ProjectReport {
                    project_name: record.project_name,
                    overall_analysis: record.overall_analysis,
                });
            }
            debug!("No cached report for project {}", project.id);
        }

        let force_questions = opts.force_regenerate && opts.force_questions;
        info!(
            "Analyzing {} questions for project {}",
            project.questions.len(),
            project.id
        );

        // Results come back in the project's question order.
        let analyses = try_join_all(project.questions.iter().map(|question| {
            self.stance_generator.analyze(
                &project.id,
                &question.text,
                comments,
                &question.stances,
                &question.id,
                force_questions,
            )
        }))
        .await?;

        let description = project.description.as_deref().unwrap_or("");
        let prompt = prompts::project_report_prompt(&project.name, description, &analyses);

        info!("Generating overall report for project {}", project.id);
        let overall_analysis = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Report generation failed for project {}: {}", project.id, e);
            ReportError::Generation(e)
        })?;

        self.store
            .upsert_project_analysis(ProjectAnalysisRecord {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                overall_analysis: overall_analysis.clone(),
                updated_at: Utc::now(),
            })
            .map_err(|e| {
                error!("Failed to persist report for project {}: {}", project.id, e);
                ReportError::Persistence(e)
            })?;
        debug!("Persisted report for project {}", project.id);

        Ok(ProjectReport {
            project_name: project.name.clone(),
            overall_analysis,
        })
    }
}
