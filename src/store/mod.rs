//! Persistence for analysis records.
//!
//! The report generators only see the [`AnalysisStore`] trait; the
//! concrete backends are a JSON document on disk and an in-memory store
//! for cache-less runs and tests.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::models::{ProjectAnalysisRecord, QuestionAnalysisRecord};

/// Document store for the two analysis record kinds.
///
/// Both record kinds are upserted by key: (project id, question id) for
/// question analyses, project id for project analyses.
pub trait AnalysisStore: Send + Sync {
    /// Find a cached per-question analysis.
    fn find_question_analysis(
        &self,
        project_id: &str,
        question_id: &str,
    ) -> Result<Option<QuestionAnalysisRecord>>;

    /// Insert or overwrite a per-question analysis.
    fn upsert_question_analysis(&self, record: QuestionAnalysisRecord) -> Result<()>;

    /// Find a cached project-level analysis.
    fn find_project_analysis(&self, project_id: &str) -> Result<Option<ProjectAnalysisRecord>>;

    /// Insert or overwrite a project-level analysis.
    fn upsert_project_analysis(&self, record: ProjectAnalysisRecord) -> Result<()>;
}
