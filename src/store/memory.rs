//! In-memory analysis store.
//!
//! Used for `--no-cache` runs (every generation recomputes) and as the
//! store double in unit tests.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use super::AnalysisStore;
use crate::models::{ProjectAnalysisRecord, QuestionAnalysisRecord};

/// Ephemeral store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    question_analyses: Mutex<HashMap<(String, String), QuestionAnalysisRecord>>,
    project_analyses: Mutex<HashMap<String, ProjectAnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisStore for MemoryStore {
    fn find_question_analysis(
        &self,
        project_id: &str,
        question_id: &str,
    ) -> Result<Option<QuestionAnalysisRecord>> {
        let map = self.question_analyses.lock().expect("store lock poisoned");
        Ok(map
            .get(&(project_id.to_string(), question_id.to_string()))
            .cloned())
    }

    fn upsert_question_analysis(&self, record: QuestionAnalysisRecord) -> Result<()> {
        let mut map = self.question_analyses.lock().expect("store lock poisoned");
        map.insert(
            (record.project_id.clone(), record.question_id.clone()),
            record,
        );
        Ok(())
    }

    fn find_project_analysis(&self, project_id: &str) -> Result<Option<ProjectAnalysisRecord>> {
        let map = self.project_analyses.lock().expect("store lock poisoned");
        Ok(map.get(project_id).cloned())
    }

    fn upsert_project_analysis(&self, record: ProjectAnalysisRecord) -> Result<()> {
        let mut map = self.project_analyses.lock().expect("store lock poisoned");
        map.insert(record.project_id.clone(), record);
        Ok(())
    }
}
