//! JSON-file-backed analysis store.
//!
//! All records live in a single JSON document. The file is read once on
//! open and rewritten on every mutation; a mutex serializes access from
//! concurrent question analyses.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use super::AnalysisStore;
use crate::models::{ProjectAnalysisRecord, QuestionAnalysisRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreData {
    #[serde(default)]
    question_analyses: Vec<QuestionAnalysisRecord>,
    #[serde(default)]
    project_analyses: Vec<ProjectAnalysisRecord>,
}

/// Analysis store persisted as one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store, loading existing records if the file exists.
    pub fn open(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read store file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file: {}", path.display()))?
        } else {
            StoreData::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    fn flush(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(data).context("Failed to serialize store")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))?;

        debug!("Store flushed to {}", self.path.display());
        Ok(())
    }
}

impl AnalysisStore for JsonFileStore {
    fn find_question_analysis(
        &self,
        project_id: &str,
        question_id: &str,
    ) -> Result<Option<QuestionAnalysisRecord>> {
        let data = self.data.lock().expect("store lock poisoned");
        Ok(data
            .question_analyses
            .iter()
            .find(|r| r.project_id == project_id && r.question_id == question_id)
            .cloned())
    }

    fn upsert_question_analysis(&self, record: QuestionAnalysisRecord) -> Result<()> {
        let mut data = self.data.lock().expect("store lock poisoned");

        if let Some(existing) = data
            .question_analyses
            .iter_mut()
            .find(|r| r.project_id == record.project_id && r.question_id == record.question_id)
        {
            *existing = record;
        } else {
            data.question_analyses.push(record);
        }

        self.flush(&data)
    }

    fn find_project_analysis(&self, project_id: &str) -> Result<Option<ProjectAnalysisRecord>> {
        let data = self.data.lock().expect("store lock poisoned");
        Ok(data
            .project_analyses
            .iter()
            .find(|r| r.project_id == project_id)
            .cloned())
    }

    fn upsert_project_analysis(&self, record: ProjectAnalysisRecord) -> Result<()> {
        let mut data = self.data.lock().expect("store lock poisoned");

        if let Some(existing) = data
            .project_analyses
            .iter_mut()
            .find(|r| r.project_id == record.project_id)
        {
            *existing = record;
        } else {
            data.project_analyses.push(record);
        }

        self.flush(&data)
    }
}
