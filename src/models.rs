//! Data models for stance analysis.
//!
//! This module contains the core data structures: projects, questions,
//! stances, comments, aggregation buckets, and the persisted analysis
//! records.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named position a comment may take on a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stance {
    /// Stance identifier, unique within its question.
    pub id: String,
    /// Human-readable stance name (e.g. "In favor", "Against").
    pub name: String,
}

/// A survey question with its declared stance options.
///
/// The stance order is the declaration order and is preserved through
/// aggregation and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub stances: Vec<Stance>,
}

/// A project groups questions and owns the generated reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Optional project description; treated as an empty string when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

/// A comment's stance assignment for one question.
///
/// A comment carries at most one assignment per question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceAssignment {
    pub question_id: String,
    pub stance_id: String,
}

/// A user comment, supplied externally and never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Extracted comment text. Absent or empty means the comment is
    /// unprocessed and is skipped from aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_content: Option<String>,
    /// Stance assignments, at most one per question.
    #[serde(default)]
    pub stances: Vec<StanceAssignment>,
}

impl Comment {
    /// Returns the extracted content if present and non-empty.
    pub fn content(&self) -> Option<&str> {
        match self.extracted_content.as_deref() {
            Some(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Returns this comment's assignment for the given question, if any.
    pub fn assignment_for(&self, question_id: &str) -> Option<&StanceAssignment> {
        self.stances.iter().find(|s| s.question_id == question_id)
    }
}

/// Per-stance aggregation entry: how many comments took this stance,
/// and their verbatim texts in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanceEntry {
    pub count: usize,
    pub comments: Vec<String>,
}

/// Aggregation result for one question: stance id to entry, in stance
/// declaration order. Contains exactly one entry per declared stance,
/// including stances with zero matching comments.
pub type StanceBucket = IndexMap<String, StanceEntry>;

/// Result of analyzing a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    /// The question text.
    pub question: String,
    /// Per-stance comment aggregation.
    pub stance_analysis: StanceBucket,
    /// Model-generated narrative for this question (opaque text).
    pub analysis: String,
}

/// Result of generating a project-level report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub project_name: String,
    pub overall_analysis: String,
}

/// Persisted per-question analysis, keyed by (project id, question id).
///
/// Upserted on regeneration; a forced rerun overwrites the previous
/// record rather than accumulating duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysisRecord {
    pub project_id: String,
    pub question_id: String,
    pub analysis: String,
    pub stance_analysis: StanceBucket,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted project-level analysis, keyed by project id and upserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysisRecord {
    pub project_id: String,
    pub project_name: String,
    pub overall_analysis: String,
    pub updated_at: DateTime<Utc>,
}
