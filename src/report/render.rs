//! Report document rendering.
//!
//! Turns generated analyses into the final Markdown or JSON document
//! written to disk. Pure string building.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Comment, Project};
use crate::report::stance::aggregate_stances;

/// Metadata shown at the top of the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
    pub question_count: usize,
    pub comment_count: usize,
}

/// Stance distribution row for one question.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceRow {
    pub name: String,
    pub count: usize,
}

/// Per-question section of the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSection {
    pub question: String,
    pub stances: Vec<StanceRow>,
    /// Per-question narrative, when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// The complete report document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub overall_analysis: String,
    pub questions: Vec<QuestionSection>,
}

/// Assemble the report document from the project, its comments, the
/// overall narrative, and the per-question narratives (aligned with the
/// project's question order).
pub fn build_document(
    project: &Project,
    comments: &[Comment],
    model_used: &str,
    overall_analysis: String,
    narratives: Vec<Option<String>>,
) -> ReportDocument {
    let questions = project
        .questions
        .iter()
        .zip(narratives)
        .map(|(question, analysis)| {
            let bucket = aggregate_stances(comments, &question.stances, &question.id);
            let stances = question
                .stances
                .iter()
                .map(|stance| StanceRow {
                    name: stance.name.clone(),
                    count: bucket.get(&stance.id).map(|e| e.count).unwrap_or(0),
                })
                .collect();

            QuestionSection {
                question: question.text.clone(),
                stances,
                analysis,
            }
        })
        .collect();

    ReportDocument {
        metadata: ReportMetadata {
            project_name: project.name.clone(),
            generated_at: Utc::now(),
            model_used: model_used.to_string(),
            question_count: project.questions.len(),
            comment_count: comments.len(),
        },
        overall_analysis,
        questions,
    }
}

/// Generate the complete Markdown report.
pub fn render_markdown(doc: &ReportDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Stance Report: {}\n\n", doc.metadata.project_name));

    output.push_str("## Metadata\n\n");
    output.push_str(&format!(
        "- **Generated:** {}\n",
        doc.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Model Used:** `{}`\n", doc.metadata.model_used));
    output.push_str(&format!("- **Questions:** {}\n", doc.metadata.question_count));
    output.push_str(&format!("- **Comments:** {}\n\n", doc.metadata.comment_count));

    output.push_str("## Overall Analysis\n\n");
    output.push_str(&doc.overall_analysis);
    output.push_str("\n\n");

    for section in &doc.questions {
        output.push_str(&render_question_section(section));
    }

    output.push_str("---\n\n*Report generated by StanceLens*\n");

    output
}

/// Render a single question section as a standalone Markdown document
/// (used for `--question` runs).
pub fn render_question_markdown(section: &QuestionSection) -> String {
    let mut output = render_question_section(section);
    output.push_str("---\n\n*Report generated by StanceLens*\n");
    output
}

fn render_question_section(section: &QuestionSection) -> String {
    let mut out = String::new();

    out.push_str(&format!("## Question: {}\n\n", section.question));

    out.push_str("| Stance | Comments |\n");
    out.push_str("|:---|:---:|\n");
    for row in &section.stances {
        out.push_str(&format!("| {} | {} |\n", row.name, row.count));
    }
    out.push('\n');

    if let Some(ref analysis) = section.analysis {
        out.push_str(analysis);
        out.push_str("\n\n");
    }

    out
}

/// Generate the JSON report.
pub fn render_json(doc: &ReportDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(Into::into)
}
