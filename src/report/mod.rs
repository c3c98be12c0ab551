//! Report generation pipeline.
//!
//! `stance` analyzes one question (aggregate, cache-or-generate,
//! persist), `project` fans out over a project's questions and
//! synthesizes the overall narrative, `render` turns results into the
//! final Markdown/JSON document.

pub mod project;
pub mod render;
pub mod stance;

pub use project::{ProjectReportGenerator, ReportOptions};
pub use stance::{aggregate_stances, StanceReportGenerator};
