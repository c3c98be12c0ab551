//! Report-layer error taxonomy.
//!
//! Three failure classes, all handled the same way: logged with context
//! at the failure site, then propagated unchanged to the caller. There
//! is no retry and no fallback output. A missing cached record is a
//! normal branch, not an error.

use thiserror::Error;

/// Failure while generating or caching an analysis report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The document store failed while reading a cached record.
    #[error("analysis cache lookup failed: {0}")]
    CacheLookup(anyhow::Error),

    /// The external text-generation call failed.
    #[error("text generation failed: {0}")]
    Generation(anyhow::Error),

    /// The document store failed while writing a record.
    #[error("failed to persist analysis: {0}")]
    Persistence(anyhow::Error),
}
