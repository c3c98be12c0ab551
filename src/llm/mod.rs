//! Text-generation collaborators.

mod ollama;

pub use ollama::{OllamaConfig, OllamaGenerator};

use anyhow::Result;
use async_trait::async_trait;

/// Narrow capability interface for an external generative model.
///
/// The report generators depend only on this trait, so any vendor
/// client (or a test mock) can stand in.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
