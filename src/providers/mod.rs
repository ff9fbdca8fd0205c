// src/providers/mod.rs

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Candidate, GenerationRequest, ModelInfo};

pub mod gemini;

/// A multimodal text generation backend.
///
/// The resolver only talks to this trait, so handlers can be driven by
/// a scripted provider in tests.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generates text for a prompt plus inline image using one candidate.
    ///
    /// # Returns
    /// The non-empty response text, or a classified provider error.
    async fn generate(&self, candidate: &Candidate, request: &GenerationRequest) -> Result<String>;

    /// Lists the models visible to the configured credential through `api_version`.
    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelInfo>>;
}
