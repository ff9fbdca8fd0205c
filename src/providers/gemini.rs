// src/providers/gemini.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;

use crate::config::GeminiConfig;
use crate::errors::{AuraError, Result};
use crate::models::{Candidate, GenerationRequest, ModelInfo};
use crate::providers::GenerativeProvider;

/// Version used when a candidate leaves it unspecified.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// A provider for interacting with Google's Gemini models.
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }
}

fn generate_body(request: &GenerationRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                {"text": request.prompt},
                {"inlineData": {
                    "mimeType": request.image.mime_type,
                    "data": request.image.data,
                }}
            ]
        }]
    })
}

/// Joins the text parts of the first response candidate.
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AuraError::UnexpectedResponse(e.to_string()))?;

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .ok_or_else(|| AuraError::UnexpectedResponse(body.chars().take(200).collect()))?;

    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(AuraError::EmptyResponse);
    }
    Ok(text)
}

/// Maps a non-success HTTP answer to the error class the resolver acts on.
fn classify_failure(model: &str, status: StatusCode, body: String) -> AuraError {
    let lowered = body.to_lowercase();
    match status {
        StatusCode::NOT_FOUND => {
            AuraError::ModelNotFound { model: model.to_string(), message: body }
        }
        StatusCode::FORBIDDEN => AuraError::Forbidden { model: model.to_string(), message: body },
        StatusCode::TOO_MANY_REQUESTS => AuraError::QuotaExceeded(body),
        StatusCode::SERVICE_UNAVAILABLE => AuraError::Unavailable(body),
        _ if lowered.contains("resource_exhausted") || lowered.contains("quota") => {
            AuraError::QuotaExceeded(body)
        }
        _ => AuraError::ApiError { status: status.as_u16(), body },
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, candidate: &Candidate, request: &GenerationRequest) -> Result<String> {
        let version = candidate.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION);
        let url = format!("{}/{}/models/{}:generateContent", self.base(), version, candidate.model);

        log::info!("📡 Calling Gemini model {} ({})", candidate.model, version);

        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&generate_body(request))
            .send()
            .await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Gemini response status: {} ({}ms)", status, latency_ms);

        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "Could not read response body".to_string());

        if !status.is_success() {
            return Err(classify_failure(&candidate.model, status, body));
        }

        extract_text(&body)
    }

    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/{}/models", self.base(), api_version);

        log::info!("🔭 Listing Gemini models ({})", api_version);

        let resp = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .query(&[("pageSize", "1000")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(AuraError::ApiError { status: status.as_u16(), body });
        }

        let listing: ListModelsResponse = resp.json().await?;
        Ok(listing.models)
    }
}
