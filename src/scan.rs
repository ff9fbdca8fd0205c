// src/scan.rs
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::errors::Result;
use crate::image::{inline_image, to_data_uri};
use crate::models::{AnalysisResult, AuraReading, GenerationRequest};
use crate::normalizer::parse_object;
use crate::providers::GenerativeProvider;
use crate::resolver::Resolver;

pub const AURA_PROMPT: &str = r#"You are a sarcastic Gen-Z psychic. Analyze this user's photo.
Judge their 'aura' from their pose, their expression and their surroundings.

Return ONLY a JSON object with these keys:
- 'color': one of ['purple', 'red', 'blue', 'gold', 'dark', 'neon-green'].
- 'score': an integer between -10000 and +10000 (aura points).
- 'description': one short, savage sentence explaining the verdict.

DO NOT WRITE ANY TEXT OUTSIDE THE JSON."#;

/// A photo received from the browser.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

/// Reads the aura of one uploaded photo.
pub async fn analyze(
    resolver: &Resolver,
    provider: &dyn GenerativeProvider,
    upload: &Upload,
    scan: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<AnalysisResult> {
    let scan_id = Uuid::new_v4();
    let image = inline_image(&upload.bytes, upload.mime_type.as_deref());

    log::info!(
        "🔮 Scan {} started: {} bytes ({}, {})",
        scan_id,
        upload.bytes.len(),
        image.mime_type,
        upload.file_name.as_deref().unwrap_or("unnamed")
    );

    let request = GenerationRequest { prompt: AURA_PROMPT.to_string(), image };
    let resolution = resolver.resolve(provider, &request, cancel).await.inspect_err(|e| {
        log::error!("❌ Scan {} failed: {}", scan_id, e);
    })?;

    log::info!(
        "✅ Scan {} answered by {} after {} attempt(s)",
        scan_id,
        resolution.candidate,
        resolution.attempts.len()
    );
    log::debug!("Scan {} raw response: {}", scan_id, resolution.text);

    let fields = parse_object(&resolution.text).inspect_err(|e| {
        log::error!("❌ Scan {} returned unusable JSON: {}", scan_id, e);
    })?;
    if scan.strict_output {
        AuraReading::from_fields(&fields)
            .and_then(|reading| reading.validate())
            .inspect_err(|e| log::error!("❌ Scan {} rejected: {}", scan_id, e))?;
    }

    let image = to_data_uri(&request.image.mime_type, &request.image.data);
    Ok(AnalysisResult::new(fields, image))
}
