// src/api/handlers/aura.rs
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;

use crate::api::AppState;
use crate::errors::{AuraError, Result};
use crate::scan::{self, Upload};

const FILE_FIELD: &str = "file";

/// Pulls the `file` field out of the form, enforcing the size cap while
/// streaming. Other fields are drained and ignored.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| AuraError::InvalidUpload(e.to_string()))?;

        if field.name() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AuraError::InvalidUpload(e.to_string()))?;
            }
            continue;
        }

        let mime_type = field.content_type().map(|m| m.essence_str().to_string());
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AuraError::InvalidUpload(e.to_string()))?;
            if bytes.len() + chunk.len() > limit {
                return Err(AuraError::FileTooLarge { size: bytes.len() + chunk.len(), limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        // an empty file input still posts the field
        if bytes.is_empty() {
            return Err(AuraError::MissingFile);
        }
        return Ok(Upload { bytes, mime_type, file_name });
    }
    Err(AuraError::MissingFile)
}

pub async fn analyze_aura(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let upload = read_upload(payload, state.config.scan.max_upload_bytes)
        .await
        .inspect_err(|e| log::warn!("Rejected upload: {}", e))?;

    let provider = state.ai.as_deref().ok_or_else(|| {
        log::error!("❌ GEMINI_API_KEY is missing or empty");
        AuraError::AiNotConfigured
    })?;

    let result =
        scan::analyze(&state.resolver, provider, &upload, &state.config.scan, &state.shutdown)
            .await?;

    Ok(HttpResponse::Ok().json(result))
}
