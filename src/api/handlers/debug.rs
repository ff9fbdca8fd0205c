// src/api/handlers/debug.rs
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use crate::api::AppState;
use crate::providers::gemini::DEFAULT_API_VERSION;

/// Lists the models the configured key can see. Diagnostic only.
pub async fn debug_gemini(state: web::Data<AppState>) -> HttpResponse {
    let (Some(gemini), Some(provider)) = (state.config.gemini.as_ref(), state.ai.as_deref()) else {
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Missing GEMINI_API_KEY" }));
    };

    let listing = state.resolver.guarded(
        format!("list models ({})", DEFAULT_API_VERSION),
        provider.list_models(DEFAULT_API_VERSION),
        &state.shutdown,
    );

    match listing.await {
        Ok(models) => {
            let key = &gemini.api_key;
            let key_chars = key.chars().count();
            let key_end: String = key.chars().skip(key_chars.saturating_sub(4)).collect();
            HttpResponse::Ok().json(json!({
                "success": true,
                "count": models.len(),
                "models": models,
                "keyLength": key_chars,
                "keyStart": key.chars().take(4).collect::<String>(),
                "keyEnd": key_end,
            }))
        }
        Err(e) => {
            log::error!("❌ Model listing failed: {}", e);
            let status = e
                .provider_status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or_else(|| e.status_code());
            HttpResponse::build(status).json(json!({
                "error": format!("Failed to list models (Status: {})", status.as_u16()),
                "details": e.to_string(),
            }))
        }
    }
}
