// src/api/handlers/checkout.rs
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::api::AppState;
use crate::errors::{AuraError, Result};
use crate::payments::RedirectUrls;

pub async fn create_checkout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let gateway = state.payments.as_deref().ok_or_else(|| {
        log::error!("❌ Configuration error: missing STRIPE_SECRET_KEY");
        AuraError::PaymentNotConfigured
    })?;

    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(state.config.payments.default_origin.as_str());

    let redirects = RedirectUrls::for_origin(origin);
    let session = state
        .resolver
        .guarded(
            "Stripe checkout".to_string(),
            gateway.create_checkout_session(&state.offer, &redirects),
            &state.shutdown,
        )
        .await
        .map_err(|e| match e {
            timeout @ AuraError::Timeout { .. } => AuraError::Payment(timeout.to_string()),
            other => other,
        })
        .inspect_err(|e| log::error!("❌ Stripe checkout error: {}", e))?;

    log::info!("💳 Checkout session {} created", session.session_id);

    Ok(HttpResponse::Ok().json(session))
}

/// Public settings the browser needs.
pub async fn client_config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "stripePublishableKey": state.config.payments.publishable_key
    }))
}
