// src/payments/stripe.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;

use crate::errors::{AuraError, Result};
use crate::payments::{CheckoutOffer, CheckoutSession, PaymentGateway, RedirectUrls};

const STRIPE_API_VERSION: &str = "2023-10-16";

/// Stripe Checkout client. Only built when a secret key is configured.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(client: Client, api_base: String, secret_key: String) -> Self {
        Self { client, api_base, secret_key }
    }
}

/// Form fields for a one-item card payment session.
fn session_form(offer: &CheckoutOffer, redirects: &RedirectUrls) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        ("line_items[0][price_data][currency]", offer.currency.clone()),
        ("line_items[0][price_data][unit_amount]", offer.unit_amount.to_string()),
        ("line_items[0][price_data][product_data][name]", offer.product_name.clone()),
        ("line_items[0][price_data][product_data][description]", offer.description.clone()),
        ("line_items[0][price_data][product_data][images][0]", offer.image_url.clone()),
        ("success_url", redirects.success_url.clone()),
        ("cancel_url", redirects.cancel_url.clone()),
    ]
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<StripeErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        offer: &CheckoutOffer,
        redirects: &RedirectUrls,
    ) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.api_base.trim_end_matches('/'));

        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(&session_form(offer, redirects))
            .send()
            .await
            .map_err(|e| AuraError::Payment(e.to_string()))?;

        let status = resp.status();
        log::info!("💳 Stripe response status: {} ({}ms)", status, start.elapsed().as_millis());

        let body = resp.text().await.map_err(|e| AuraError::Payment(e.to_string()))?;
        if !status.is_success() {
            return Err(AuraError::Payment(error_message(&body)));
        }

        let session: SessionResponse =
            serde_json::from_str(&body).map_err(|e| AuraError::Payment(e.to_string()))?;

        Ok(CheckoutSession { session_id: session.id, url: session.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_form_fields() {
        let redirects = RedirectUrls::for_origin("http://localhost:3000");
        let form = session_form(&CheckoutOffer::default(), &redirects);
        let get = |key: &str| form.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str());
        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("99"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("eur"));
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
        assert_eq!(get("success_url"), Some("http://localhost:3000/?payment=success"));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{
            "message":"Invalid API Key provided: sk_test_****",
            "type":"invalid_request_error"
        }}"#;
        assert_eq!(error_message(body), "Invalid API Key provided: sk_test_****");
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}
