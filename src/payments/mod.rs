// src/payments/mod.rs

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

pub mod stripe;

/// The single product on sale.
#[derive(Debug, Clone)]
pub struct CheckoutOffer {
    pub product_name: String,
    pub description: String,
    pub image_url: String,
    pub currency: String,
    /// Price in the currency's minor unit.
    pub unit_amount: u64,
}

const PRODUCT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1534528741775-53994a69daeb?q=80&w=200&auto=format&fit=crop";

impl Default for CheckoutOffer {
    fn default() -> Self {
        Self {
            product_name: "AuraCheck Premium - No Watermark & HD".to_string(),
            description: "Unlock your cosmic aura in high definition, with no branding."
                .to_string(),
            image_url: PRODUCT_IMAGE_URL.to_string(),
            currency: "eur".to_string(),
            unit_amount: 99,
        }
    }
}

/// Where the payment provider sends the browser afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl RedirectUrls {
    pub fn for_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            success_url: format!("{}/?payment=success", origin),
            cancel_url: format!("{}/?payment=cancelled", origin),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Creates hosted payment sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        offer: &CheckoutOffer,
        redirects: &RedirectUrls,
    ) -> Result<CheckoutSession>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirects_for_origin() {
        let urls = RedirectUrls::for_origin("https://auracheck.app/");
        assert_eq!(urls.success_url, "https://auracheck.app/?payment=success");
        assert_eq!(urls.cancel_url, "https://auracheck.app/?payment=cancelled");
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = CheckoutSession {
            session_id: "cs_test_1".into(),
            url: Some("https://checkout".into()),
        };
        let out = serde_json::to_value(&session).unwrap();
        assert_eq!(out["sessionId"], "cs_test_1");
        assert_eq!(out["url"], "https://checkout");
    }
}
