// src/api/state.rs
use crate::config::AppConfig;
use crate::payments::stripe::StripeGateway;
use crate::payments::{CheckoutOffer, PaymentGateway};
use crate::providers::GenerativeProvider;
use crate::providers::gemini::GeminiProvider;
use crate::resolver::Resolver;
use reqwest::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a handler needs, injected through `web::Data`.
///
/// Provider clients only exist when their credential does, so a missing
/// key surfaces as a per-request configuration error instead of a
/// startup failure.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<Resolver>,
    pub ai: Option<Arc<dyn GenerativeProvider>>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub offer: Arc<CheckoutOffer>,
    /// Cancelled on shutdown; aborts in-flight provider calls.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::new();

        let ai = config.gemini.clone().map(|gemini| {
            Arc::new(GeminiProvider::new(client.clone(), gemini)) as Arc<dyn GenerativeProvider>
        });
        let payments = config.payments.secret_key.clone().map(|secret_key| {
            let api_base = config.payments.api_base.clone();
            let gateway = StripeGateway::new(client.clone(), api_base, secret_key);
            Arc::new(gateway) as Arc<dyn PaymentGateway>
        });

        Self::with_providers(config, ai, payments)
    }

    pub fn with_providers(
        config: AppConfig,
        ai: Option<Arc<dyn GenerativeProvider>>,
        payments: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(config.resolver.clone())),
            config: Arc::new(config),
            ai,
            payments,
            offer: Arc::new(CheckoutOffer::default()),
            shutdown: CancellationToken::new(),
        }
    }
}
