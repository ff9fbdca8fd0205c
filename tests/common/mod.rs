// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::dev::ServiceResponse;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use async_trait::async_trait;
use auracheck::api::{configure_routes, AppState};
use auracheck::errors::{AuraError, Result};
use auracheck::models::{Candidate, GenerationRequest, InlineImage, ModelInfo};
use auracheck::payments::{CheckoutOffer, CheckoutSession, PaymentGateway, RedirectUrls};
use auracheck::providers::GenerativeProvider;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// What the scripted provider answers for one model.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    NotFound,
    Forbidden,
    Quota,
    Unavailable,
    BadRequest,
    Slow(Duration, String),
}

pub fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

/// A provider driven by per-model replies that records every call.
pub struct ScriptedProvider {
    replies: HashMap<String, Reply>,
    listings: HashMap<String, Vec<String>>,
    listing_delay: Option<Duration>,
    pub calls: Mutex<Vec<Candidate>>,
    pub list_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Unknown models answer `NotFound`; unknown listing versions fail.
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            listings: HashMap::new(),
            listing_delay: None,
            calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, model: &str, reply: Reply) -> Self {
        self.replies.insert(model.to_string(), reply);
        self
    }

    pub fn listing(mut self, api_version: &str, models: &[&str]) -> Self {
        self.listings
            .insert(api_version.to_string(), models.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn slow_listing(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.model.clone()).collect()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    async fn generate(
        &self,
        candidate: &Candidate,
        _request: &GenerationRequest,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(candidate.clone());
        let reply = self.replies.get(&candidate.model).cloned().unwrap_or(Reply::NotFound);
        let model = candidate.model.clone();
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::NotFound => Err(AuraError::ModelNotFound { model, message: "not found".into() }),
            Reply::Forbidden => {
                Err(AuraError::Forbidden { model, message: "permission denied".into() })
            }
            Reply::Quota => Err(AuraError::QuotaExceeded("RESOURCE_EXHAUSTED".into())),
            Reply::Unavailable => Err(AuraError::Unavailable("overloaded".into())),
            Reply::BadRequest => {
                Err(AuraError::ApiError { status: 400, body: "bad request".into() })
            }
            Reply::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }

    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelInfo>> {
        self.list_calls.lock().unwrap().push(api_version.to_string());
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        match self.listings.get(api_version) {
            Some(names) => Ok(names
                .iter()
                .map(|n| ModelInfo {
                    name: format!("models/{}", n),
                    display_name: None,
                    supported_generation_methods: vec!["generateContent".to_string()],
                })
                .collect()),
            None => Err(AuraError::ApiError { status: 500, body: "listing unavailable".into() }),
        }
    }
}

/// A payment gateway that records the redirects it was asked for.
pub struct RecordingGateway {
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<RedirectUrls>>,
}

impl RecordingGateway {
    pub fn ok() -> Self {
        Self { fail_with: None, delay: None, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: &str) -> Self {
        Self { fail_with: Some(message.to_string()), ..Self::ok() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::ok() }
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_checkout_session(
        &self,
        _offer: &CheckoutOffer,
        redirects: &RedirectUrls,
    ) -> Result<CheckoutSession> {
        self.calls.lock().unwrap().push(redirects.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(AuraError::Payment(message.clone())),
            None => Ok(CheckoutSession {
                session_id: "cs_test_a1".to_string(),
                url: Some("https://checkout.stripe.com/c/pay/cs_test_a1".to_string()),
            }),
        }
    }
}

pub fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "read my aura".to_string(),
        image: InlineImage { mime_type: "image/png".to_string(), data: "iVBORw0KGgo=".to_string() },
    }
}

pub fn candidates(models: &[&str]) -> Vec<Candidate> {
    models.iter().map(|m| m.parse().unwrap()).collect()
}

pub const BOUNDARY: &str = "----auracheck-boundary";

/// One multipart part: field name, optional (file name, content type), content.
pub struct Part<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub content: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        part.name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> TestRequest {
    TestRequest::post()
        .uri("/api/analyze-aura")
        .insert_header((
            actix_web::http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

pub fn photo_request(bytes: &[u8]) -> TestRequest {
    upload_request(&[Part {
        name: "file",
        file: Some(("selfie.png", "image/png")),
        content: bytes,
    }])
}

pub async fn call(state: AppState, req: TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(configure_routes),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}
