// src/errors.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuraError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid multipart upload: {0}")]
    InvalidUpload(String),

    #[error("GEMINI_API_KEY is missing or empty")]
    AiNotConfigured,

    #[error("Missing STRIPE_SECRET_KEY environment variable")]
    PaymentNotConfigured,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model '{model}' not found: {message}")]
    ModelNotFound { model: String, message: String },

    #[error("Access to model '{model}' denied: {message}")]
    Forbidden { model: String, message: String },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("'{target}' timed out after {timeout_ms}ms")]
    Timeout { target: String, timeout_ms: u64 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Received empty text response from model")]
    EmptyResponse,

    #[error("No candidate model succeeded")]
    NoCandidates,

    #[error("Model response is not a JSON object: {0}")]
    UnparseableResponse(String),

    #[error("Model response outside the declared contract: {0}")]
    OutOfContract(String),

    #[error("Payment provider error: {0}")]
    Payment(String),
}

pub type Result<T> = std::result::Result<T, AuraError>;

/// Coarse grouping of provider failures, used by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Unknown model or access denied.
    NotFound,
    Quota,
    Timeout,
    Unavailable,
    Other,
}

impl AuraError {
    pub fn class(&self) -> FailureClass {
        match self {
            AuraError::ModelNotFound { .. } | AuraError::Forbidden { .. } => FailureClass::NotFound,
            AuraError::QuotaExceeded(_) => FailureClass::Quota,
            AuraError::Timeout { .. } => FailureClass::Timeout,
            AuraError::Unavailable(_) => FailureClass::Unavailable,
            _ => FailureClass::Other,
        }
    }

    /// HTTP status reported by the provider, when there was one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            AuraError::ModelNotFound { .. } => Some(404),
            AuraError::Forbidden { .. } => Some(403),
            AuraError::QuotaExceeded(_) => Some(429),
            AuraError::Unavailable(_) => Some(503),
            AuraError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn user_message(&self) -> Cow<'static, str> {
        let message = match self {
            AuraError::MissingFile | AuraError::InvalidUpload(_) => {
                "The waves are empty. Pick a picture to start the ritual."
            }
            AuraError::FileTooLarge { limit, .. } => {
                return Cow::Owned(format!(
                    "That picture is too heavy for the spirits. Keep it under {}.",
                    human_size(*limit)
                ));
            }
            AuraError::AiNotConfigured => {
                "The cosmic model cannot be found. Check the Gemini API key. 🔮"
            }
            AuraError::PaymentNotConfigured => {
                "Stripe configuration incomplete (missing secret key)."
            }
            AuraError::Payment(_) => "Could not create the payment session.",
            AuraError::ModelNotFound { .. }
            | AuraError::Forbidden { .. }
            | AuraError::NoCandidates => {
                "No cosmic model answered the call. Try again later. 🔭"
            }
            AuraError::QuotaExceeded(_) => "The cosmos is saturated. Wait 30 seconds... 🌌",
            AuraError::Timeout { .. } => {
                "The spirits took too long to answer. Try the scan again. ⏳"
            }
            AuraError::UnparseableResponse(_) | AuraError::OutOfContract(_) => {
                "The spirits rambled in their answer. Run the scan again."
            }
            AuraError::Cancelled => "The oracle is closing for the night. Come back in a moment.",
            _ => "Cosmic energies are unstable right now. Try again in a moment ✨",
        };
        Cow::Borrowed(message)
    }

    fn details(&self) -> Option<String> {
        match self {
            AuraError::PaymentNotConfigured | AuraError::Payment(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

/// `10MB`, `512KB`, or plain bytes when the limit is not a round unit.
fn human_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    match bytes {
        0 => "0 bytes".to_string(),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => format!("{} bytes", b),
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ResponseError for AuraError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuraError::MissingFile
            | AuraError::FileTooLarge { .. }
            | AuraError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AuraError::ModelNotFound { .. }
            | AuraError::Forbidden { .. }
            | AuraError::NoCandidates => StatusCode::NOT_FOUND,
            AuraError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AuraError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AuraError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.user_message(),
            details: self.details(),
        })
    }
}
