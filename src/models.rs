// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AuraError, Result};

/// A model identifier paired with the API version to call it through.
/// `api_version == None` lets the provider default apply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub model: String,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl Candidate {
    pub fn new(model: impl Into<String>, api_version: Option<&str>) -> Self {
        Self {
            model: model.into(),
            api_version: api_version.map(str::to_string),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.api_version {
            Some(version) => write!(f, "{}@{}", self.model, version),
            None => write!(f, "{}", self.model),
        }
    }
}

/// Parses `model` or `model@version`.
impl FromStr for Candidate {
    type Err = AuraError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (model, version) = match s.split_once('@') {
            Some((model, version)) => (model.trim(), Some(version.trim())),
            None => (s, None),
        };
        if model.is_empty() || version.is_some_and(str::is_empty) {
            return Err(AuraError::Config(format!("Invalid candidate '{}'", s)));
        }
        Ok(Candidate::new(model, version))
    }
}

/// Aura color category. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuraColor {
    Purple,
    Red,
    Blue,
    Gold,
    Dark,
    NeonGreen,
    Other(String),
}

impl AuraColor {
    pub fn is_known(&self) -> bool {
        !matches!(self, AuraColor::Other(_))
    }
}

impl From<String> for AuraColor {
    fn from(value: String) -> Self {
        match value.as_str() {
            "purple" => AuraColor::Purple,
            "red" => AuraColor::Red,
            "blue" => AuraColor::Blue,
            "gold" => AuraColor::Gold,
            "dark" => AuraColor::Dark,
            "neon-green" => AuraColor::NeonGreen,
            _ => AuraColor::Other(value),
        }
    }
}

impl From<AuraColor> for String {
    fn from(color: AuraColor) -> Self {
        match color {
            AuraColor::Purple => "purple".to_string(),
            AuraColor::Red => "red".to_string(),
            AuraColor::Blue => "blue".to_string(),
            AuraColor::Gold => "gold".to_string(),
            AuraColor::Dark => "dark".to_string(),
            AuraColor::NeonGreen => "neon-green".to_string(),
            AuraColor::Other(value) => value,
        }
    }
}

/// The typed reading the prompt asks for. Only used to check a response
/// when strict output is enabled; otherwise the raw object is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraReading {
    pub color: AuraColor,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any further keys the model returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = -10_000..=10_000;

impl AuraReading {
    /// Reads the typed fields out of a raw response object.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|e| AuraError::OutOfContract(e.to_string()))
    }

    /// Rejects readings whose color or score fall outside the declared contract.
    pub fn validate(&self) -> Result<()> {
        if !self.color.is_known() {
            return Err(AuraError::OutOfContract(format!(
                "unknown color '{}'",
                String::from(self.color.clone())
            )));
        }
        if !SCORE_RANGE.contains(&self.score) {
            return Err(AuraError::OutOfContract(format!("score {} out of range", self.score)));
        }
        Ok(())
    }
}

/// The body returned by `POST /api/analyze-aura`: every key the model
/// returned plus the uploaded image as a data URI.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub image: String,
}

impl AnalysisResult {
    pub fn new(mut fields: Map<String, Value>, image: String) -> Self {
        fields.remove("image");
        Self { fields, image }
    }
}

/// Base64 image data sent inline to the provider.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: InlineImage,
}

/// One entry of the provider's model listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Name without the `models/` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn can_generate(&self) -> bool {
        self.supported_generation_methods.is_empty()
            || self.supported_generation_methods.iter().any(|m| m == "generateContent")
    }
}
