// src/image.rs
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::InlineImage;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

static DATA_URI_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:[\w.+-]+/[\w.+-]+;base64,").expect("valid data URI regex"));

/// Removes a leading `data:<mime>;base64,` prefix if present.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    match DATA_URI_PREFIX.find(data) {
        Some(m) => &data[m.end()..],
        None => data,
    }
}

pub fn to_data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Encodes uploaded bytes for inline transport to the provider.
pub fn inline_image(bytes: &[u8], mime_type: Option<&str>) -> InlineImage {
    let encoded = BASE64.encode(bytes);
    let data = strip_data_uri_prefix(&encoded).to_string();
    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();
    InlineImage { mime_type, data }
}
