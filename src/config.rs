// src/config.rs
use serde::Deserialize;
use std::path::Path;

use crate::errors::{AuraError, Result};
use crate::models::Candidate;
use crate::resolver::RetryPolicy;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Preferred models, most wanted first. The legacy `gemini-pro` on `v1`
/// is the last resort.
const DEFAULT_CANDIDATES: &[&str] = &[
    "gemini-1.5-flash@v1beta",
    "gemini-1.5-flash-001@v1beta",
    "gemini-1.5-flash-002@v1beta",
    "gemini-1.5-pro@v1beta",
    "gemini-1.5-pro-001@v1beta",
    "gemini-1.5-pro-002@v1beta",
    "gemini-2.0-flash-exp@v1beta",
    "gemini-pro@v1",
    "gemini-1.0-pro@v1",
];

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Configuration for Stripe Checkout. Credentials are optional so the
/// service still starts without them.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub api_base: String,
    pub secret_key: Option<String>,
    pub publishable_key: Option<String>,
    pub default_origin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    /// Listing endpoints, tried in order until one answers.
    pub api_versions: Vec<String>,
    /// Fallback match when no candidate model is listed.
    pub keyword: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_versions: vec!["v1beta".to_string(), "v1".to_string()],
            keyword: "gemini".to_string(),
        }
    }
}

/// The retry table owned by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub candidates: Vec<Candidate>,
    pub discovery: DiscoveryConfig,
    pub timeout_ms: Option<u64>,
    pub retry_policy: RetryPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES
                .iter()
                .filter_map(|c| c.parse().ok())
                .collect(),
            discovery: DiscoveryConfig::default(),
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Optional TOML overrides for the resolver table.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct ResolverFile {
    candidates: Option<Vec<String>>,
    timeout_ms: Option<u64>,
    retry_policy: Option<RetryPolicy>,
    discovery: Option<DiscoveryFile>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct DiscoveryFile {
    enabled: Option<bool>,
    api_versions: Option<Vec<String>>,
    keyword: Option<String>,
}

impl ResolverConfig {
    /// Applies a TOML document on top of the current values.
    pub fn merge_toml(mut self, source: &str) -> Result<Self> {
        let file: ResolverFile = toml::from_str(source)?;
        if let Some(candidates) = file.candidates {
            self.candidates = candidates
                .iter()
                .map(|c| c.parse::<Candidate>())
                .collect::<Result<Vec<Candidate>>>()?;
        }
        if let Some(timeout_ms) = file.timeout_ms {
            self.timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        }
        if let Some(policy) = file.retry_policy {
            self.retry_policy = policy;
        }
        if let Some(discovery) = file.discovery {
            if let Some(enabled) = discovery.enabled {
                self.discovery.enabled = enabled;
            }
            if let Some(api_versions) = discovery.api_versions {
                self.discovery.api_versions = api_versions;
            }
            if let Some(keyword) = discovery.keyword {
                self.discovery.keyword = keyword;
            }
        }
        Ok(self)
    }

    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        self.merge_toml(&source)
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub max_upload_bytes: usize,
    /// Reject readings outside the color enum or score range.
    pub strict_output: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES, strict_output: false }
    }
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: Option<GeminiConfig>,
    pub payments: PaymentConfig,
    pub resolver: ResolverConfig,
    pub scan: ScanConfig,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini: None,
            payments: PaymentConfig {
                api_base: DEFAULT_STRIPE_API_BASE.to_string(),
                secret_key: None,
                publishable_key: None,
                default_origin: DEFAULT_ORIGIN.to_string(),
            },
            resolver: ResolverConfig::default(),
            scan: ScanConfig::default(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Missing credentials
    /// are not an error; malformed values are. Resolver settings come from
    /// defaults, then the `AURA_RESOLVER_CONFIG` file, then the individual
    /// `AURA_*` variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = AppConfig::default();

        if let Some(api_key) = var("GEMINI_API_KEY") {
            let api_base =
                var("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
            config.gemini = Some(GeminiConfig { api_base, api_key });
        }

        if let Some(api_base) = var("STRIPE_API_BASE") {
            config.payments.api_base = api_base;
        }
        config.payments.secret_key = var("STRIPE_SECRET_KEY");
        config.payments.publishable_key = var("STRIPE_PUBLISHABLE_KEY");
        if let Some(origin) = var("AURA_DEFAULT_ORIGIN") {
            config.payments.default_origin = origin;
        }

        // the resolver file is the base; AURA_* variables override it
        if let Some(path) = var("AURA_RESOLVER_CONFIG") {
            config.resolver = config.resolver.merge_file(Path::new(&path))?;
        }
        if let Some(list) = var("AURA_CANDIDATES") {
            config.resolver.candidates = list
                .split(',')
                .filter(|c| !c.trim().is_empty())
                .map(|c| c.parse::<Candidate>())
                .collect::<Result<Vec<Candidate>>>()?;
        }
        if let Some(enabled) = var("AURA_DISCOVERY") {
            config.resolver.discovery.enabled = parse_bool("AURA_DISCOVERY", &enabled)?;
        }
        if let Some(timeout) = var("AURA_TIMEOUT_MS") {
            let timeout_ms: u64 = parse_number("AURA_TIMEOUT_MS", &timeout)?;
            config.resolver.timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        }
        if let Some(policy) = var("AURA_RETRY_POLICY") {
            config.resolver.retry_policy = policy.parse()?;
        }

        if let Some(strict) = var("AURA_STRICT_OUTPUT") {
            config.scan.strict_output = parse_bool("AURA_STRICT_OUTPUT", &strict)?;
        }
        if let Some(limit) = var("AURA_MAX_UPLOAD_BYTES") {
            config.scan.max_upload_bytes = parse_number("AURA_MAX_UPLOAD_BYTES", &limit)?;
        }

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = parse_number("PORT", &port)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AuraError::Config(format!("{} must be a boolean, got '{}'", key, value))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AuraError::Config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_credentials() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.gemini.is_none());
        assert!(config.payments.secret_key.is_none());
        assert_eq!(config.resolver.candidates.len(), DEFAULT_CANDIDATES.len());
        assert_eq!(
            config.resolver.candidates[0],
            Candidate::new("gemini-1.5-flash", Some("v1beta"))
        );
        assert_eq!(config.resolver.retry_policy, RetryPolicy::NotFoundOnly);
        assert_eq!(config.resolver.timeout_ms, Some(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.scan.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert!(config.gemini.is_none());

        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", " AIzaKey \n")])).unwrap();
        assert_eq!(config.gemini.unwrap().api_key, "AIzaKey");
    }

    #[test]
    fn test_resolver_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("AURA_CANDIDATES", "gemini-2.0-flash@v1beta, gemini-pro"),
            ("AURA_DISCOVERY", "off"),
            ("AURA_TIMEOUT_MS", "0"),
            ("AURA_RETRY_POLICY", "all-errors"),
        ]))
        .unwrap();
        assert_eq!(
            config.resolver.candidates,
            vec![
                Candidate::new("gemini-2.0-flash", Some("v1beta")),
                Candidate::new("gemini-pro", None)
            ]
        );
        assert!(!config.resolver.discovery.enabled);
        assert_eq!(config.resolver.timeout_ms, None);
        assert_eq!(config.resolver.retry_policy, RetryPolicy::AllErrors);
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("AURA_TIMEOUT_MS", "soon")])),
            Err(AuraError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("AURA_RETRY_POLICY", "sometimes")])),
            Err(AuraError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("AURA_STRICT_OUTPUT", "maybe")])),
            Err(AuraError::Config(_))
        ));
    }

    #[test]
    fn test_merge_toml() {
        let resolver = ResolverConfig::default()
            .merge_toml(
                r#"
                candidates = ["gemini-2.5-flash@v1", "gemini-2.5-pro"]
                retry_policy = "all-errors"
                timeout_ms = 5000

                [discovery]
                api_versions = ["v1"]
                "#,
            )
            .unwrap();
        assert_eq!(resolver.candidates.len(), 2);
        assert_eq!(resolver.retry_policy, RetryPolicy::AllErrors);
        assert_eq!(resolver.timeout_ms, Some(5000));
        assert_eq!(resolver.discovery.api_versions, vec!["v1".to_string()]);
        assert!(resolver.discovery.enabled);
        assert_eq!(resolver.discovery.keyword, "gemini");

        assert!(matches!(
            ResolverConfig::default().merge_toml("bogus = 1"),
            Err(AuraError::TomlParse(_))
        ));
    }

    #[test]
    fn test_env_overrides_resolver_file() {
        let path = std::env::temp_dir().join(format!("auracheck-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            candidates = ["gemini-2.5-pro@v1"]
            retry_policy = "all-errors"
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = AppConfig::from_lookup(lookup(&[
            ("AURA_RESOLVER_CONFIG", path_str.as_str()),
            ("AURA_CANDIDATES", "gemini-2.5-flash@v1beta"),
            ("AURA_RETRY_POLICY", "not-found-only"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            config.resolver.candidates,
            vec![Candidate::new("gemini-2.5-flash", Some("v1beta"))]
        );
        assert_eq!(config.resolver.retry_policy, RetryPolicy::NotFoundOnly);
        // not overridden, so the file value stays
        assert_eq!(config.resolver.timeout_ms, Some(5000));
    }
}
