// src/resolver.rs
//! Candidate walk against the generative provider.
//!
//! Candidates are tried strictly in order, one call in flight at a time.
//! When every static candidate is rejected as unknown or forbidden, one
//! discovery round lists the provider's models and the best match is tried
//! once. Each call races a timeout and the service cancellation token; the
//! losing call is dropped, which aborts its HTTP request.

use serde::Deserialize;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{DiscoveryConfig, ResolverConfig};
use crate::errors::{AuraError, FailureClass, Result};
use crate::models::{Candidate, GenerationRequest, ModelInfo};
use crate::providers::GenerativeProvider;

/// Which failures move the resolver on to the next candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Any failure moves on.
    AllErrors,
    /// Only unknown/forbidden model, unavailable and timeout failures move
    /// on. Quota and everything else abort the walk.
    #[default]
    NotFoundOnly,
}

impl RetryPolicy {
    pub fn should_retry(self, class: FailureClass) -> bool {
        match self {
            RetryPolicy::AllErrors => true,
            RetryPolicy::NotFoundOnly => matches!(
                class,
                FailureClass::NotFound | FailureClass::Unavailable | FailureClass::Timeout
            ),
        }
    }
}

impl FromStr for RetryPolicy {
    type Err = AuraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-errors" | "all" => Ok(RetryPolicy::AllErrors),
            "not-found-only" | "not-found" => Ok(RetryPolicy::NotFoundOnly),
            other => Err(AuraError::Config(format!(
                "Unknown retry policy '{}' (expected 'all-errors' or 'not-found-only')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure { status: Option<u16>, message: String },
}

/// One candidate tried during a resolution.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub candidate: Candidate,
    pub discovered: bool,
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub text: String,
    pub candidate: Candidate,
    pub attempts: Vec<Attempt>,
}

pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.timeout_ms.map(Duration::from_millis)
    }

    /// Returns the first non-empty completion, or the last failure seen.
    pub async fn resolve(
        &self,
        provider: &dyn GenerativeProvider,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let mut attempts = Vec::new();
        let mut last_error: Option<AuraError> = None;
        let mut all_not_found = true;

        for candidate in &self.config.candidates {
            match self.attempt(provider, candidate, request, cancel, false, &mut attempts).await {
                Ok(text) => {
                    return Ok(Resolution { text, candidate: candidate.clone(), attempts });
                }
                Err(AuraError::Cancelled) => return Err(AuraError::Cancelled),
                Err(e) => {
                    let class = e.class();
                    if class != FailureClass::NotFound {
                        all_not_found = false;
                    }
                    if !self.config.retry_policy.should_retry(class) {
                        log::warn!(
                            "⛔ {} failed with {:?}, not retrying: {}",
                            candidate,
                            class,
                            e
                        );
                        return Err(e);
                    }
                    log::warn!("⚠️  {} failed ({:?}): {}", candidate, class, e);
                    last_error = Some(e);
                }
            }
        }

        if self.config.discovery.enabled && all_not_found {
            match self.discover(provider, cancel).await? {
                Some(candidate) => {
                    log::info!("🔭 Discovery picked {}", candidate);
                    let outcome = self
                        .attempt(provider, &candidate, request, cancel, true, &mut attempts)
                        .await;
                    match outcome {
                        Ok(text) => return Ok(Resolution { text, candidate, attempts }),
                        Err(AuraError::Cancelled) => return Err(AuraError::Cancelled),
                        Err(e) => {
                            log::error!("❌ Discovered model {} failed: {}", candidate, e);
                            last_error = Some(e);
                        }
                    }
                }
                None => log::error!("❌ Discovery found no compatible model"),
            }
        }

        log::error!("❌ All {} attempts failed", attempts.len());
        Err(last_error.unwrap_or(AuraError::NoCandidates))
    }

    async fn attempt(
        &self,
        provider: &dyn GenerativeProvider,
        candidate: &Candidate,
        request: &GenerationRequest,
        cancel: &CancellationToken,
        discovered: bool,
        attempts: &mut Vec<Attempt>,
    ) -> Result<String> {
        let start = Instant::now();
        let result = self
            .guarded(candidate.to_string(), provider.generate(candidate, request), cancel)
            .await;

        let outcome = match &result {
            Ok(_) => AttemptOutcome::Success,
            Err(e) => AttemptOutcome::Failure {
                status: e.provider_status(),
                message: e.to_string(),
            },
        };
        attempts.push(Attempt {
            candidate: candidate.clone(),
            discovered,
            outcome,
            latency_ms: start.elapsed().as_millis() as u64,
        });
        result
    }

    /// Races `call` against the per-attempt timeout and `cancel`.
    pub async fn guarded<T, F>(
        &self,
        target: String,
        call: F,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        bounded(target, self.timeout(), call, cancel).await
    }

    /// Lists models through the configured versions and picks the best match.
    /// Only cancellation is propagated; listing failures just yield `None`.
    async fn discover(
        &self,
        provider: &dyn GenerativeProvider,
        cancel: &CancellationToken,
    ) -> Result<Option<Candidate>> {
        log::info!("🔭 Discovery: listing available models");

        for version in &self.config.discovery.api_versions {
            let target = format!("list models ({})", version);
            match self.guarded(target, provider.list_models(version), cancel).await {
                Ok(models) => return Ok(best_match(&models, version, &self.config)),
                Err(AuraError::Cancelled) => return Err(AuraError::Cancelled),
                Err(e) => log::warn!("⚠️  Discovery failed ({}): {}", version, e),
            }
        }
        Ok(None)
    }
}

/// Runs `call` under an optional deadline and the cancellation token.
/// The losing future is dropped.
pub async fn bounded<T, F>(
    target: String,
    timeout: Option<Duration>,
    call: F,
    cancel: &CancellationToken,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    // cancellation wins over a call that is already done
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuraError::Cancelled),
        result = call => result,
        _ = deadline => Err(AuraError::Timeout {
            target,
            timeout_ms: timeout.map_or(0, |t| t.as_millis() as u64),
        }),
    }
}

/// First listed model equal to a candidate model (candidate order wins),
/// else the first one containing the discovery keyword.
pub fn best_match(
    models: &[ModelInfo],
    api_version: &str,
    config: &ResolverConfig,
) -> Option<Candidate> {
    let available: Vec<&str> = models
        .iter()
        .filter(|m| m.can_generate())
        .map(ModelInfo::short_name)
        .collect();

    log::info!("Available models: {}", available.join(", "));

    let DiscoveryConfig { keyword, .. } = &config.discovery;
    config
        .candidates
        .iter()
        .find(|c| available.contains(&c.model.as_str()))
        .map(|c| c.model.as_str())
        .or_else(|| available.iter().copied().find(|name| name.contains(keyword.as_str())))
        .map(|name| Candidate::new(name, Some(api_version)))
}
