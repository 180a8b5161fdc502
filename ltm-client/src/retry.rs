//! Retry policy applied around a [`MemoryBackend`].
//!
//! Only [`MemoryError::BackendUnavailable`] failures are retried. Validation
//! and status errors are returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::backend::MemoryBackend;
use crate::document::{DeleteRequest, DeleteResponse, UpsertRequest, UpsertResponse};
use crate::error::{MemoryError, Result};
use crate::query::SearchRequest;

/// Attempt count and exponential backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor applied per retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new builder for constructing a [`RetryPolicy`].
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}

/// Builder for constructing a validated [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.policy.initial_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_backoff = backoff;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    /// Build the [`RetryPolicy`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Config`] if:
    /// - `max_attempts == 0`
    /// - `multiplier` is not a finite number `>= 1.0`
    /// - `initial_backoff > max_backoff`
    pub fn build(self) -> Result<RetryPolicy> {
        let policy = self.policy;
        if policy.max_attempts == 0 {
            return Err(MemoryError::Config("max_attempts must be greater than zero".to_string()));
        }
        if !policy.multiplier.is_finite() || policy.multiplier < 1.0 {
            return Err(MemoryError::Config(format!(
                "multiplier must be a finite number >= 1.0, got {}",
                policy.multiplier
            )));
        }
        if policy.initial_backoff > policy.max_backoff {
            return Err(MemoryError::Config(format!(
                "initial_backoff ({:?}) must not exceed max_backoff ({:?})",
                policy.initial_backoff, policy.max_backoff
            )));
        }
        Ok(policy)
    }
}

/// Wraps a backend and retries transport failures per a [`RetryPolicy`].
///
/// # Example
///
/// ```rust,ignore
/// use ltm_client::{HttpMemoryBackend, RetryPolicy, RetryingBackend};
///
/// let backend = RetryingBackend::new(HttpMemoryBackend::from_env()?, RetryPolicy::default());
/// ```
#[derive(Debug, Clone)]
pub struct RetryingBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: MemoryBackend> RetryingBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    async fn run<T, F, Fut>(&self, endpoint: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    warn!(
                        endpoint,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying memory backend call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<B: MemoryBackend> MemoryBackend for RetryingBackend<B> {
    async fn query(&self, request: &SearchRequest) -> Result<Value> {
        self.run("query", || self.inner.query(request)).await
    }

    async fn upsert(&self, request: &UpsertRequest) -> Result<UpsertResponse> {
        self.run("upsert", || self.inner.upsert(request)).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse> {
        self.run("delete", || self.inner.delete(request)).await
    }
}
