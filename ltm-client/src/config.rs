//! Configuration for the HTTP memory client.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MemoryError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("ltm-client/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the service base URL.
pub const ENV_BASE_URL: &str = "LTM_BASE_URL";
/// Environment variable holding the bearer token.
pub const ENV_TOKEN: &str = "LTM_TOKEN";
/// Environment variable overriding the timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "LTM_TIMEOUT_SECS";
/// Environment variable toggling TLS certificate verification.
pub const ENV_VERIFY_TLS: &str = "LTM_VERIFY_TLS";

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_verify_tls() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Connection settings for [`HttpMemoryBackend`](crate::HttpMemoryBackend).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service; endpoint paths are joined onto it.
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Verify the server certificate. Disable only for self-signed test deployments.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Default settings for the given base URL. Call [`validate`](Self::validate)
    /// or use the [builder](Self::builder) to check it.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: default_verify_tls(),
            user_agent: default_user_agent(),
        }
    }

    /// Create a new builder for constructing a [`ClientConfig`].
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read settings from `LTM_BASE_URL`, `LTM_TOKEN`, `LTM_TIMEOUT_SECS` and `LTM_VERIFY_TLS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL).ok_or_else(|| {
            MemoryError::Config(format!("{ENV_BASE_URL} environment variable not set"))
        })?;

        let mut builder = Self::builder().base_url(base_url);
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            builder = builder.token(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                MemoryError::Config(format!("{ENV_TIMEOUT_SECS} must be an integer, got '{raw}'"))
            })?;
            builder = builder.timeout_secs(secs);
        }
        if let Some(raw) = lookup(ENV_VERIFY_TLS) {
            builder = builder.verify_tls(parse_bool(ENV_VERIFY_TLS, &raw)?);
        }
        builder.build()
    }

    /// Check that the base URL is an absolute http(s) URL, the timeout is
    /// non-zero and the token fits in an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.endpoint_base()?;
        if self.timeout_secs == 0 {
            return Err(MemoryError::Config("timeout_secs must be greater than zero".to_string()));
        }
        if let Some(token) = &self.token {
            if HeaderValue::from_str(&format!("Bearer {token}")).is_err() {
                return Err(MemoryError::Config(
                    "token contains characters not allowed in an HTTP header".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The base URL with a trailing slash, ready for [`Url::join`].
    pub fn endpoint_base(&self) -> Result<Url> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(MemoryError::Config("base_url must not be empty".to_string()));
        }
        let mut url = Url::parse(trimmed)
            .map_err(|e| MemoryError::Config(format!("invalid base_url '{trimmed}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MemoryError::Config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MemoryError::Config(format!("{name} must be a boolean, got '{raw}'"))),
    }
}

/// Builder for constructing a validated [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self { config: ClientConfig::new(String::new()) }
    }
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the [`ClientConfig`], validating it first.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Config`] if:
    /// - `base_url` is empty, unparseable, or not http(s)
    /// - `timeout_secs == 0`
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
