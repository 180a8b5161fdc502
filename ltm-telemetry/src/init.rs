//! Global subscriber installation.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Settings for [`init_with_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Name recorded on the startup event.
    pub service_name: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset or unparseable.
    #[serde(default = "default_directive")]
    pub default_directive: String,
    /// Whether to print the event target (module path).
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_directive() -> String {
    "info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl TelemetryConfig {
    /// Pretty output at `info` for the given service.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            format: LogFormat::default(),
            default_directive: default_directive(),
            with_target: default_with_target(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fallback filter directive (e.g. `"ltm_client=debug,info"`).
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// Toggle printing of event targets.
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Build the filter: `RUST_LOG` first, then the configured default.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new(&self.default_directive).map_err(|e| TelemetryError::InvalidFilter {
                directive: self.default_directive.clone(),
                message: e.to_string(),
            })
        })
    }
}

/// Install pretty console logging for `service_name`.
///
/// Calling this more than once is a no-op.
pub fn init_telemetry(service_name: &str) -> Result<()> {
    init_with_config(TelemetryConfig::new(service_name))
}

/// Install the global subscriber described by `config`.
///
/// Only the first successful call installs anything; later calls return `Ok(())`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the default directive does not
/// parse, or [`TelemetryError::SubscriberInstalled`] if some other code already
/// installed a global subscriber.
pub fn init_with_config(config: TelemetryConfig) -> Result<()> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if *installed {
        return Ok(());
    }

    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let outcome = match config.format {
        LogFormat::Pretty => {
            registry.with(fmt::layer().with_target(config.with_target)).try_init()
        }
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_target(config.with_target)).try_init()
        }
    };
    outcome.map_err(|e| TelemetryError::SubscriberInstalled(e.to_string()))?;

    *installed = true;
    info!(service.name = %config.service_name, format = ?config.format, "telemetry initialized");
    Ok(())
}
