//! Error types for the `ltm-telemetry` crate.

use thiserror::Error;

/// Errors that can occur while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// The directive that failed to parse.
        directive: String,
        /// A description of the failure.
        message: String,
    },

    /// Another global subscriber was installed outside this crate.
    #[error("Global subscriber already installed: {0}")]
    SubscriberInstalled(String),
}

/// A convenience result type for telemetry setup.
pub type Result<T> = std::result::Result<T, TelemetryError>;
