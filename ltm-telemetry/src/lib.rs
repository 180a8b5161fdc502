//! # ltm-telemetry
//!
//! Logging setup and trace-id propagation shared by the long-term memory crates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ltm_telemetry::{TraceId, init_telemetry};
//!
//! init_telemetry("memory-service")?;
//!
//! let trace_id = TraceId::from_header(incoming.headers().get("x-trace-id"));
//! trace_id.scope(async { handle(incoming).await }).await;
//! ```

mod error;
mod init;
mod trace_id;

pub use error::{Result, TelemetryError};
pub use init::{LogFormat, TelemetryConfig, init_telemetry, init_with_config};
pub use trace_id::{TRACE_ID_HEADER, TraceId};

// Re-export the tracing macros so dependents log through one import path.
pub use tracing::{Span, debug, error, info, instrument, trace, warn};
