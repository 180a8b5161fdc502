//! Per-request trace identifiers carried as task-local context.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

/// Header used to receive and forward trace identifiers.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

tokio::task_local! {
    static CURRENT_TRACE_ID: TraceId;
}

/// Identifier correlating log lines and outbound calls for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse an incoming header value, or generate one when it is missing or blank.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Self(v.to_string()),
            None => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier of the enclosing [`scope`](TraceId::scope), if any.
    pub fn current() -> Option<TraceId> {
        CURRENT_TRACE_ID.try_with(Clone::clone).ok()
    }

    /// Run `fut` with this identifier as the current trace id.
    ///
    /// Events emitted inside the future are recorded under a `trace` span
    /// carrying the `trace_id` field.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        let span = tracing::info_span!("trace", trace_id = %self);
        CURRENT_TRACE_ID.scope(self, fut.instrument(span)).await
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_header_keeps_incoming_value() {
        let id = TraceId::from_header(Some("  abc-123 "));
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn from_header_generates_when_missing_or_blank() {
        let generated = TraceId::from_header(None);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());

        let blank = TraceId::from_header(Some("   "));
        assert!(Uuid::parse_str(blank.as_str()).is_ok());
        assert_ne!(generated, blank);
    }

    #[tokio::test]
    async fn current_is_visible_only_inside_scope() {
        assert!(TraceId::current().is_none());

        let id = TraceId::from("req-1".to_string());
        let seen = id.clone().scope(async { TraceId::current() }).await;
        assert_eq!(seen, Some(id));

        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn nested_scope_shadows_outer() {
        let outer = TraceId::from("outer".to_string());
        let inner = TraceId::from("inner".to_string());

        let (in_inner, after_inner) = outer
            .scope(async {
                let in_inner = inner.scope(async { TraceId::current() }).await;
                (in_inner, TraceId::current())
            })
            .await;

        assert_eq!(in_inner.unwrap().as_str(), "inner");
        assert_eq!(after_inner.unwrap().as_str(), "outer");
    }
}
