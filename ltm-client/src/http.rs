//! HTTP implementation of [`MemoryBackend`] using `reqwest`.

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use ltm_telemetry::{TRACE_ID_HEADER, TraceId};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::backend::MemoryBackend;
use crate::config::ClientConfig;
use crate::document::{DeleteRequest, DeleteResponse, UpsertRequest, UpsertResponse};
use crate::error::{MemoryError, Result};
use crate::query::SearchRequest;
use crate::validation::HttpValidationError;

const QUERY_ENDPOINT: &str = "query";
const UPSERT_ENDPOINT: &str = "upsert";
const DELETE_ENDPOINT: &str = "delete";

/// A [`MemoryBackend`] that talks to the service over HTTP.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use ltm_client::{ClientConfig, HttpMemoryBackend};
///
/// let config = ClientConfig::builder().base_url("https://memory.internal").token("t0k3n").build()?;
/// let backend = HttpMemoryBackend::new(config)?;
/// ```
#[derive(Clone)]
pub struct HttpMemoryBackend {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl fmt::Debug for HttpMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMemoryBackend")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpMemoryBackend {
    /// Build a backend from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.endpoint_base()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| MemoryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url, token: config.token })
    }

    /// Build a backend from `LTM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send<B>(
        &self,
        method: Method,
        endpoint: &'static str,
        body: &B,
    ) -> Result<(StatusCode, Value)>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.base_url.join(endpoint).map_err(|e| {
            MemoryError::Config(format!("failed to build URL for '{endpoint}': {e}"))
        })?;
        let payload = serde_json::to_vec(body)?;

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(trace_id) = TraceId::current() {
            match HeaderValue::from_str(trace_id.as_str()) {
                Ok(value) => request = request.header(TRACE_ID_HEADER, value),
                Err(_) => warn!(
                    endpoint,
                    trace_id = ?trace_id.as_str(),
                    "trace id is not a valid header value, not forwarding it"
                ),
            }
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "memory backend request failed");
            classify_send_error(endpoint, &e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(endpoint, status = status.as_u16(), error = %e, "failed to read memory backend response");
            MemoryError::BackendUnavailable { message: describe_transport_error(endpoint, &e) }
        })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), elapsed_ms, "memory backend call completed");
        } else {
            warn!(endpoint, status = status.as_u16(), elapsed_ms, "memory backend returned an error status");
        }

        classify_response(status, body).map(|value| (status, value))
    }

    async fn send_typed<B, T>(&self, method: Method, endpoint: &'static str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let (status, value) = self.send(method, endpoint, body).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            warn!(endpoint, error = %e, "memory backend returned an unexpected document");
            MemoryError::UnexpectedBackendResponse { status: status.as_u16(), body: value.to_string() }
        })
    }
}

/// Map a status and raw body onto the error taxonomy.
///
/// - success with a JSON body → the parsed document
/// - any failure status whose body is a validation document → [`MemoryError::ValidationRejected`]
/// - everything else → [`MemoryError::UnexpectedBackendResponse`]
pub(crate) fn classify_response(status: StatusCode, body: String) -> Result<Value> {
    if !status.is_success() {
        if let Ok(validation) = serde_json::from_str::<HttpValidationError>(&body) {
            return Err(MemoryError::ValidationRejected {
                status: status.as_u16(),
                detail: validation.detail,
            });
        }
        return Err(MemoryError::UnexpectedBackendResponse { status: status.as_u16(), body });
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) => Err(MemoryError::UnexpectedBackendResponse { status: status.as_u16(), body }),
    }
}

/// Requests that could not be built never reached the service; only the rest
/// count as transport failures.
fn classify_send_error(endpoint: &str, err: &reqwest::Error) -> MemoryError {
    if err.is_builder() {
        return MemoryError::Config(format!("failed to build request for '{endpoint}': {err}"));
    }
    MemoryError::BackendUnavailable { message: describe_transport_error(endpoint, err) }
}

fn describe_transport_error(endpoint: &str, err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request to '{endpoint}' timed out")
    } else if err.is_connect() {
        format!("could not connect for '{endpoint}': {err}")
    } else {
        format!("request to '{endpoint}' failed: {err}")
    }
}

#[async_trait]
impl MemoryBackend for HttpMemoryBackend {
    async fn query(&self, request: &SearchRequest) -> Result<Value> {
        debug!(query_count = request.len(), "querying long-term memory");
        let (_, payload) = self.send(Method::POST, QUERY_ENDPOINT, request).await?;
        Ok(payload)
    }

    async fn upsert(&self, request: &UpsertRequest) -> Result<UpsertResponse> {
        debug!(document_count = request.documents.len(), "upserting into long-term memory");
        self.send_typed(Method::POST, UPSERT_ENDPOINT, request).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse> {
        debug!(delete_all = ?request.delete_all, "deleting from long-term memory");
        self.send_typed(Method::DELETE, DELETE_ENDPOINT, request).await
    }
}
