//! The memory service capability, one method per endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{DeleteRequest, DeleteResponse, UpsertRequest, UpsertResponse};
use crate::error::Result;
use crate::query::SearchRequest;

/// A long-term memory service.
///
/// [`HttpMemoryBackend`](crate::HttpMemoryBackend) is the production
/// implementation; tests substitute in-process fakes.
///
/// # Example
///
/// ```rust,ignore
/// use ltm_client::{MemoryBackend, SearchQuery, SearchRequest, SearchResponse};
///
/// let payload = backend.query(&SearchRequest::single(SearchQuery::new("refund policy"))).await?;
/// let response = SearchResponse::from_payload(payload);
/// ```
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Run a batch of searches.
    ///
    /// Returns the raw success document. Parsing is left to the caller so an
    /// error/detail document can be normalized instead of rejected.
    async fn query(&self, request: &SearchRequest) -> Result<Value>;

    /// Store documents, returning their ids.
    async fn upsert(&self, request: &UpsertRequest) -> Result<UpsertResponse>;

    /// Remove documents.
    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse>;
}

#[async_trait]
impl<B: MemoryBackend + ?Sized> MemoryBackend for Arc<B> {
    async fn query(&self, request: &SearchRequest) -> Result<Value> {
        (**self).query(request).await
    }

    async fn upsert(&self, request: &UpsertRequest) -> Result<UpsertResponse> {
        (**self).upsert(request).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse> {
        (**self).delete(request).await
    }
}
