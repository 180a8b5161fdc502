//! # ltm-client
//!
//! Typed client for the long-term memory service: a vector store exposing
//! `POST /query`, `POST /upsert` and `DELETE /delete`.
//!
//! ## Overview
//!
//! - [`query`] / [`document`]: wire types. Unset optional fields are omitted
//!   from serialized payloads.
//! - [`MemoryBackend`]: the service capability, one method per endpoint.
//! - [`HttpMemoryBackend`]: `reqwest` implementation configured by [`ClientConfig`].
//! - [`RetryingBackend`]: retries transport failures per a [`RetryPolicy`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ltm_client::{
//!     ClientConfig, HttpMemoryBackend, MemoryBackend, RetryPolicy, RetryingBackend,
//!     SearchQuery, SearchRequest, SearchResponse,
//! };
//!
//! let config = ClientConfig::builder()
//!     .base_url("https://memory.internal")
//!     .token(std::env::var("LTM_TOKEN")?)
//!     .build()?;
//! let backend = RetryingBackend::new(HttpMemoryBackend::new(config)?, RetryPolicy::default());
//!
//! let request = SearchRequest::single(SearchQuery::new("refund policy").with_top_k(5));
//! let response = SearchResponse::from_payload(backend.query(&request).await?);
//! ```

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod query;
pub mod retry;
pub mod validation;

pub use backend::MemoryBackend;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::{
    DeleteRequest, DeleteResponse, Document, DocumentMetadata, UpsertRequest, UpsertResponse,
};
pub use error::{MemoryError, Result};
pub use http::HttpMemoryBackend;
pub use query::{
    ChunkMetadata, DEFAULT_SUB_QUERY_TOP_K, QueryResult, ResultChunk, SearchFilter, SearchQuery,
    SearchRequest, SearchResponse,
};
pub use retry::{RetryPolicy, RetryPolicyBuilder, RetryingBackend};
pub use validation::{HttpValidationError, ValidationErrorItem};
