//! # ltm-search
//!
//! Searches long-term memory and shapes the results for callers.
//!
//! ## Overview
//!
//! - [`SearchCriteria`] / [`build_query_payload`] turn caller input into a
//!   [`SearchRequest`](ltm_client::SearchRequest).
//! - [`MemorySearchAggregator`] submits it through a
//!   [`MemoryBackend`](ltm_client::MemoryBackend) and parses the result.
//! - [`rank_above_threshold`], [`dedupe_by_document`] and
//!   [`concatenate_with_provenance`] shape results for display or an LLM prompt.
//! - [`upsert_information`] and [`forget`] cover the write path.
//!
//! Ranking pools chunks from every sub-query and compares their scores
//! directly. This assumes all sub-queries hit the same embedding space.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ltm_client::{HttpMemoryBackend, RetryPolicy, RetryingBackend};
//! use ltm_search::{MemorySearchAggregator, SearchCriteria, dedupe_by_document};
//!
//! let backend = RetryingBackend::new(HttpMemoryBackend::from_env()?, RetryPolicy::default());
//! let aggregator = MemorySearchAggregator::new(backend);
//!
//! let criteria = SearchCriteria::new("refund policy").user_id("u1").k(5);
//! let chunks = aggregator.query_information(&criteria, Some(0.3)).await?.into_chunks();
//! let payload = serde_json::to_string(&dedupe_by_document(&chunks))?;
//! ```

pub mod aggregator;
pub mod criteria;
pub mod operations;
pub mod ranking;

pub use aggregator::{MemorySearchAggregator, QUERY_INFORMATION_LIMIT, QueryOutcome};
pub use criteria::{
    DEFAULT_SIMPLE_K, DEFAULT_TOP_RESULTS_THRESHOLD, SearchCriteria, build_query_payload,
    normalize_query_text,
};
pub use ltm_client::{MemoryError, Result};
pub use operations::{DEFAULT_SOURCE, MemoryRecord, forget, upsert_information};
pub use ranking::{
    DocumentSummary, UNKNOWN_CREATED_AT, concatenate_with_provenance, dedupe_by_document,
    rank_above_threshold,
};
