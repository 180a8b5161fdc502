//! Query-path data model: filters, queries, and scored result chunks.
//!
//! Optional fields are plain [`Option`]s that are skipped when `None`, so a
//! serialized payload contains exactly the fields a caller set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default `top_k` for a sub-query when the caller does not pick one.
pub const DEFAULT_SUB_QUERY_TOP_K: usize = 3;

fn default_top_k() -> usize {
    DEFAULT_SUB_QUERY_TOP_K
}

/// Metadata constraints that narrow a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl SearchFilter {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.document_id.is_none()
            && self.source.is_none()
            && self.source_id.is_none()
            && self.reference.is_none()
            && self.doc_type.is_none()
    }
}

/// One sub-question sent to the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "query")]
    pub query_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl SearchQuery {
    /// A query with no filter and the default `top_k` of 3.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self { query_text: query_text.into(), filter: None, top_k: DEFAULT_SUB_QUERY_TOP_K }
    }

    /// Attach a filter. An empty filter is dropped so it is not serialized as `{}`.
    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A batch of sub-queries submitted in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub queries: Vec<SearchQuery>,
}

impl SearchRequest {
    /// A request holding exactly one query.
    pub fn single(query: SearchQuery) -> Self {
        Self { queries: vec![query] }
    }

    /// A request holding the given queries in order.
    pub fn from_queries(queries: impl IntoIterator<Item = SearchQuery>) -> Self {
        Self { queries: queries.into_iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Metadata stored alongside a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A retrieved fragment of stored text with its relevance score.
///
/// Scores are produced by the backend's embedding space (observed range
/// roughly 0 to 1, higher is more relevant). They are only comparable between
/// chunks returned by the same backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ResultChunk {
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            id: None,
            text: text.into(),
            score,
            metadata: ChunkMetadata::default(),
            embedding: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Shorthand for `metadata.document_id`.
    pub fn document_id(&self) -> Option<&str> {
        self.metadata.document_id.as_deref()
    }
}

/// Results for one sub-query, in backend order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "query")]
    pub query_text: String,
    #[serde(default)]
    pub results: Vec<ResultChunk>,
}

/// Results for every sub-query of a [`SearchRequest`], positionally aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<QueryResult>,
}

impl SearchResponse {
    /// Parse a raw success body from the search endpoint.
    ///
    /// Error/detail documents, and anything else that is not a results
    /// document, become an empty response so callers have a single success
    /// path for "service error" and "no matches".
    pub fn from_payload(payload: Value) -> Self {
        if payload.get("detail").is_some() {
            return Self::default();
        }
        serde_json::from_value(payload).unwrap_or_default()
    }

    /// Number of per-query result sets.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Every chunk, in sub-query order then backend order.
    pub fn chunks(&self) -> impl Iterator<Item = &ResultChunk> {
        self.results.iter().flat_map(|r| r.results.iter())
    }

    /// Consume the response into its chunks, in the same order as [`chunks`](Self::chunks).
    pub fn into_chunks(self) -> Vec<ResultChunk> {
        self.results.into_iter().flat_map(|r| r.results).collect()
    }
}
