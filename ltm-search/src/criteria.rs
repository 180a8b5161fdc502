//! Caller-facing search criteria and query payload construction.

use ltm_client::{DEFAULT_SUB_QUERY_TOP_K, SearchFilter, SearchQuery, SearchRequest};

/// Result count for a plain [`SearchCriteria::new`] search.
pub const DEFAULT_SIMPLE_K: usize = 10;

/// Threshold used by [`MemorySearchAggregator::query_top_results`](crate::MemorySearchAggregator::query_top_results)
/// callers that have no better value.
pub const DEFAULT_TOP_RESULTS_THRESHOLD: f64 = 0.3;

/// Free-text query plus optional metadata constraints and a result count.
///
/// # Example
///
/// ```rust
/// use ltm_search::{SearchCriteria, build_query_payload};
///
/// let criteria = SearchCriteria::new("refund_policy").user_id("u1").k(5);
/// let request = build_query_payload(&criteria);
/// assert_eq!(request.queries[0].query_text, "refund policy");
/// assert_eq!(request.queries[0].top_k, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub query: String,
    pub filter: SearchFilter,
    pub k: usize,
}

impl SearchCriteria {
    /// Criteria for the simple path, `k` = 10.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), filter: SearchFilter::default(), k: DEFAULT_SIMPLE_K }
    }

    /// Criteria for the top-results path, `k` = 3.
    pub fn top_results(query: impl Into<String>) -> Self {
        Self { k: DEFAULT_SUB_QUERY_TOP_K, ..Self::new(query) }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.filter.user_id = Some(user_id.into());
        self
    }

    pub fn document_id(mut self, document_id: impl Into<String>) -> Self {
        self.filter.document_id = Some(document_id.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.filter.source = Some(source.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.filter.source_id = Some(source_id.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.filter.reference = Some(reference.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.filter.doc_type = Some(doc_type.into());
        self
    }

    /// Replace every filter field at once.
    pub fn filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// The single sub-query these criteria describe.
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery::new(normalize_query_text(&self.query))
            .with_filter(self.filter.clone())
            .with_top_k(self.k)
    }
}

/// Replace underscores with spaces and trim, so identifier-like input reads as text.
pub fn normalize_query_text(text: &str) -> String {
    text.replace('_', " ").trim().to_string()
}

/// Build a one-query [`SearchRequest`] from caller criteria. No I/O.
///
/// Only filter fields that were explicitly set are serialized; when none
/// were set the `filter` key is omitted.
pub fn build_query_payload(criteria: &SearchCriteria) -> SearchRequest {
    SearchRequest::single(criteria.to_query())
}
