//! The search aggregator: criteria in, parsed and ranked results out.

use std::fmt;
use std::sync::Arc;

use ltm_client::{MemoryBackend, Result, ResultChunk, SearchRequest, SearchResponse};

use crate::criteria::{SearchCriteria, build_query_payload};
use crate::ranking::rank_above_threshold;

/// Ranked-result cap for [`MemorySearchAggregator::query_information`].
pub const QUERY_INFORMATION_LIMIT: usize = 100;

/// What [`MemorySearchAggregator::query_information`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// No threshold was given: the parsed response, untouched.
    Response(SearchResponse),
    /// A threshold was given: pooled chunks above it, best first.
    Ranked(Vec<ResultChunk>),
}

impl QueryOutcome {
    /// Every chunk, ranked order for [`Ranked`](Self::Ranked), response order otherwise.
    pub fn into_chunks(self) -> Vec<ResultChunk> {
        match self {
            Self::Response(response) => response.into_chunks(),
            Self::Ranked(chunks) => chunks,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Response(response) => response.chunks().next().is_none(),
            Self::Ranked(chunks) => chunks.is_empty(),
        }
    }
}

/// Builds queries, submits them to a [`MemoryBackend`] and ranks the results.
///
/// Holds no per-call state, so one instance can be shared across tasks.
/// Errors from the backend are returned as-is: the aggregator neither logs
/// nor retries. Wrap the backend in a
/// [`RetryingBackend`](ltm_client::RetryingBackend) for retries.
///
/// # Example
///
/// ```rust,ignore
/// use ltm_client::{HttpMemoryBackend, RetryPolicy, RetryingBackend};
/// use ltm_search::{MemorySearchAggregator, SearchCriteria};
///
/// let backend = RetryingBackend::new(HttpMemoryBackend::from_env()?, RetryPolicy::default());
/// let aggregator = MemorySearchAggregator::new(backend);
///
/// let criteria = SearchCriteria::top_results("refund policy").user_id("u1");
/// let chunks = aggregator.query_top_results(&criteria, 0.3).await?;
/// ```
#[derive(Clone)]
pub struct MemorySearchAggregator {
    backend: Arc<dyn MemoryBackend>,
}

impl fmt::Debug for MemorySearchAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySearchAggregator").finish_non_exhaustive()
    }
}

impl MemorySearchAggregator {
    pub fn new(backend: impl MemoryBackend + 'static) -> Self {
        Self { backend: Arc::new(backend) }
    }

    /// Use an already shared backend.
    pub fn from_shared(backend: Arc<dyn MemoryBackend>) -> Self {
        Self { backend }
    }

    /// Return a reference to the backend, e.g. for the write-path operations.
    pub fn backend(&self) -> &Arc<dyn MemoryBackend> {
        &self.backend
    }

    /// Submit `request` and parse the payload.
    ///
    /// A detail/error document is normalized to an empty [`SearchResponse`].
    ///
    /// # Errors
    ///
    /// Returns whatever the backend returns: `BackendUnavailable`,
    /// `ValidationRejected` or `UnexpectedBackendResponse`.
    pub async fn execute_search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let payload = self.backend.query(request).await?;
        Ok(SearchResponse::from_payload(payload))
    }

    /// [`build_query_payload`] followed by [`execute_search`](Self::execute_search).
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResponse> {
        self.execute_search(&build_query_payload(criteria)).await
    }

    /// Search, then rank when a threshold is given.
    ///
    /// With `threshold = None` the parsed response is returned unchanged.
    /// Otherwise chunks scoring strictly above it are returned best first,
    /// at most [`QUERY_INFORMATION_LIMIT`].
    pub async fn query_information(
        &self,
        criteria: &SearchCriteria,
        threshold: Option<f64>,
    ) -> Result<QueryOutcome> {
        let response = self.search(criteria).await?;
        Ok(match threshold {
            None => QueryOutcome::Response(response),
            Some(threshold) => {
                QueryOutcome::Ranked(rank_above_threshold(&response, threshold, QUERY_INFORMATION_LIMIT))
            }
        })
    }

    /// Search and keep at most `criteria.k` chunks scoring above `threshold`.
    ///
    /// [`SearchCriteria::top_results`] and
    /// [`DEFAULT_TOP_RESULTS_THRESHOLD`](crate::DEFAULT_TOP_RESULTS_THRESHOLD)
    /// give the usual defaults (3 results above 0.3).
    pub async fn query_top_results(
        &self,
        criteria: &SearchCriteria,
        threshold: f64,
    ) -> Result<Vec<ResultChunk>> {
        let response = self.search(criteria).await?;
        Ok(rank_above_threshold(&response, threshold, criteria.k))
    }
}
