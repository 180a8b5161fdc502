//! Ranking, dedup and text assembly over search results.
//!
//! Chunks from every sub-query are pooled before ranking, so scores are
//! compared across sub-queries. That is only meaningful while all of them
//! come from the same backend embedding space.

use std::collections::HashSet;

use ltm_client::{ResultChunk, SearchResponse};
use serde::{Deserialize, Serialize};

/// Rendered in place of a missing `created_at`.
pub const UNKNOWN_CREATED_AT: &str = "unknown";

/// One record per distinct document, as handed to an LLM prompt.
///
/// Missing metadata serializes as `null` so every record has the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: Option<String>,
    pub text: String,
    pub created_at: Option<String>,
    pub source_id: Option<String>,
    pub doc_type: Option<String>,
    pub score: f64,
}

impl From<&ResultChunk> for DocumentSummary {
    fn from(chunk: &ResultChunk) -> Self {
        Self {
            document_id: chunk.metadata.document_id.clone(),
            text: chunk.text.clone(),
            created_at: chunk.metadata.created_at.clone(),
            source_id: chunk.metadata.source_id.clone(),
            doc_type: chunk.metadata.doc_type.clone(),
            score: chunk.score,
        }
    }
}

fn by_score_descending(a: &ResultChunk, b: &ResultChunk) -> std::cmp::Ordering {
    b.score.total_cmp(&a.score)
}

/// Pool every chunk, keep those scoring strictly above `threshold`, sort by
/// score descending and keep the first `limit`.
///
/// The sort is stable: equal scores keep sub-query order, then backend order.
pub fn rank_above_threshold(
    response: &SearchResponse,
    threshold: f64,
    limit: usize,
) -> Vec<ResultChunk> {
    let mut ranked: Vec<ResultChunk> =
        response.chunks().filter(|chunk| chunk.score > threshold).cloned().collect();
    ranked.sort_by(by_score_descending);
    ranked.truncate(limit);
    ranked
}

/// Keep the highest-scoring chunk of each document, in score-descending order.
///
/// Chunks without a document id (or with an empty one) are never merged.
/// Chunks with a NaN score are dropped, as in [`rank_above_threshold`].
pub fn dedupe_by_document(results: &[ResultChunk]) -> Vec<DocumentSummary> {
    let mut ordered: Vec<&ResultChunk> = results.iter().filter(|c| !c.score.is_nan()).collect();
    ordered.sort_by(|a, b| by_score_descending(a, b));

    let mut seen = HashSet::new();
    let mut summaries = Vec::new();
    for chunk in ordered {
        if let Some(id) = chunk.document_id().filter(|id| !id.is_empty()) {
            if !seen.insert(id) {
                continue;
            }
        }
        summaries.push(DocumentSummary::from(chunk));
    }
    summaries
}

/// Join chunk texts, ordered by id, each followed by its storage time.
///
/// ```rust
/// use ltm_client::{ChunkMetadata, ResultChunk};
/// use ltm_search::concatenate_with_provenance;
///
/// let chunk = ResultChunk::new("Prefers email.", 0.8).with_id("a").with_metadata(ChunkMetadata {
///     created_at: Some("2024-03-01".into()),
///     ..Default::default()
/// });
/// assert_eq!(concatenate_with_provenance(&[chunk]), "Prefers email.   Stored at 2024-03-01");
/// ```
pub fn concatenate_with_provenance(results: &[ResultChunk]) -> String {
    let mut ordered: Vec<&ResultChunk> = results.iter().collect();
    ordered.sort_by(|a, b| a.id.as_deref().unwrap_or("").cmp(b.id.as_deref().unwrap_or("")));

    ordered
        .iter()
        .map(|chunk| {
            let created_at = chunk.metadata.created_at.as_deref().unwrap_or(UNKNOWN_CREATED_AT);
            format!("{}   Stored at {created_at}", chunk.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
