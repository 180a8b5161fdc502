//! Write-path operations: storing a memory and forgetting documents.

use chrono::{DateTime, SecondsFormat, Utc};
use ltm_client::{
    DeleteRequest, DeleteResponse, Document, DocumentMetadata, MemoryBackend, Result,
    UpsertRequest, UpsertResponse,
};
use tracing::debug;

/// `source` recorded when the caller does not name one.
pub const DEFAULT_SOURCE: &str = "chat";

/// A piece of text to remember, with its provenance.
///
/// # Example
///
/// ```rust
/// use ltm_search::MemoryRecord;
///
/// let request = MemoryRecord::new("The user prefers email.")
///     .document_id("pref-1")
///     .author("assistant")
///     .into_upsert_request();
/// let doc = &request.documents[0];
/// assert_eq!(doc.id.as_deref(), Some("pref-1"));
/// assert_eq!(doc.metadata.as_ref().unwrap().source.as_deref(), Some("chat"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRecord {
    pub text: String,
    pub document_id: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub created_at: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub doc_type: Option<String>,
    pub reference: Option<String>,
}

impl MemoryRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    /// Stable id; also written to `metadata.document_id` so searches can filter on it.
    pub fn document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Storage time as an opaque string.
    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Storage time, rendered as RFC 3339.
    pub fn created_at_time(self, created_at: DateTime<Utc>) -> Self {
        self.created_at(created_at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Convert to a [`Document`], stamping `now` when no creation time was set.
    pub fn into_document(self, now: DateTime<Utc>) -> Document {
        let created_at = self
            .created_at
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true));
        let metadata = DocumentMetadata {
            source: Some(self.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string())),
            source_id: self.source_id,
            url: self.url,
            created_at: Some(created_at),
            author: self.author,
            document_id: self.document_id.clone(),
            doc_type: self.doc_type,
            reference: self.reference,
        };
        Document { text: self.text, id: self.document_id, metadata: Some(metadata) }
    }

    /// A one-document [`UpsertRequest`] stamped with the current time if needed.
    pub fn into_upsert_request(self) -> UpsertRequest {
        UpsertRequest { documents: vec![self.into_document(Utc::now())] }
    }
}

/// Store one record and return the ids the service assigned.
///
/// # Errors
///
/// Propagates backend errors unchanged.
pub async fn upsert_information(
    backend: &dyn MemoryBackend,
    record: MemoryRecord,
) -> Result<UpsertResponse> {
    let request = record.into_upsert_request();
    debug!(
        document_id = ?request.documents[0].id,
        text_len = request.documents[0].text.len(),
        "storing memory record"
    );
    backend.upsert(&request).await
}

/// Remove the documents selected by `request`.
///
/// # Errors
///
/// Propagates backend errors unchanged.
pub async fn forget(backend: &dyn MemoryBackend, request: DeleteRequest) -> Result<DeleteResponse> {
    debug!(
        ids = request.ids.as_ref().map_or(0, Vec::len),
        by_filter = request.filter.is_some(),
        delete_all = request.delete_all.unwrap_or(false),
        "forgetting memory documents"
    );
    backend.delete(&request).await
}
