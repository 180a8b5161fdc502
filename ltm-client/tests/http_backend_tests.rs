//! Integration tests for the HTTP backend using wiremock.

use std::net::TcpListener;
use std::time::Duration;

use ltm_client::{
    ClientConfig, DeleteRequest, Document, DocumentMetadata, HttpMemoryBackend, MemoryBackend,
    MemoryError, RetryPolicy, RetryingBackend, SearchFilter, SearchQuery, SearchRequest,
    SearchResponse, UpsertRequest,
};
use ltm_telemetry::TraceId;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn backend_for(server: &MockServer) -> HttpMemoryBackend {
    let config =
        ClientConfig::builder().base_url(server.uri()).token("test-token").build().unwrap();
    HttpMemoryBackend::new(config).unwrap()
}

fn refund_request() -> SearchRequest {
    let filter = SearchFilter { user_id: Some("u1".into()), ..Default::default() };
    SearchRequest::single(SearchQuery::new("refund policy").with_filter(filter).with_top_k(5))
}

#[tokio::test]
async fn query_posts_typed_body_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "queries": [{"query": "refund policy", "filter": {"user_id": "u1"}, "top_k": 5}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "query": "refund policy",
                "results": [{
                    "id": "c1",
                    "text": "Refunds are accepted within 30 days.",
                    "score": 0.91,
                    "metadata": {"document_id": "d1", "source": "chat"}
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = backend_for(&server).query(&refund_request()).await.unwrap();
    let response = SearchResponse::from_payload(payload);

    assert_eq!(response.len(), 1);
    let chunk = response.chunks().next().unwrap();
    assert_eq!(chunk.id.as_deref(), Some("c1"));
    assert_eq!(chunk.document_id(), Some("d1"));
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/memory/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(format!("{}/api/memory", server.uri()));
    let backend = HttpMemoryBackend::new(config).unwrap();
    backend.query(&refund_request()).await.unwrap();
}

#[tokio::test]
async fn validation_error_is_rejected_with_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{
                "loc": ["body", "queries", 0, "query"],
                "msg": "field required",
                "type": "value_error.missing"
            }]
        })))
        .mount(&server)
        .await;

    match backend_for(&server).query(&refund_request()).await {
        Err(MemoryError::ValidationRejected { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail.len(), 1);
            assert_eq!(detail[0].to_string(), "body.queries.0.query: field required");
        }
        other => panic!("expected ValidationRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_unexpected_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    match backend_for(&server).query(&refund_request()).await {
        Err(MemoryError::UnexpectedBackendResponse { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected UnexpectedBackendResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn detail_document_with_success_status_is_returned_raw() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"detail": "index warming up"})),
        )
        .mount(&server)
        .await;

    let payload = backend_for(&server).query(&refund_request()).await.unwrap();
    assert!(SearchResponse::from_payload(payload).is_empty());
}

#[tokio::test]
async fn timeout_is_backend_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder().base_url(server.uri()).timeout_secs(1).build().unwrap();
    let backend = HttpMemoryBackend::new(config).unwrap();

    match backend.query(&refund_request()).await {
        Err(MemoryError::BackendUnavailable { message }) => {
            assert!(message.contains("timed out"), "unexpected message: {message}");
        }
        other => panic!("expected BackendUnavailable, got {other:?}"),
    }
}

/// A base URL on a local port with nothing listening.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn refused_connection_is_backend_unavailable() {
    let backend = HttpMemoryBackend::new(ClientConfig::new(closed_port_url())).unwrap();
    let err = backend.query(&refund_request()).await.unwrap_err();
    assert!(matches!(err, MemoryError::BackendUnavailable { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn trace_id_is_forwarded_inside_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("x-trace-id", "trace-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    TraceId::from("trace-123".to_string())
        .scope(async { backend.query(&refund_request()).await.unwrap() })
        .await;
}

#[tokio::test]
async fn invalid_trace_id_is_dropped_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = RetryingBackend::new(backend_for(&server), RetryPolicy::default());
    let payload = TraceId::from("abc\ndef".to_string())
        .scope(async { backend.query(&refund_request()).await })
        .await
        .unwrap();
    assert_eq!(payload, json!({"results": []}));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("x-trace-id").is_none());
}

#[tokio::test]
async fn upsert_returns_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upsert"))
        .and(body_json(json!({
            "documents": [{
                "text": "The user prefers email.",
                "id": "doc-1",
                "metadata": {"source": "chat", "document_id": "doc-1"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ids": ["doc-1"]})))
        .expect(1)
        .mount(&server)
        .await;

    let request = UpsertRequest {
        documents: vec![Document {
            text: "The user prefers email.".into(),
            id: Some("doc-1".into()),
            metadata: Some(DocumentMetadata {
                source: Some("chat".into()),
                document_id: Some("doc-1".into()),
                ..Default::default()
            }),
        }],
    };
    let response = backend_for(&server).upsert(&request).await.unwrap();
    assert_eq!(response.ids, vec!["doc-1".to_string()]);
}

#[tokio::test]
async fn upsert_with_wrong_shape_is_unexpected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .mount(&server)
        .await;

    let err = backend_for(&server).upsert(&UpsertRequest::default()).await.unwrap_err();
    assert!(matches!(err, MemoryError::UnexpectedBackendResponse { status: 200, .. }));
}

#[tokio::test]
async fn delete_uses_delete_method() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/delete"))
        .and(body_json(json!({"ids": ["doc-1", "doc-2"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let response =
        backend_for(&server).delete(&DeleteRequest::by_ids(["doc-1", "doc-2"])).await.unwrap();
    assert!(response.success);
}
