//! End-to-end tests: aggregator over the real HTTP backend against wiremock.

use ltm_client::{ClientConfig, HttpMemoryBackend, MemoryError, RetryPolicy, RetryingBackend};
use ltm_search::{
    MemoryRecord, MemorySearchAggregator, SearchCriteria, concatenate_with_provenance,
    dedupe_by_document, upsert_information,
};
use ltm_telemetry::TraceId;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path},
};

fn aggregator_for(server: &MockServer) -> MemorySearchAggregator {
    let config = ClientConfig::builder().base_url(server.uri()).token("t0k3n").build().unwrap();
    let backend = RetryingBackend::new(HttpMemoryBackend::new(config).unwrap(), RetryPolicy::none());
    MemorySearchAggregator::new(backend)
}

#[tokio::test]
async fn refund_policy_search_ranks_and_dedupes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("authorization", "Bearer t0k3n"))
        .and(body_json(json!({
            "queries": [{"query": "refund policy", "filter": {"user_id": "u1"}, "top_k": 5}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "query": "refund policy",
                "results": [
                    {"id": "c2", "text": "Refunds within 30 days.", "score": 0.9,
                     "metadata": {"document_id": "d1", "created_at": "2024-02-01"}},
                    {"id": "c3", "text": "Store credit otherwise.", "score": 0.6,
                     "metadata": {"document_id": "d2", "created_at": "2024-02-03"}},
                    {"id": "c1", "text": "Receipts are required.", "score": 0.4,
                     "metadata": {"document_id": "d1", "created_at": "2024-02-01"}},
                    {"id": "c4", "text": "Shipping is free.", "score": 0.2,
                     "metadata": {"document_id": "d3"}}
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = aggregator_for(&server);
    let criteria = SearchCriteria::new("refund_policy").user_id("u1").k(5);
    let chunks =
        aggregator.query_information(&criteria, Some(0.3)).await.unwrap().into_chunks();

    let ids: Vec<&str> = chunks.iter().filter_map(|c| c.id.as_deref()).collect();
    assert_eq!(ids, ["c2", "c3", "c1"]);

    let summaries = dedupe_by_document(&chunks);
    let docs: Vec<(&str, f64)> = summaries
        .iter()
        .map(|s| (s.document_id.as_deref().unwrap_or(""), s.score))
        .collect();
    assert_eq!(docs, [("d1", 0.9), ("d2", 0.6)]);

    assert_eq!(
        concatenate_with_provenance(&chunks),
        "Receipts are required.   Stored at 2024-02-01\n\
         Refunds within 30 days.   Stored at 2024-02-01\n\
         Store credit otherwise.   Stored at 2024-02-03"
    );
}

#[tokio::test]
async fn validation_rejection_reaches_the_caller() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "queries", 0, "top_k"], "msg": "ensure this value is greater than 0", "type": "value_error"}]
        })))
        .mount(&server)
        .await;

    let err = aggregator_for(&server)
        .query_top_results(&SearchCriteria::top_results("q").k(0), 0.3)
        .await
        .unwrap_err();
    match err {
        MemoryError::ValidationRejected { status, detail } => {
            assert_eq!(status, 422);
            assert_eq!(detail[0].to_string(), "body.queries.0.top_k: ensure this value is greater than 0");
        }
        other => panic!("expected ValidationRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn upsert_information_posts_record_with_trace_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upsert"))
        .and(header("x-trace-id", "req-42"))
        .and(body_partial_json(json!({
            "documents": [{
                "text": "The user prefers email.",
                "id": "pref-1",
                "metadata": {"source": "chat", "document_id": "pref-1", "author": "assistant"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ids": ["pref-1"]})))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = aggregator_for(&server);
    let record = MemoryRecord::new("The user prefers email.").document_id("pref-1").author("assistant");

    let response = TraceId::from_header(Some("req-42"))
        .scope(upsert_information(aggregator.backend().as_ref(), record))
        .await
        .unwrap();
    assert_eq!(response.ids, vec!["pref-1".to_string()]);
}
