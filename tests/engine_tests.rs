// CREST - Compression Ratio Estimation and Simulation Toolkit
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Engine adapter tests against a mock HTTP engine

use crest::{Algorithm, EngineClient, EngineError, Provenance};

/// Engine body with ratios deliberately inconsistent with the sizes
fn sample_body() -> &'static str {
    r#"{
        "originalSize": 1000,
        "originalData": "mock sensor payload",
        "results": [
            {"algorithm": "huffman", "compressionRatio": 0.99, "compressedSize": 4400, "compressionTime": 2.5},
            {"algorithm": "delta", "compressionRatio": -3.0, "compressedSize": 6000, "compressionTime": 1.1}
        ]
    }"#
}

#[tokio::test]
async fn probe_reports_reachable_on_2xx() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    assert!(client.probe().await);
    mock.assert_async().await;
}

#[tokio::test]
async fn probe_reports_unreachable_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(500)
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    assert!(!client.probe().await);
}

#[tokio::test]
async fn probe_reports_unreachable_on_refused_connection() {
    // Port 9 (discard) is not listening
    let client = EngineClient::with_base_url("http://127.0.0.1:9").unwrap();
    assert!(!client.probe().await);
}

#[tokio::test]
async fn fetch_sample_rederives_every_ratio() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/compress")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sample_body())
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let response = client.fetch_sample().await.unwrap();

    assert_eq!(response.provenance, Provenance::Engine);
    assert_eq!(response.original_size, 1000);
    assert_eq!(response.original_data, "mock sensor payload");

    // 4400 bits of 8000: 0.45 eliminated, not the 0.99 the body claimed
    let huffman = response.result_for(Algorithm::Huffman).unwrap();
    assert_eq!(huffman.compression_ratio, 0.45);

    // 6000 bits of 8000: 0.25, not -3.0
    let delta = response.result_for(Algorithm::Delta).unwrap();
    assert_eq!(delta.compression_ratio, 0.25);

    mock.assert_async().await;
}

#[tokio::test]
async fn compress_posts_the_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/compress/custom")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(
            serde_json::json!({"data": "hello world"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "originalSize": 11,
                "results": [
                    {"algorithm": "huffman", "compressionRatio": 0.3, "compressedSize": 60}
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let response = client.compress("hello world").await.unwrap();

    // originalData missing from the body: backfilled from the submission
    assert_eq!(response.original_data, "hello world");
    assert_eq!(response.results.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_2xx_is_a_recoverable_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/compress")
        .with_status(503)
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let err = client.fetch_sample().await.unwrap_err();

    assert_eq!(err, EngineError::Status { status: 503 });
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn garbage_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/compress")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json at all")
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let err = client.fetch_sample().await.unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse { .. }));
}

#[tokio::test]
async fn empty_results_are_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/compress/custom")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"originalSize": 5, "results": []}"#)
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let err = client.compress("abcde").await.unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse { .. }));
}

#[tokio::test]
async fn unknown_algorithm_tag_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/compress")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "originalSize": 100,
                "results": [
                    {"algorithm": "brotli", "compressionRatio": 0.5, "compressedSize": 400}
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = EngineClient::with_base_url(server.url()).unwrap();
    let err = client.fetch_sample().await.unwrap_err();
    assert!(
        matches!(err, EngineError::MalformedResponse { ref reason } if reason.contains("brotli"))
    );
}

#[tokio::test]
async fn refused_connection_is_recoverable() {
    let client = EngineClient::with_base_url("http://127.0.0.1:9").unwrap();
    let err = client.fetch_sample().await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Unreachable { .. } | EngineError::Timeout { .. }
    ));
    assert!(err.is_recoverable());
}
