//! `EaClient` against the fake adapter.

use serde_json::json;
use std::time::Duration;

use lvp_prober::client::{EaClient, PriceSource};
use lvp_prober::types::{outcome_status, Pair, ProbeError, ResponseBody};

use crate::fake_ea::FakeEa;

async fn client() -> (FakeEa, EaClient) {
    let (ea, url) = FakeEa::spawn().await;
    let client = EaClient::new(url, Duration::from_millis(500)).unwrap();
    (ea, client)
}

#[tokio::test]
async fn test_endpoint_is_configured_url() {
    let (_ea, url) = FakeEa::spawn().await;
    let client = EaClient::new(url.clone(), Duration::from_millis(500)).unwrap();
    let source: &dyn PriceSource = &client;
    assert_eq!(source.endpoint(), url);
}

#[tokio::test]
async fn test_posts_nested_pair_payload() {
    let (ea, client) = client().await;
    client.probe(&Pair::new("EUR", "USD")).await.unwrap();

    assert_eq!(
        ea.requests(),
        vec![json!({"data": {"base": "EUR", "quote": "USD"}})]
    );
}

#[tokio::test]
async fn test_ok_response_is_parsed() {
    let (_ea, client) = client().await;
    let resp = client.probe(&Pair::new("EUR", "USD")).await.unwrap();

    assert_eq!(resp.status, 200);
    match resp.body {
        ResponseBody::Json(body) => {
            assert_eq!(body["result"], json!(1.2345));
            assert_eq!(body["debug"]["cacheHit"], json!(true));
        }
        other => panic!("expected JSON body, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_ok_keeps_raw_text_and_status() {
    let (_ea, client) = client().await;

    let limited = client.probe(&Pair::new("USD", "TRY")).await.unwrap();
    assert_eq!(limited.status, 429);
    assert_eq!(limited.body, ResponseBody::Raw("rate limited".to_string()));

    // A JSON error payload is still captured as text.
    let failed = client.probe(&Pair::new("USD", "NGN")).await.unwrap();
    assert_eq!(failed.status, 500);
    match failed.body {
        ResponseBody::Raw(text) => assert!(text.contains("AdapterError")),
        other => panic!("expected raw body, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_ok_body_is_probe_error() {
    let (_ea, client) = client().await;
    let outcome = client.probe(&Pair::new("USD", "ARS")).await;

    assert_eq!(outcome_status(&outcome), -1);
    assert!(matches!(outcome, Err(ProbeError::Decode(_))));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let (_ea, client) = client().await;
    let started = std::time::Instant::now();
    let outcome = client.probe(&Pair::new("USD", "KES")).await;

    match outcome {
        Err(ProbeError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(started.elapsed() < crate::fake_ea::STALL);
}

#[tokio::test]
async fn test_exactly_one_request_per_probe() {
    let (ea, client) = client().await;
    for _ in 0..3 {
        let _ = client.probe(&Pair::new("USD", "TRY")).await;
    }
    assert_eq!(ea.requests().len(), 3);
}
