//! Full probe loop: fake adapter → `EaClient` → `Prober` → session log.

use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use lvp_prober::catalog::Catalog;
use lvp_prober::client::EaClient;
use lvp_prober::clock::SystemClock;
use lvp_prober::prober::{Pacing, Prober};
use lvp_prober::recorder::Recorder;
use lvp_prober::session_log::SessionLog;
use lvp_prober::types::{LogRecord, Pair};

use crate::fake_ea::FakeEa;
use crate::{temp_dir, SharedBuf};

fn catalog() -> Catalog {
    Catalog::new(vec![
        Pair::new("EUR", "USD"),
        Pair::new("USD", "TRY"),
        Pair::new("XAU", "USD"),
        Pair::new("USD", "NGN"),
        Pair::new("USD", "ARS"),
    ])
}

async fn prober(pacing: Pacing) -> (FakeEa, Prober<SessionLog>, SharedBuf, std::path::PathBuf) {
    let (ea, url) = FakeEa::spawn().await;
    let client = EaClient::new(url, Duration::from_millis(500)).unwrap();
    let dir = temp_dir();
    let session = SessionLog::create(&dir, chrono::Utc::now()).unwrap();
    let console = SharedBuf::default();

    let prober = Prober::new(
        Box::new(client),
        Box::new(SystemClock),
        catalog(),
        Recorder::with_console(session, Box::new(console.clone())),
        pacing,
    );
    (ea, prober, console, dir)
}

fn fast() -> Pacing {
    Pacing {
        inter_request: Duration::from_millis(5),
        inter_cycle: Duration::from_millis(5),
    }
}

fn file_lines(prober: &Prober<SessionLog>) -> Vec<String> {
    std::fs::read_to_string(prober.recorder().sink().path())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn without_timestamp(line: &str) -> Value {
    let mut value: Value = serde_json::from_str(line).unwrap();
    assert!(value["timestamp"].is_string(), "{line}");
    value.as_object_mut().unwrap().remove("timestamp");
    value
}

#[tokio::test]
async fn test_cycles_write_one_record_per_pair() {
    let (ea, mut prober, _console, dir) = prober(fast()).await;

    let first = prober.run_cycle().await;
    let second = prober.run_cycle().await;
    assert_eq!((first.cycle, second.cycle), (1, 2));
    assert_eq!(first.probes, 5);
    assert_eq!(first.ok, 2);
    assert_eq!(first.errors, 3);

    let lines = file_lines(&prober);
    assert_eq!(lines.len(), 2 * catalog().len());
    assert_eq!(ea.requests().len(), 10);

    let records: Vec<LogRecord> = lines.iter().map(|l| serde_json::from_str(l).unwrap()).collect();
    let pairs: Vec<_> = records.iter().map(|r| r.pair.as_str()).collect();
    assert_eq!(
        pairs,
        vec![
            "EUR/USD", "USD/TRY", "XAU/USD", "USD/NGN", "USD/ARS",
            "EUR/USD", "USD/TRY", "XAU/USD", "USD/NGN", "USD/ARS",
        ]
    );
    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_record_shapes_on_disk() {
    let (_ea, mut prober, _console, dir) = prober(fast()).await;
    prober.run_cycle().await;

    let lines = file_lines(&prober);
    // Key order on disk follows the requester: status last on OK lines.
    assert!(lines[0].ends_with(r#""cacheHit":true,"status":"OK"}"#), "{}", lines[0]);
    assert!(lines[1].ends_with(r#""status":"ERROR","error":"rate limited"}"#), "{}", lines[1]);
    assert_eq!(
        without_timestamp(&lines[0]),
        json!({
            "pair": "EUR/USD",
            "price": 1.2345,
            "providerTime": 1700000000000u64,
            "cacheHit": true,
            "status": "OK"
        })
    );
    assert_eq!(
        without_timestamp(&lines[1]),
        json!({"pair": "USD/TRY", "status": "ERROR", "error": "rate limited"})
    );
    assert_eq!(
        without_timestamp(&lines[2]),
        json!({
            "pair": "XAU/USD",
            "price": 2350.5,
            "providerTime": 1700000000500u64,
            "cacheHit": "unknown",
            "status": "OK"
        })
    );

    let ngn = without_timestamp(&lines[3]);
    assert_eq!(ngn["status"], "ERROR");
    // Captured as text, not decoded.
    let raw: Value = serde_json::from_str(ngn["error"].as_str().unwrap()).unwrap();
    assert_eq!(raw, json!({"error": {"name": "AdapterError", "message": "no price"}}));

    let ars = without_timestamp(&lines[4]);
    assert_eq!(ars["status"], "ERROR");
    assert!(!ars["error"].as_str().unwrap().is_empty());

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_console_mirrors_file() {
    let (_ea, mut prober, console, dir) = prober(fast()).await;
    prober.run_cycle().await;
    prober.run_cycle().await;

    let console_lines = console.lines();
    let console_records: Vec<&String> =
        console_lines.iter().filter(|l| l.starts_with('{')).collect();
    let file = file_lines(&prober);

    assert_eq!(console_records.len(), file.len());
    for (printed, stored) in console_records.iter().zip(&file) {
        assert_eq!(*printed, stored);
    }

    let banners: Vec<_> = console_lines
        .iter()
        .filter(|l| l.starts_with("=== Cycle"))
        .collect();
    assert_eq!(banners.len(), 2);
    assert!(banners[0].starts_with("=== Cycle 1 at "));
    assert!(banners[1].starts_with("=== Cycle 2 at "));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_run_until_cancelled() {
    let (_ea, mut prober, console, dir) = prober(Pacing {
        inter_request: Duration::from_millis(5),
        inter_cycle: Duration::from_secs(10),
    })
    .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let cycles = prober.run(token).await;

    // Cancellation interrupts the 10s pause after the first cycle.
    assert_eq!(cycles, 1);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(file_lines(&prober).len(), catalog().len());
    assert!(console
        .lines()
        .iter()
        .any(|l| l == "Sleeping 10s until next cycle..."));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_pacing_is_lower_bound() {
    let pacing = Pacing {
        inter_request: Duration::from_millis(20),
        inter_cycle: Duration::from_millis(50),
    };
    let (_ea, mut prober, _console, dir) = prober(pacing).await;

    let started = Instant::now();
    prober.run_cycle().await;
    let per_cycle = pacing.inter_request * catalog().len() as u32;
    assert!(started.elapsed() >= per_cycle);

    std::fs::remove_dir_all(dir).unwrap();
}
