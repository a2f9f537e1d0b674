mod common;

use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;

use common::{HEALTHY_BODY, MockReply, MockServer, fast_suite, health_and_home};
use smokebox::config::probe_config::{HttpMethod, ProbeSpec};
use smokebox::http_probe::probe::build_client;
use smokebox::http_probe::result::ProbeErrorKind;
use smokebox::suite::report::{SuiteReport, Summary, write_report};
use smokebox::suite::run_suite;

fn healthy_site(path: &str, _count: usize) -> MockReply {
    match path {
        "/api/health" => MockReply::json(200, HEALTHY_BODY),
        _ => MockReply::status(200),
    }
}

#[tokio::test]
async fn all_probes_pass_against_healthy_target() {
    let server = MockServer::start(healthy_site).await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());

    let mut seen = Vec::new();
    let run = run_suite(&client, &server.url(), &suite, |r| seen.push(r.name.clone())).await;

    assert_eq!(seen, vec!["Health", "Home"]);
    let summary = Summary::from_results(&run.results, 0);
    assert_eq!((summary.total, summary.passed, summary.failed), (2, 2, 0));
    assert!(run.success());
    assert!(!run.gated());
    assert!(run.results.iter().all(|r| r.attempt == 1));
    assert_eq!(server.hits("/api/health"), 1);
    assert_eq!(server.hits("/"), 1);
}

#[tokio::test]
async fn probe_passes_on_third_attempt() {
    let server = MockServer::start(|path, count| match (path, count) {
        ("/api/health", 1..=2) => MockReply::status(502),
        _ => healthy_site(path, count),
    })
    .await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());

    let start = Instant::now();
    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    let health = &run.results[0];
    assert!(health.passed);
    assert_eq!(health.attempt, 3);
    assert_eq!(health.actual_status, Some(200));
    assert!(start.elapsed() >= suite.retry_delay() * 2);
    assert!(run.success());
}

#[tokio::test]
async fn unresponsive_target_times_out_after_max_retries() {
    let server = MockServer::start(|_, _| MockReply::Hang(Duration::from_secs(10))).await;
    let client = build_client().expect("client");
    let mut suite = fast_suite(vec![ProbeSpec::new("Home", "/", HttpMethod::Get, 200)]);
    suite.timeout_ms = 100;

    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    let home = &run.results[0];
    assert!(!home.passed);
    assert_eq!(home.actual_status, None);
    assert_eq!(home.error_kind, Some(ProbeErrorKind::Timeout));
    assert_eq!(home.attempt, 3);
    assert_eq!(server.hits("/"), 3);
    assert!(!run.success());
}

#[tokio::test]
async fn failing_health_gate_skips_remaining_probes() {
    let server = MockServer::start(|path, count| match path {
        "/api/health" => MockReply::status(503),
        _ => healthy_site(path, count),
    })
    .await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());

    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results[0].name, "Health");
    assert_eq!(run.results[0].attempt, 3);
    assert_eq!(run.skipped, vec!["Home"]);
    let summary = Summary::from_results(&run.results, 0);
    assert_eq!((summary.total, summary.passed, summary.failed), (1, 0, 1));
    assert!(!summary.success());
    assert_eq!(server.hits("/api/health"), 3);
    assert_eq!(server.hits("/"), 0);
}

#[tokio::test]
async fn disabled_gate_keeps_running() {
    let server = MockServer::start(|path, count| match path {
        "/api/health" => MockReply::status(503),
        _ => healthy_site(path, count),
    })
    .await;
    let client = build_client().expect("client");
    let mut suite = fast_suite(health_and_home());
    suite.liveness_gate = false;

    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    assert_eq!(run.results.len(), 2);
    assert!(!run.results[0].passed);
    assert!(run.results[1].passed);
    assert!(!run.success());
}

#[tokio::test]
async fn malformed_health_document_is_not_retried() {
    let server = MockServer::start(|path, count| match path {
        "/api/health" => MockReply::json(200, "OK"),
        _ => healthy_site(path, count),
    })
    .await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());

    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    let health = &run.results[0];
    assert!(!health.passed);
    assert_eq!(health.actual_status, Some(200));
    assert_eq!(health.error_kind, Some(ProbeErrorKind::MalformedHealthDocument));
    assert_eq!(health.attempt, 1);
    assert_eq!(server.hits("/api/health"), 1);
    assert!(run.gated());
}

#[tokio::test]
async fn unhealthy_subsystem_fails_health_probe() {
    let server = MockServer::start(|path, count| match path {
        "/api/health" => MockReply::json(
            200,
            r#"{"status":"healthy","checks":{"db":{"status":"ok"},"queue":{"status":"down"}}}"#,
        ),
        _ => healthy_site(path, count),
    })
    .await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());

    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    let health = &run.results[0];
    assert_eq!(health.error_kind, Some(ProbeErrorKind::Unhealthy));
    assert_eq!(health.attempt, 3);
    assert!(health.error.as_deref().unwrap_or_default().contains("queue=down"));
}

fn normalized(report: &SuiteReport) -> Value {
    let mut json = serde_json::to_value(report).expect("serialize");
    json["timestamp"] = Value::Null;
    json["summary"]["durationMs"] = Value::Null;
    if let Some(tests) = json["tests"].as_array_mut() {
        for test in tests {
            test["responseTimeMs"] = Value::Null;
        }
    }
    json
}

#[tokio::test]
async fn repeated_runs_produce_equivalent_reports() {
    let server = MockServer::start(healthy_site).await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());
    let base = server.url();

    let first = run_suite(&client, &base, &suite, |_| {}).await;
    let second = run_suite(&client, &base, &suite, |_| {}).await;

    let first = SuiteReport::new(&base, &first, Utc::now());
    let second = SuiteReport::new(&base, &second, Utc::now());
    assert_eq!(normalized(&first), normalized(&second));
}

#[tokio::test]
async fn ci_report_matches_run() {
    let server = MockServer::start(healthy_site).await;
    let client = build_client().expect("client");
    let suite = fast_suite(health_and_home());
    let run = run_suite(&client, &server.url(), &suite, |_| {}).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("smoke-test-report.json");
    let report = SuiteReport::new(&server.url(), &run, Utc::now());
    write_report(&report, &path).expect("write report");

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(json["baseUrl"], format!("http://{}", server.addr));
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["passed"], 2);
    assert_eq!(json["summary"]["failed"], 0);
    assert_eq!(json["tests"][0]["name"], "Health");
    assert_eq!(json["tests"][0]["expectedStatus"], 200);
    assert_eq!(json["tests"][1]["path"], "/");
}
