pub mod perf;
pub mod report;
mod runner;

pub use runner::{execute, exit_status};

use std::time::{Duration, Instant};

use reqwest::Client;
use url::Url;

use crate::config::probe_config::{ProbeSpec, SuiteConfig};
use crate::http_probe::health::{HealthVerdict, evaluate_health};
use crate::http_probe::prelude::*;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SuiteRun {
    /// Final result per executed probe, in execution order.
    pub results: Vec<ProbeResult>,
    /// Probes not executed because the liveness gate closed.
    pub skipped: Vec<String>,
    pub duration: Duration,
}

impl SuiteRun {
    pub fn gated(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Join a probe path onto the base URL.
pub fn target_url(base_url: &Url, path: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Turn the raw outcome of one attempt into a `ProbeResult`.
pub fn evaluate(spec: &ProbeSpec, attempt: u32, outcome: ProbeOutcome) -> ProbeResult {
    match outcome {
        ProbeOutcome::TimedOut(after) => ProbeResult::failed(
            spec,
            attempt,
            None,
            None,
            ProbeErrorKind::Timeout,
            format!("Request timed out after {}ms", after.as_millis()),
        ),
        ProbeOutcome::TransportFailed(reason) => ProbeResult::failed(
            spec,
            attempt,
            None,
            None,
            ProbeErrorKind::TransportError,
            reason,
        ),
        ProbeOutcome::Ok(response) if response.status != spec.expected_status => {
            ProbeResult::failed(
                spec,
                attempt,
                Some(response.status),
                Some(response.elapsed),
                ProbeErrorKind::StatusMismatch,
                format!(
                    "Unexpected status {} {}",
                    response.status, response.status_text
                )
                .trim_end()
                .to_string(),
            )
        }
        ProbeOutcome::Ok(response) if spec.health => match evaluate_health(&response.body) {
            HealthVerdict::Healthy => {
                ProbeResult::passed(spec, attempt, response.status, response.elapsed)
            }
            HealthVerdict::Unhealthy(message) => ProbeResult::failed(
                spec,
                attempt,
                Some(response.status),
                Some(response.elapsed),
                ProbeErrorKind::Unhealthy,
                message,
            ),
            HealthVerdict::Malformed(message) => ProbeResult::failed(
                spec,
                attempt,
                Some(response.status),
                Some(response.elapsed),
                ProbeErrorKind::MalformedHealthDocument,
                message,
            ),
        },
        ProbeOutcome::Ok(response) => {
            ProbeResult::passed(spec, attempt, response.status, response.elapsed)
        }
    }
}

/// Drive one probe to its final result, retrying per the suite policy.
pub async fn run_probe(
    client: &Client,
    base_url: &Url,
    spec: &ProbeSpec,
    suite: &SuiteConfig,
) -> ProbeResult {
    let url = target_url(base_url, &spec.path);
    let policy = RetryPolicy::new(suite.max_retries, suite.retry_delay());
    let timeout = suite.timeout();

    let Retried { value, attempts } = retry(
        policy,
        |attempt| {
            let url = url.as_str();
            async move {
                let outcome = probe_url(client, spec.method, url, timeout).await;
                let result = evaluate(spec, attempt, outcome);
                if !result.passed {
                    tracing::info!(
                        probe = %spec.name,
                        attempt,
                        error = result.error.as_deref().unwrap_or_default(),
                        "Probe attempt failed"
                    );
                }
                result
            }
        },
        ProbeResult::is_final,
    )
    .await;

    debug_assert_eq!(value.attempt, attempts);
    value
}

/// Execute every probe in order and collect the final results.
///
/// When the liveness gate is enabled and the first probe is a health probe, its failure
/// skips everything after it. `on_result` is called as each probe completes.
pub async fn run_suite<F>(
    client: &Client,
    base_url: &Url,
    suite: &SuiteConfig,
    mut on_result: F,
) -> SuiteRun
where
    F: FnMut(&ProbeResult),
{
    let start = Instant::now();
    let mut results = Vec::with_capacity(suite.probes.len());
    let mut skipped = Vec::new();

    for (index, spec) in suite.probes.iter().enumerate() {
        let result = run_probe(client, base_url, spec, suite).await;
        on_result(&result);

        let gate_closed = suite.liveness_gate && index == 0 && spec.health && !result.passed;
        results.push(result);

        if gate_closed {
            tracing::warn!(probe = %spec.name, "Liveness gate failed, skipping remaining probes");
            skipped = suite.probes[1..].iter().map(|p| p.name.clone()).collect();
            break;
        }
    }

    SuiteRun {
        results,
        skipped,
        duration: start.elapsed(),
    }
}
