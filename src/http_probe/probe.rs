use std::time::{Duration, Instant};

use reqwest::Client;

use super::report;
use super::result::{HttpResponse, ProbeOutcome};
use crate::config::probe_config::HttpMethod;
use crate::error::Result;

const USER_AGENT: &str = concat!("smokebox/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every probe of a run.
/// The per-request deadline is enforced by `probe_url`, not by the client.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Perform one bounded request and classify the outcome.
///
/// The timer covers dispatch until the full body has been received. No retries happen here.
pub async fn probe_url(
    client: &Client,
    method: HttpMethod,
    url: &str,
    timeout: Duration,
) -> ProbeOutcome {
    let start = Instant::now();

    let request = async {
        let response = client.request(method.into(), url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, headers, body))
    };

    match tokio::time::timeout(timeout, request).await {
        Err(_) => {
            tracing::debug!(url, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            ProbeOutcome::TimedOut(timeout)
        }
        Ok(Err(e)) if e.is_timeout() => ProbeOutcome::TimedOut(timeout),
        Ok(Err(e)) => {
            let reason = report(&e);
            tracing::debug!(url, error = %reason, "Transport failure");
            ProbeOutcome::TransportFailed(reason)
        }
        Ok(Ok((status, headers, body))) => {
            let elapsed = start.elapsed();
            tracing::debug!(
                url,
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                bytes = body.len(),
                "Response received"
            );
            ProbeOutcome::Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body: body.to_vec(),
                elapsed,
            })
        }
    }
}
