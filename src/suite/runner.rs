use std::io::Write;

use chrono::Utc;
use reqwest::Client;

use super::perf::PerformanceSummary;
use super::report::{SuiteReport, Summary, format_result_line, write_report, write_summary};
use super::run_suite;
use crate::config::app_config::AppConfig;
use crate::error::Result;
use crate::http_probe::tls::check_certificate;

/// Run the configured suite end to end, printing progress and the summary to `out`.
///
/// Returns `Ok(true)` when every executed probe passed. In CI mode the JSON report is
/// written before returning; a failed write is returned as `SmokeError::ReportWrite`.
pub async fn execute(config: &AppConfig, client: &Client, out: &mut impl Write) -> Result<bool> {
    let suite = &config.suite;
    writeln!(out, "Running smoke tests against {}", config.base_url)?;
    writeln!(out)?;

    // Console write failures are picked up by the summary writes below.
    let run = run_suite(client, &config.base_url, suite, |result| {
        let _ = writeln!(out, "{}", format_result_line(result));
    })
    .await;

    // Checked after the gate so an unreachable target fails fast.
    if !run.gated() {
        let certificate = check_certificate(&config.base_url, suite.cert_warn_days).await;
        writeln!(out)?;
        if certificate.is_warning() {
            writeln!(out, "⚠️  TLS certificate {certificate}")?;
        } else {
            writeln!(out, "TLS certificate {certificate}")?;
        }
    }

    let summary = Summary::from_results(&run.results, run.duration.as_millis() as u64);
    let perf = PerformanceSummary::from_results(&run.results, suite.slow_threshold_ms);
    write_summary(out, &run, &summary)?;
    perf.write(out, suite.slow_threshold_ms)?;

    if config.ci {
        let report = SuiteReport::new(&config.base_url, &run, Utc::now());
        write_report(&report, &config.report_path)?;
        writeln!(out, "Report written to {}", config.report_path.display())?;
    }
    out.flush()?;

    Ok(summary.success())
}

/// Process exit status: 0 only for a completed run where every probe passed.
pub fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}
