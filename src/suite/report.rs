use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use unicode_truncate::UnicodeTruncateStr;
use url::Url;

use super::SuiteRun;
use crate::error::{Result, SmokeError};
use crate::http_probe::result::ProbeResult;

const NAME_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl Summary {
    /// Reduce the completed results into counts.
    pub fn from_results(results: &[ProbeResult], duration_ms: u64) -> Self {
        let (total, passed) = results.iter().fold((0, 0), |(total, passed), result| {
            (total + 1, passed + usize::from(result.passed))
        });
        Summary {
            total,
            passed,
            failed: total - passed,
            duration_ms,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// The CI artifact. Built once at the end of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub timestamp: String,
    pub base_url: String,
    pub summary: Summary,
    pub tests: Vec<ProbeResult>,
}

impl SuiteReport {
    pub fn new(base_url: &Url, run: &SuiteRun, timestamp: DateTime<Utc>) -> Self {
        SuiteReport {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            summary: Summary::from_results(&run.results, run.duration.as_millis() as u64),
            tests: run.results.clone(),
        }
    }
}

/// Serialize the report to `path`, replacing any previous file.
pub fn write_report(report: &SuiteReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| SmokeError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// One console line for a completed probe.
pub fn format_result_line(result: &ProbeResult) -> String {
    let name = to_fixed_width(&result.name, NAME_WIDTH);
    let timing = result
        .response_time_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());
    let retries = if result.attempt > 1 {
        format!(" (attempt {})", result.attempt)
    } else {
        String::new()
    };

    if result.passed {
        format!(
            "✅ {name} {} {} -> {} in {timing}{retries}",
            result.method.as_str(),
            result.path,
            result.actual_status.unwrap_or_default()
        )
    } else {
        format!(
            "❌ {name} {} {}: {}{retries}",
            result.method.as_str(),
            result.path,
            result.failure_reason().unwrap_or_default()
        )
    }
}

/// Human-readable summary. Always printed, gated or not.
pub fn write_summary(out: &mut impl Write, run: &SuiteRun, summary: &Summary) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Smoke test summary")?;
    writeln!(out, "  Total:    {}", summary.total)?;
    writeln!(out, "  Passed:   {}", summary.passed)?;
    writeln!(out, "  Failed:   {}", summary.failed)?;
    writeln!(out, "  Duration: {}ms", summary.duration_ms)?;

    let failures: Vec<&ProbeResult> = run.results.iter().filter(|r| !r.passed).collect();
    if !failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Failed probes:")?;
        for result in failures {
            writeln!(
                out,
                "  - {}: {}",
                result.name,
                result.failure_reason().unwrap_or_default()
            )?;
        }
    }

    if run.gated() {
        writeln!(out)?;
        writeln!(
            out,
            "Liveness gate failed, skipped {} probe(s): {}",
            run.skipped.len(),
            run.skipped.join(", ")
        )?;
    }

    writeln!(out)?;
    if summary.success() {
        writeln!(out, "✅ All smoke tests passed")?;
    } else {
        writeln!(out, "❌ {} smoke test(s) failed", summary.failed)?;
    }
    Ok(())
}
