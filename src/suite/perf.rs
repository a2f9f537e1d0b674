use std::io::Write;

use crate::http_probe::result::ProbeResult;

/// Response-time and error-rate figures for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub min_ms: Option<u64>,
    pub avg_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub max_ms: Option<u64>,
    /// Probes over the slow threshold, with their response time.
    pub slow: Vec<(String, u64)>,
    pub total_attempts: u32,
    pub failed_attempts: u32,
    /// `failed_attempts / total_attempts`, zero when nothing ran.
    pub error_rate: f64,
}

/// Nearest-rank percentile over an ascending slice.
fn percentile(sorted: &[u64], pct: f64) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted.get(rank.clamp(1, sorted.len()) - 1).copied()
}

impl PerformanceSummary {
    pub fn from_results(results: &[ProbeResult], slow_threshold_ms: u64) -> Self {
        let mut times: Vec<u64> = results.iter().filter_map(|r| r.response_time_ms).collect();
        times.sort_unstable();

        let avg_ms = (!times.is_empty()).then(|| times.iter().sum::<u64>() / times.len() as u64);

        let slow = results
            .iter()
            .filter_map(|r| r.response_time_ms.map(|ms| (r.name.clone(), ms)))
            .filter(|(_, ms)| *ms > slow_threshold_ms)
            .collect();

        // Every attempt before the last one failed; the last one failed unless the probe passed.
        let total_attempts: u32 = results.iter().map(|r| r.attempt).sum();
        let passed_attempts = results.iter().filter(|r| r.passed).count() as u32;
        let failed_attempts = total_attempts - passed_attempts;
        let error_rate = if total_attempts == 0 {
            0.0
        } else {
            f64::from(failed_attempts) / f64::from(total_attempts)
        };

        PerformanceSummary {
            min_ms: times.first().copied(),
            avg_ms,
            p95_ms: percentile(&times, 95.0),
            max_ms: times.last().copied(),
            slow,
            total_attempts,
            failed_attempts,
            error_rate,
        }
    }

    pub fn write(&self, out: &mut impl Write, slow_threshold_ms: u64) -> std::io::Result<()> {
        let fmt = |v: Option<u64>| v.map(|ms| format!("{ms}ms")).unwrap_or_else(|| "-".into());
        writeln!(out)?;
        writeln!(out, "Performance")?;
        writeln!(
            out,
            "  Response time: min {} / avg {} / p95 {} / max {}",
            fmt(self.min_ms),
            fmt(self.avg_ms),
            fmt(self.p95_ms),
            fmt(self.max_ms)
        )?;
        writeln!(
            out,
            "  Error rate:    {:.1}% ({} of {} attempts failed)",
            self.error_rate * 100.0,
            self.failed_attempts,
            self.total_attempts
        )?;
        for (name, ms) in &self.slow {
            writeln!(out, "  ⚠️  {name} took {ms}ms (threshold {slow_threshold_ms}ms)")?;
        }
        Ok(())
    }
}
