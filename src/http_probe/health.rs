use std::collections::BTreeMap;

use serde::Deserialize;

/// Values accepted as "healthy" for the top-level status and for every subsystem check.
const HEALTHY_SENTINELS: [&str; 2] = ["healthy", "ok"];

/// Body of the platform health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthDocument {
    pub status: String,

    /// Subsystem name to check result. Absent means "no subsystems reported".
    #[serde(default)]
    pub checks: BTreeMap<String, CheckStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthVerdict {
    Healthy,
    /// Parsed, but something reports a non-healthy status.
    Unhealthy(String),
    /// Not JSON, or missing required fields.
    Malformed(String),
}

fn is_healthy(status: &str) -> bool {
    HEALTHY_SENTINELS
        .iter()
        .any(|sentinel| status.eq_ignore_ascii_case(sentinel))
}

/// Parse a health document and decide whether the target is healthy.
/// Healthy means the top-level status AND every subsystem check are healthy.
pub fn evaluate_health(body: &[u8]) -> HealthVerdict {
    let document: HealthDocument = match serde_json::from_slice(body) {
        Ok(document) => document,
        Err(e) => return HealthVerdict::Malformed(format!("Malformed health document: {e}")),
    };

    let failing: Vec<String> = document
        .checks
        .iter()
        .filter(|(_, check)| !is_healthy(&check.status))
        .map(|(name, check)| format!("{name}={}", check.status))
        .collect();

    if is_healthy(&document.status) && failing.is_empty() {
        return HealthVerdict::Healthy;
    }

    let message = if failing.is_empty() {
        format!("Health status '{}'", document.status)
    } else {
        format!(
            "Health status '{}', failing checks: {}",
            document.status,
            failing.join(", ")
        )
    };
    HealthVerdict::Unhealthy(message)
}
