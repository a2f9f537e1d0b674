use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 2_000;
pub const DEFAULT_CERT_WARN_DAYS: i64 = 14;
pub const DEFAULT_REPORT_PATH: &str = "smoke-test-report.json";

/// HTTP methods a probe may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// A single configured check against the target.
/// Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeSpec {
    /// Display name, used in the console and the JSON report.
    pub name: String,

    /// Path appended to the base URL, e.g. `/api/health`.
    pub path: String,

    /// Defaults to GET if not specified.
    #[serde(default = "default_method")]
    pub method: HttpMethod,

    /// Defaults to 200 if not specified.
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,

    /// Evaluate the response body as a health document.
    #[serde(default)]
    pub health: bool,
}

impl ProbeSpec {
    pub fn new(name: &str, path: &str, method: HttpMethod, expected_status: u16) -> Self {
        ProbeSpec {
            name: name.to_string(),
            path: path.to_string(),
            method,
            expected_status,
            health: false,
        }
    }

    pub fn health(mut self) -> Self {
        self.health = true;
        self
    }
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

fn default_expected_status() -> u16 {
    200
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_slow_threshold_ms() -> u64 {
    DEFAULT_SLOW_THRESHOLD_MS
}

fn default_cert_warn_days() -> i64 {
    DEFAULT_CERT_WARN_DAYS
}

fn default_true() -> bool {
    true
}

/// The probes every deployment is checked against unless a suite file says otherwise.
pub fn default_probes() -> Vec<ProbeSpec> {
    vec![
        ProbeSpec::new("Health", "/api/health", HttpMethod::Get, 200).health(),
        ProbeSpec::new("Metrics", "/api/metrics", HttpMethod::Get, 200),
        ProbeSpec::new("Home", "/", HttpMethod::Get, 200),
        ProbeSpec::new("About", "/about", HttpMethod::Get, 200),
        ProbeSpec::new("Sign In", "/auth/signin", HttpMethod::Get, 200),
        ProbeSpec::new("Sign Up", "/auth/signup", HttpMethod::Get, 200),
    ]
}

/// Suite definition, as read from an optional YAML file.
/// Every field falls back to the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteConfig {
    /// Ordered list of probes. Executed strictly in this order.
    #[serde(default = "default_probes")]
    pub probes: Vec<ProbeSpec>,

    /// Per-request timeout, covering dispatch until the full body is received.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum attempts per probe, including the first one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between two attempts of the same probe.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Skip the remaining probes when a leading health probe fails.
    #[serde(default = "default_true")]
    pub liveness_gate: bool,

    /// Probes slower than this are called out in the performance summary.
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,

    /// Warn when the target's TLS certificate expires within this many days.
    #[serde(default = "default_cert_warn_days")]
    pub cert_warn_days: i64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            probes: default_probes(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            liveness_gate: true,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            cert_warn_days: DEFAULT_CERT_WARN_DAYS,
        }
    }
}

impl SuiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Reject settings the runner cannot honour: every probe needs at least one attempt
    /// and a non-zero deadline.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries < 1 {
            return Err(format!("max_retries must be at least 1, got {}", self.max_retries));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.probes.is_empty() {
            return Err("probes must not be empty".to_string());
        }
        if let Some(probe) = self.probes.iter().find(|p| !(100..=599).contains(&p.expected_status)) {
            return Err(format!(
                "probe '{}' expects invalid HTTP status {}",
                probe.name, probe.expected_status
            ));
        }
        Ok(())
    }
}
