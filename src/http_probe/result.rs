use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::config::probe_config::{HttpMethod, ProbeSpec};

/// A fully received HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Dispatch until the last body byte arrived.
    pub elapsed: Duration,
}

/// The outcome of a single bounded request.
#[derive(Debug)]
pub enum ProbeOutcome {
    Ok(HttpResponse),
    TimedOut(Duration),
    TransportFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbeErrorKind {
    StatusMismatch,
    Timeout,
    TransportError,
    MalformedHealthDocument,
    Unhealthy,
}

impl ProbeErrorKind {
    /// Whether another attempt could change the verdict.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProbeErrorKind::MalformedHealthDocument)
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeErrorKind::StatusMismatch => "StatusMismatch",
            ProbeErrorKind::Timeout => "Timeout",
            ProbeErrorKind::TransportError => "TransportError",
            ProbeErrorKind::MalformedHealthDocument => "MalformedHealthDocument",
            ProbeErrorKind::Unhealthy => "Unhealthy",
        };
        f.write_str(s)
    }
}

/// Result of one attempt of one probe. Never mutated: a retry produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    pub expected_status: u16,
    pub actual_status: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub passed: bool,
    pub attempt: u32,
    pub error: Option<String>,
    pub error_kind: Option<ProbeErrorKind>,
}

impl ProbeResult {
    pub fn passed(spec: &ProbeSpec, attempt: u32, status: u16, elapsed: Duration) -> Self {
        ProbeResult {
            name: spec.name.clone(),
            path: spec.path.clone(),
            method: spec.method,
            expected_status: spec.expected_status,
            actual_status: Some(status),
            response_time_ms: Some(elapsed.as_millis() as u64),
            passed: true,
            attempt,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(
        spec: &ProbeSpec,
        attempt: u32,
        status: Option<u16>,
        elapsed: Option<Duration>,
        kind: ProbeErrorKind,
        message: impl Into<String>,
    ) -> Self {
        ProbeResult {
            name: spec.name.clone(),
            path: spec.path.clone(),
            method: spec.method,
            expected_status: spec.expected_status,
            actual_status: status,
            response_time_ms: elapsed.map(|d| d.as_millis() as u64),
            passed: false,
            attempt,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    /// True when retrying cannot change the verdict.
    pub fn is_final(&self) -> bool {
        self.passed || self.error_kind.is_some_and(|k| !k.is_retryable())
    }

    /// One line explaining why the probe failed.
    pub fn failure_reason(&self) -> Option<String> {
        if self.passed {
            return None;
        }
        match (&self.error_kind, &self.error, self.actual_status) {
            (Some(ProbeErrorKind::StatusMismatch), _, Some(actual)) => Some(format!(
                "expected {}, got {}",
                self.expected_status, actual
            )),
            (_, Some(message), _) => Some(message.clone()),
            _ => Some(format!("expected {}", self.expected_status)),
        }
    }
}
