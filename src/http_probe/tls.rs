use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::net::{TcpStream, lookup_host};
use tokio_native_tls::TlsConnector as TokioTlsConnector;
use url::Url;
use x509_parser::parse_x509_certificate;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Launch-readiness view of the target's certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateCheck {
    /// Target is plain HTTP.
    NotApplicable,
    Valid { days_remaining: i64 },
    ExpiringSoon { days_remaining: i64 },
    Expired { days_ago: i64 },
    Unavailable,
}

impl CertificateCheck {
    pub fn classify(days_remaining: i64, warn_days: i64) -> Self {
        if days_remaining < 0 {
            CertificateCheck::Expired {
                days_ago: -days_remaining,
            }
        } else if days_remaining < warn_days {
            CertificateCheck::ExpiringSoon { days_remaining }
        } else {
            CertificateCheck::Valid { days_remaining }
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            CertificateCheck::ExpiringSoon { .. }
                | CertificateCheck::Expired { .. }
                | CertificateCheck::Unavailable
        )
    }
}

impl std::fmt::Display for CertificateCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertificateCheck::NotApplicable => write!(f, "not applicable (plain HTTP)"),
            CertificateCheck::Valid { days_remaining } => {
                write!(f, "valid for {days_remaining} more day(s)")
            }
            CertificateCheck::ExpiringSoon { days_remaining } => {
                write!(f, "expires in {days_remaining} day(s)")
            }
            CertificateCheck::Expired { days_ago } => write!(f, "expired {days_ago} day(s) ago"),
            CertificateCheck::Unavailable => write!(f, "could not be read"),
        }
    }
}

/// Setup a TLS connector that accepts invalid certificates, so that expired
/// certificates can still be inspected.
pub fn setup_tls_connector() -> Result<TokioTlsConnector, native_tls::Error> {
    let mut builder = native_tls::TlsConnector::builder();
    builder.danger_accept_invalid_certs(true);
    let connector = builder.build()?;
    Ok(TokioTlsConnector::from(connector))
}

/// Inspect the certificate served for `base_url`. Informational only.
pub async fn check_certificate(base_url: &Url, warn_days: i64) -> CertificateCheck {
    if base_url.scheme() != "https" {
        return CertificateCheck::NotApplicable;
    }
    let Some(host) = base_url.host_str() else {
        return CertificateCheck::Unavailable;
    };
    let port = base_url.port_or_known_default().unwrap_or(443);

    let connector = match setup_tls_connector() {
        Ok(connector) => connector,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build TLS connector");
            return CertificateCheck::Unavailable;
        }
    };

    let lookup = tokio::time::timeout(
        HANDSHAKE_TIMEOUT,
        get_cert_validity_days(host, port, &connector),
    );
    match lookup.await {
        Ok(Some(days)) => CertificateCheck::classify(days, warn_days),
        Ok(None) | Err(_) => {
            tracing::warn!(host, "Could not read TLS certificate");
            CertificateCheck::Unavailable
        }
    }
}

async fn get_cert_validity_days(
    host: &str,
    port: u16,
    connector: &TokioTlsConnector,
) -> Option<i64> {
    let socket_addr = lookup_host((host, port)).await.ok()?.next()?;
    let stream = TcpStream::connect(socket_addr).await.ok()?;
    let tls_stream = connector.connect(host, stream).await.ok()?;

    // Extract certificate in blocking context
    let cert_der = tokio::task::spawn_blocking(move || {
        let cert = tls_stream.get_ref().peer_certificate().ok().flatten()?;
        cert.to_der().ok()
    })
    .await
    .ok()??;

    let (_, parsed) = parse_x509_certificate(&cert_der).ok()?;

    let not_after = parsed.validity().not_after.timestamp();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs() as i64;

    Some(days_until(not_after, now))
}

/// Whole days from `now` to `not_after`, rounded down so anything already past is negative.
fn days_until(not_after: i64, now: i64) -> i64 {
    (not_after - now).div_euclid(86_400)
}
