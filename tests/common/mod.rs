use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use url::Url;

use smokebox::config::probe_config::{HttpMethod, ProbeSpec, SuiteConfig};

pub const HEALTHY_BODY: &str = r#"{"status":"healthy","checks":{"db":{"status":"ok"}}}"#;

/// What the mock server answers for one request.
pub enum MockReply {
    Respond { status: u16, body: String },
    /// Sleep before answering, to trip client timeouts.
    Hang(Duration),
}

impl MockReply {
    pub fn status(status: u16) -> Self {
        MockReply::Respond {
            status,
            body: String::new(),
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        MockReply::Respond {
            status,
            body: body.to_string(),
        }
    }
}

/// In-process HTTP/1 server. The handler gets the request path and the 1-based
/// number of times that path has been requested so far.
pub struct MockServer {
    pub addr: SocketAddr,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, usize) -> MockReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let handler = Arc::new(handler);
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();

        let server_hits = hits.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let hits = server_hits.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let handler = handler.clone();
                        let hits = hits.clone();
                        async move {
                            let path = req.uri().path().to_string();
                            let count = {
                                let mut hits = hits.lock().expect("hits lock");
                                let count = hits.entry(path.clone()).or_insert(0);
                                *count += 1;
                                *count
                            };
                            let (status, body) = match (*handler)(&path, count) {
                                MockReply::Respond { status, body } => (status, body),
                                MockReply::Hang(delay) => {
                                    tokio::time::sleep(delay).await;
                                    (200, String::new())
                                }
                            };
                            let response = Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from(body)))
                                .expect("response");
                            Ok::<_, Infallible>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        MockServer { addr, hits }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock url")
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .expect("hits lock")
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

pub fn health_and_home() -> Vec<ProbeSpec> {
    vec![
        ProbeSpec::new("Health", "/api/health", HttpMethod::Get, 200).health(),
        ProbeSpec::new("Home", "/", HttpMethod::Get, 200),
    ]
}

/// Production policy shape with test-sized timings.
pub fn fast_suite(probes: Vec<ProbeSpec>) -> SuiteConfig {
    SuiteConfig {
        probes,
        timeout_ms: 2_000,
        retry_delay_ms: 25,
        ..SuiteConfig::default()
    }
}
