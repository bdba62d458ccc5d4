//! HTTP printer bridge adapter
//!
//! Network printers are reached through a small HTTP bridge on the printer
//! (or a print server in front of it): `POST http://<ip>/print` with the raw
//! payload, `HEAD http://<ip>/` as the reachability probe.

use crate::error::{PrintError, PrintResult};
use crate::printer::Printer;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default timeout for the reachability probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Printer reachable over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpPrinter {
    ip_address: String,
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl HttpPrinter {
    /// Create an adapter for `ip_address` (host or host:port)
    pub fn new(ip_address: &str) -> PrintResult<Self> {
        let ip_address = ip_address.trim();
        if ip_address.is_empty() {
            return Err(PrintError::InvalidConfig(
                "IP address is required for network printing".to_string(),
            ));
        }
        Ok(Self {
            ip_address: ip_address.to_string(),
            client: reqwest::Client::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    /// Use a preconfigured client (shared pool, proxy)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.ip_address)
    }

    pub fn print_url(&self) -> String {
        format!("http://{}/print", self.ip_address)
    }

    /// HEAD the bridge root; true only on a success status
    #[instrument(skip(self), fields(ip = %self.ip_address))]
    pub async fn probe(&self) -> bool {
        let request = self
            .client
            .head(self.base_url())
            .timeout(self.probe_timeout);

        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Printer online");
                true
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "Printer answered probe with error");
                false
            }
            Err(e) if e.is_timeout() => {
                warn!("Printer check timeout");
                false
            }
            Err(e) => {
                warn!(error = %e, "Printer offline");
                false
            }
        }
    }

    /// POST the payload; no retry
    #[instrument(skip(self, data), fields(ip = %self.ip_address, data_len = data.len()))]
    pub async fn send(&self, data: &[u8]) -> PrintResult<()> {
        info!("Sending print job");

        let resp = self
            .client
            .post(self.print_url())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Print job rejected");
            return Err(PrintError::HttpStatus(status.as_u16()));
        }

        info!("Print job sent successfully");
        Ok(())
    }
}

impl Printer for HttpPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        self.send(data).await
    }

    async fn is_online(&self) -> bool {
        self.probe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Received {
        bodies: Vec<Vec<u8>>,
        content_types: Vec<String>,
    }

    async fn spawn_bridge(status: StatusCode) -> (String, Arc<Mutex<Received>>) {
        let received = Arc::new(Mutex::new(Received::default()));
        let state = received.clone();

        let app = Router::new()
            .route(
                "/print",
                post(move |headers: HeaderMap, body: Bytes| {
                    let state = state.clone();
                    async move {
                        let mut r = state.lock().unwrap();
                        r.bodies.push(body.to_vec());
                        r.content_types.push(
                            headers
                                .get("content-type")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string(),
                        );
                        status
                    }
                }),
            )
            .route("/", axum::routing::get(move || async move { status }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr.to_string(), received)
    }

    #[test]
    fn test_requires_address() {
        assert!(matches!(
            HttpPrinter::new("  "),
            Err(PrintError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_urls() {
        let printer = HttpPrinter::new("10.0.0.5").unwrap();
        assert_eq!(printer.base_url(), "http://10.0.0.5/");
        assert_eq!(printer.print_url(), "http://10.0.0.5/print");
    }

    #[tokio::test]
    async fn test_send_success() {
        let (addr, received) = spawn_bridge(StatusCode::OK).await;
        let printer = HttpPrinter::new(&addr).unwrap();

        printer.send(b"\x1B@hello").await.unwrap();

        let r = received.lock().unwrap();
        assert_eq!(r.bodies, vec![b"\x1B@hello".to_vec()]);
        assert_eq!(r.content_types, vec!["application/octet-stream"]);
    }

    #[tokio::test]
    async fn test_send_error_status_surfaces_code() {
        let (addr, _) = spawn_bridge(StatusCode::INTERNAL_SERVER_ERROR).await;
        let printer = HttpPrinter::new(&addr).unwrap();

        let err = printer.send(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::HttpStatus(500)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_send_unreachable_is_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let printer = HttpPrinter::new(&addr.to_string()).unwrap();
        let err = printer.send(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::Connection(_) | PrintError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_probe() {
        let (online, _) = spawn_bridge(StatusCode::OK).await;
        assert!(HttpPrinter::new(&online).unwrap().is_online().await);

        let (broken, _) = spawn_bridge(StatusCode::SERVICE_UNAVAILABLE).await;
        assert!(!HttpPrinter::new(&broken).unwrap().is_online().await);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let offline = HttpPrinter::new(&addr.to_string())
            .unwrap()
            .with_probe_timeout(Duration::from_millis(500));
        assert!(!offline.is_online().await);
    }
}
