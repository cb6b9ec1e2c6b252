//! Connection strategies used by individual probe attempts.

use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::{Client, redirect::Policy};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::ProbeError;

/// Port spoken to over HTTPS by default.
const HTTPS_PORT: u16 = 443;

/// One connectivity attempt against `host:port`.
///
/// Implementations own whatever socket they open and must release it
/// before returning.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError>;
}

/// `host:port` with IPv6 literals bracketed.
fn socket_target(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Plain TCP connect. Success means the three-way handshake completed.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError> {
        let target = socket_target(host, port);
        match timeout(self.connect_timeout, TcpStream::connect(&target)).await {
            Ok(Ok(stream)) => {
                trace!("[PROBE] TCP connected to {target}");
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(ProbeError::Connect(e.to_string())),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

/// HTTP `HEAD /` request. Any response, whatever its status, counts as success.
///
/// The TLS port (443 unless overridden) is spoken to over HTTPS with
/// certificate verification disabled; every other port over plain HTTP.
/// Redirects are not followed.
#[derive(Debug, Clone)]
pub struct HttpHeadConnector {
    client: Client,
    tls_port: u16,
}

impl HttpHeadConnector {
    pub fn new(request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_default();
        Self {
            client,
            tls_port: HTTPS_PORT,
        }
    }

    /// Speak HTTPS on `port` instead of 443.
    #[must_use]
    pub fn with_tls_port(mut self, port: u16) -> Self {
        self.tls_port = port;
        self
    }

    fn url(&self, host: &str, port: u16) -> String {
        let target = socket_target(host, port);
        if port == self.tls_port {
            format!("https://{target}/")
        } else {
            format!("http://{target}/")
        }
    }
}

#[async_trait]
impl Connector for HttpHeadConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError> {
        let url = self.url(host, port);
        let response = self.client.head(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout
            } else {
                ProbeError::Http(e.to_string())
            }
        })?;
        trace!("[PROBE] HEAD {url} -> {}", response.status());
        Ok(())
    }
}
