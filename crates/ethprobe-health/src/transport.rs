//! HTTP transport for JSON-RPC calls.
//!
//! `RpcTransport` is the seam between the checker and the network: it
//! takes an encoded request body and returns the raw response body.
//! `HttpTransport` implements it with a one-shot hyper HTTP/1.1
//! connection per call, wrapped in rustls for `https://` endpoints.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HOST, USER_AGENT};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use ethprobe_core::RpcEndpoint;

use crate::error::{HealthError, HealthResult};

/// Sends one encoded JSON-RPC request and returns the response body.
///
/// Implementations report every network-level failure (including
/// non-2xx statuses and timeouts) as `HealthError::Transport`.
pub trait RpcTransport: Send + Sync {
    fn post(&self, body: Bytes) -> impl Future<Output = HealthResult<Bytes>> + Send;
}

impl<T: RpcTransport> RpcTransport for Arc<T> {
    fn post(&self, body: Bytes) -> impl Future<Output = HealthResult<Bytes>> + Send {
        (**self).post(body)
    }
}

/// hyper-based transport bound to a single endpoint.
pub struct HttpTransport {
    endpoint: RpcEndpoint,
    timeout: Duration,
    tls: Option<TlsConnector>,
}

impl HttpTransport {
    /// Create a transport; `timeout` bounds each whole exchange.
    pub fn new(endpoint: RpcEndpoint, timeout: Duration) -> Self {
        let tls = endpoint.is_tls().then(tls_connector);
        Self {
            endpoint,
            timeout,
            tls,
        }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, body: Bytes) -> HealthResult<Bytes> {
        let stream = TcpStream::connect((self.endpoint.host(), self.endpoint.port()))
            .await
            .map_err(|e| transport_error("connect failed", e))?;

        match &self.tls {
            Some(connector) => {
                let server_name = ServerName::try_from(self.endpoint.host().to_string())
                    .map_err(|e| transport_error("invalid TLS server name", e))?;
                let stream = connector
                    .connect(server_name, stream)
                    .await
                    .map_err(|e| transport_error("TLS handshake failed", e))?;
                self.send(TokioIo::new(stream), body).await
            }
            None => self.send(TokioIo::new(stream), body).await,
        }
    }

    async fn send<I>(&self, io: TokioIo<I>, body: Bytes) -> HealthResult<Bytes>
    where
        I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(io)
            .await
            .map_err(|e| transport_error("HTTP handshake failed", e))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "rpc connection closed with error");
            }
        });

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.endpoint.path_and_query())
            .header(HOST, self.endpoint.authority())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("ethprobe/", env!("CARGO_PKG_VERSION")))
            .body(Full::new(body))
            .map_err(|e| transport_error("invalid request", e))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| transport_error("request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, endpoint = %self.endpoint, "rpc endpoint returned non-2xx");
            return Err(HealthError::Transport(format!("HTTP status {status}")));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?
            .to_bytes();
        Ok(body)
    }
}

impl RpcTransport for HttpTransport {
    async fn post(&self, body: Bytes) -> HealthResult<Bytes> {
        match tokio::time::timeout(self.timeout, self.exchange(body)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(endpoint = %self.endpoint, timeout = ?self.timeout, "rpc request timed out");
                Err(HealthError::Transport(format!(
                    "request timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

fn tls_connector() -> TlsConnector {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

fn transport_error(context: &str, err: impl fmt::Display) -> HealthError {
    HealthError::Transport(format!("{context}: {err}"))
}
