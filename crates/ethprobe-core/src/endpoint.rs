//! JSON-RPC endpoint URL validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{ConfigError, ConfigResult};

/// A validated `http://` or `https://` JSON-RPC endpoint.
///
/// The URL is split once at validation time so transports never have to
/// re-parse it: `http://localhost:8545/rpc?key=x` becomes host `localhost`,
/// port `8545`, path `/rpc?key=x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RpcEndpoint {
    url: String,
    tls: bool,
    authority: String,
    host: String,
    port: u16,
    path: String,
}

impl RpcEndpoint {
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(invalid(format!(
                    "scheme must be http:// or https://, got {other}://"
                )));
            }
        };
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials in the URL are not supported".to_string()));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) if is_hostname(domain) => domain.to_string(),
            Some(Host::Domain(domain)) => {
                return Err(invalid(format!("invalid host name {domain:?}")));
            }
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(invalid("missing host".to_string())),
        };
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port".to_string()))?;

        // `host_str` keeps IPv6 brackets; `port` is None for the scheme default.
        let host_str = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };

        // Fragments are never sent on the wire.
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        Ok(Self {
            url: raw.to_string(),
            tls,
            authority,
            host,
            port,
            path,
        })
    }

    /// The URL as originally supplied (trimmed).
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Host without IPv6 brackets, suitable for DNS lookup and TLS SNI.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host[:port]` for the `Host` header; a default port is left out.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path and query to request; always starts with `/`.
    pub fn path_and_query(&self) -> &str {
        &self.path
    }
}

/// Letters, digits, `-`, `_` and `.`; IDNs arrive here already punycoded.
fn is_hostname(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl TryFrom<String> for RpcEndpoint {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RpcEndpoint> for String {
    fn from(endpoint: RpcEndpoint) -> Self {
        endpoint.url
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
