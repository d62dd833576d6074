//! Shared types used across ethprobe crates.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Block height and chain id reported by a node, decoded from hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainStatus {
    pub block_number: u64,
    pub chain_id: u64,
}

impl ChainStatus {
    /// The well-known network this chain id belongs to, if any.
    pub fn network(&self) -> Option<Network> {
        Network::from_chain_id(self.chain_id)
    }
}

/// Well-known Ethereum networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Sepolia,
    Holesky,
    Hoodi,
}

impl Network {
    pub const ALL: [Network; 7] = [
        Network::Mainnet,
        Network::Ropsten,
        Network::Rinkeby,
        Network::Goerli,
        Network::Sepolia,
        Network::Holesky,
        Network::Hoodi,
    ];

    pub fn chain_id(self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
            Network::Goerli => 5,
            Network::Sepolia => 11_155_111,
            Network::Holesky => 17_000,
            Network::Hoodi => 560_048,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
            Network::Holesky => "holesky",
            Network::Hoodi => "hoodi",
        }
    }

    /// Networks that have been shut down. Still recognized so a node that
    /// reports one of them is named correctly in mismatch messages.
    pub fn is_deprecated(self) -> bool {
        matches!(self, Network::Ropsten | Network::Rinkeby | Network::Goerli)
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "ethereum" {
            return Ok(Network::Mainnet);
        }
        Self::ALL
            .into_iter()
            .find(|n| n.name() == lower)
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a chain id with its network name when known, e.g. `1 (mainnet)`.
pub fn describe_chain(chain_id: u64) -> String {
    match Network::from_chain_id(chain_id) {
        Some(network) => format!("{chain_id} ({network})"),
        None => chain_id.to_string(),
    }
}

/// Bounded, fixed-delay retry settings for a health check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Pause between attempts; not applied after the last one.
    pub retry_delay: Duration,
    /// Per-request budget covering connect, TLS, and response body.
    pub request_timeout: Duration,
    /// Stop on the first wrong-chain answer instead of retrying it.
    pub fail_fast_on_mismatch: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fail_fast_on_mismatch: false,
        }
    }
}
