//! ethprobe.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::RpcEndpoint;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{Network, RetryPolicy};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub node: Option<NodeConfig>,
    pub rpc: Option<RpcConfig>,
    pub chain: Option<ChainConfig>,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub endpoint: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: Option<u64>,
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub delay: Option<String>,
    pub fail_fast_on_mismatch: Option<bool>,
}

/// A fully validated health check target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub node_name: Option<String>,
    pub endpoint: RpcEndpoint,
    pub expected_chain_id: u64,
    pub policy: RetryPolicy,
}

impl ProbeConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    ///
    /// The `[chain]` section is replaced as a unit when the override names
    /// either a chain id or a network, so `--network sepolia` is not
    /// shadowed by a `chain_id` coming from the file.
    pub fn merge(self, overrides: ProbeConfig) -> ProbeConfig {
        let node = merge_section(self.node, overrides.node, |base, top| NodeConfig {
            name: top.name.or(base.name),
        });
        let rpc = merge_section(self.rpc, overrides.rpc, |base, top| RpcConfig {
            endpoint: top.endpoint.or(base.endpoint),
            timeout: top.timeout.or(base.timeout),
        });
        let chain = merge_section(self.chain, overrides.chain, |base, top| {
            if top.chain_id.is_some() || top.network.is_some() {
                top
            } else {
                base
            }
        });
        let retry = merge_section(self.retry, overrides.retry, |base, top| RetryConfig {
            max_attempts: top.max_attempts.or(base.max_attempts),
            delay: top.delay.or(base.delay),
            fail_fast_on_mismatch: top.fail_fast_on_mismatch.or(base.fail_fast_on_mismatch),
        });

        ProbeConfig {
            node,
            rpc,
            chain,
            retry,
        }
    }

    /// Validate every setting and produce the target to check.
    pub fn resolve(&self) -> ConfigResult<ProbeTarget> {
        let rpc = self.rpc.clone().unwrap_or_default();
        let endpoint = rpc.endpoint.as_deref().ok_or(ConfigError::Missing("rpc.endpoint"))?;
        let endpoint = RpcEndpoint::parse(endpoint)?;

        let chain = self.chain.clone().unwrap_or_default();
        let expected_chain_id = match (chain.chain_id, chain.network.as_deref()) {
            (Some(id), _) => id,
            (None, Some(name)) => name.parse::<Network>()?.chain_id(),
            (None, None) => return Err(ConfigError::Missing("chain.chain_id or chain.network")),
        };

        let mut policy = RetryPolicy::default();
        if let Some(timeout) = rpc.timeout.as_deref() {
            policy.request_timeout = require_duration("rpc.timeout", timeout)?;
            if policy.request_timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field: "rpc.timeout",
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        let retry = self.retry.clone().unwrap_or_default();
        if let Some(max_attempts) = retry.max_attempts {
            if max_attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "retry.max_attempts",
                    reason: "must be at least 1".to_string(),
                });
            }
            policy.max_attempts = max_attempts;
        }
        if let Some(delay) = retry.delay.as_deref() {
            policy.retry_delay = require_duration("retry.delay", delay)?;
        }
        if let Some(fail_fast) = retry.fail_fast_on_mismatch {
            policy.fail_fast_on_mismatch = fail_fast;
        }

        Ok(ProbeTarget {
            node_name: self.node.as_ref().and_then(|n| n.name.clone()),
            endpoint,
            expected_chain_id,
            policy,
        })
    }

    /// Scaffold a starter ethprobe.toml for a node.
    pub fn scaffold(name: &str, endpoint: &str, network: Network) -> Self {
        ProbeConfig {
            node: Some(NodeConfig {
                name: Some(name.to_string()),
            }),
            rpc: Some(RpcConfig {
                endpoint: Some(endpoint.to_string()),
                timeout: Some("10s".to_string()),
            }),
            chain: Some(ChainConfig {
                chain_id: None,
                network: Some(network.name().to_string()),
            }),
            retry: Some(RetryConfig {
                max_attempts: Some(3),
                delay: Some("2s".to_string()),
                fail_fast_on_mismatch: Some(false),
            }),
        }
    }
}

fn merge_section<T>(base: Option<T>, top: Option<T>, combine: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, top) {
        (Some(base), Some(top)) => Some(combine(base, top)),
        (base, top) => top.or(base),
    }
}

fn require_duration(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::InvalidValue {
        field,
        reason: format!("not a duration: {value:?} (expected e.g. 500ms, 2s, 1m)"),
    })
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
