use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use ethprobe_core::config::{ChainConfig, NodeConfig, RetryConfig, RpcConfig};
use ethprobe_core::{
    ChainStatus, ConfigError, ConfigResult, ProbeConfig, ProbeTarget, describe_chain,
    parse_duration,
};
use ethprobe_health::HealthChecker;

use super::OutputFormat;
use crate::exit::CliError;

const DEFAULT_CONFIG_FILE: &str = "ethprobe.toml";

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to ethprobe.toml (default: ./ethprobe.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint, http:// or https://
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Expected chain id, in decimal
    #[arg(long, conflicts_with = "network")]
    pub chain_id: Option<u64>,

    /// Expected network by name (mainnet, sepolia, holesky, ...)
    #[arg(short, long)]
    pub network: Option<String>,

    /// Name of the node, used in log output
    #[arg(long)]
    pub name: Option<String>,

    /// Total attempts before giving up (default 3)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Pause between attempts, e.g. 2s or 500ms (default 2s)
    #[arg(long)]
    pub retry_delay: Option<String>,

    /// Per-request timeout (default 10s)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Stop at the first wrong-chain answer instead of retrying
    #[arg(long, overrides_with = "no_fail_fast_on_mismatch")]
    pub fail_fast_on_mismatch: bool,

    /// Retry wrong-chain answers even if the config file says otherwise
    #[arg(long, overrides_with = "fail_fast_on_mismatch")]
    pub no_fail_fast_on_mismatch: bool,

    /// Overall deadline for the whole check, e.g. 60s
    #[arg(long)]
    pub deadline: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    /// Settings given on the command line, as a config layer.
    fn overrides(&self) -> ProbeConfig {
        ProbeConfig {
            node: self.name.clone().map(|name| NodeConfig { name: Some(name) }),
            rpc: Some(RpcConfig {
                endpoint: self.endpoint.clone(),
                timeout: self.timeout.clone(),
            }),
            chain: Some(ChainConfig {
                chain_id: self.chain_id,
                network: self.network.clone(),
            }),
            retry: Some(RetryConfig {
                max_attempts: self.max_attempts,
                delay: self.retry_delay.clone(),
                fail_fast_on_mismatch: self.fail_fast(),
            }),
        }
    }

    fn fail_fast(&self) -> Option<bool> {
        match (self.fail_fast_on_mismatch, self.no_fail_fast_on_mismatch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn load_file(&self) -> ConfigResult<ProbeConfig> {
        match &self.config {
            Some(path) => ProbeConfig::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                debug!(path = DEFAULT_CONFIG_FILE, "using config from working directory");
                ProbeConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(ProbeConfig::default()),
        }
    }

    fn deadline(&self) -> ConfigResult<Option<Duration>> {
        self.deadline
            .as_deref()
            .map(|raw| {
                parse_duration(raw).ok_or_else(|| ConfigError::InvalidValue {
                    field: "--deadline",
                    reason: format!("not a duration: {raw:?}"),
                })
            })
            .transpose()
    }

    pub fn resolve(&self) -> ConfigResult<ProbeTarget> {
        self.load_file()?.merge(self.overrides()).resolve()
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    healthy: bool,
    node: Option<&'a str>,
    endpoint: &'a str,
    expected_chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let target = args.resolve()?;
    let deadline = args.deadline()?;

    info!(
        node = target.node_name.as_deref().unwrap_or("-"),
        endpoint = %target.endpoint,
        expected_chain = %describe_chain(target.expected_chain_id),
        "checking node"
    );

    let checker = HealthChecker::http(target.endpoint.clone(), target.policy.request_timeout);
    let check = checker.run_health_check(target.expected_chain_id, &target.policy);
    let outcome: anyhow::Result<ChainStatus> = match deadline {
        Some(limit) => match tokio::time::timeout(limit, check).await {
            Ok(result) => result.map_err(anyhow::Error::from),
            Err(_) => Err(CliError::DeadlineExceeded(limit).into()),
        },
        None => check.await.map_err(anyhow::Error::from),
    };

    print_report(&target, &outcome, args.format)?;
    outcome.map(|_| ())
}

fn print_report(
    target: &ProbeTarget,
    outcome: &anyhow::Result<ChainStatus>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = Report {
        healthy: outcome.is_ok(),
        node: target.node_name.as_deref(),
        endpoint: target.endpoint.as_str(),
        expected_chain_id: target.expected_chain_id,
        block_number: outcome.as_ref().ok().map(|s| s.block_number),
        chain_id: outcome.as_ref().ok().map(|s| s.chain_id),
        network: outcome
            .as_ref()
            .ok()
            .and_then(|s| s.network())
            .map(|n| n.to_string()),
        error: outcome.as_ref().err().map(|e| e.to_string()),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to render report")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            if let Ok(status) = outcome {
                println!("✓ {} is healthy", target.endpoint);
                println!("  Block:    {}", status.block_number);
                println!("  Chain id: {}", describe_chain(status.chain_id));
            }
        }
    }
    Ok(())
}
