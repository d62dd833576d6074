use std::path::Path;

use anyhow::Context;

use ethprobe_core::{Network, ProbeConfig, RpcEndpoint};

use crate::exit::CliError;

/// Write a starter ethprobe.toml, refusing to clobber an existing file
/// unless `force` is set.
pub fn init(path: &Path, name: &str, endpoint: &str, network: &str, force: bool) -> anyhow::Result<()> {
    let endpoint = RpcEndpoint::parse(endpoint)?;
    let network: Network = network.parse()?;

    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path.to_path_buf()).into());
    }

    let config = ProbeConfig::scaffold(name, endpoint.as_str(), network);
    std::fs::write(path, config.to_toml_string()?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("✓ Wrote {}", path.display());
    println!("  Endpoint: {endpoint}");
    println!("  Network:  {network} (chain id {})", network.chain_id());
    Ok(())
}
