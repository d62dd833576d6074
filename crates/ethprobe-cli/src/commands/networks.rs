use anyhow::Context;
use serde::Serialize;

use ethprobe_core::Network;

use super::OutputFormat;

#[derive(Debug, Serialize)]
struct NetworkEntry {
    name: &'static str,
    chain_id: u64,
    chain_id_hex: String,
    deprecated: bool,
}

fn entries() -> Vec<NetworkEntry> {
    Network::ALL
        .into_iter()
        .map(|n| NetworkEntry {
            name: n.name(),
            chain_id: n.chain_id(),
            chain_id_hex: ethprobe_health::encode_quantity(n.chain_id()),
            deprecated: n.is_deprecated(),
        })
        .collect()
}

pub fn list(format: OutputFormat) -> anyhow::Result<()> {
    let entries = entries();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).context("failed to render networks")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!("{:<10} {:>10}  {:<10}", "NETWORK", "CHAIN ID", "HEX");
            for e in &entries {
                let note = if e.deprecated { "  (deprecated)" } else { "" };
                println!("{:<10} {:>10}  {:<10}{note}", e.name, e.chain_id, e.chain_id_hex);
            }
        }
    }
    Ok(())
}
