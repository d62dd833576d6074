use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit;

use commands::OutputFormat;
use commands::check::CheckArgs;

#[derive(Parser)]
#[command(
    name = "ethprobe",
    about = "ethprobe — health checks for Ethereum execution-client JSON-RPC endpoints",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a node answers JSON-RPC and serves the expected chain.
    ///
    /// Settings come from ethprobe.toml (--config, or ./ethprobe.toml when
    /// present) with command-line flags taking precedence.
    ///
    /// Exit codes: 0 healthy, 1 error, 2 invalid input,
    /// 3 health check exhausted, 4 network mismatch.
    Check(CheckArgs),
    /// Write a starter ethprobe.toml
    Init {
        /// Where to write the file
        #[arg(short, long, default_value = "ethprobe.toml")]
        path: PathBuf,
        /// Node name used in log output
        #[arg(long, default_value = "execution-client")]
        name: String,
        /// JSON-RPC endpoint of the node
        #[arg(short, long, default_value = "http://127.0.0.1:8545")]
        endpoint: String,
        /// Expected network (see `ethprobe networks`)
        #[arg(short, long, default_value = "mainnet")]
        network: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List well-known networks and their chain ids
    Networks {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn,ethprobe=info",
        1 => "info,ethprobe=debug",
        _ => "debug,ethprobe=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Init {
            path,
            name,
            endpoint,
            network,
            force,
        } => commands::init::init(&path, &name, &endpoint, &network, force),
        Commands::Networks { format } => commands::networks::list(format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit::code_for(&e))
        }
    }
}
