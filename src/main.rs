//! rpcscout CLI: resolve a chain ID or name to working RPC endpoints.
//!
//! Fetches chain data from `chainlist.org`, caches it locally, and probes
//! the listed endpoints concurrently to find ones that answer `eth_chainId`
//! correctly within the timeout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chain_directory::{ChainRecord, DirectoryStore, StoreOptions};

#[derive(Debug, Parser)]
#[command(author, version, about = "Find working RPC endpoints for a blockchain network")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Chain ID (number) or chain name (string).
    #[arg(value_name = "CHAIN")]
    chain: Option<String>,

    #[command(flatten)]
    probe: ProbeFlags,

    #[command(flatten)]
    common: CommonFlags,
}

#[derive(Debug, Clone, Args)]
struct CommonFlags {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Force rebuild of the chain data cache.
    #[arg(short, long, global = true)]
    force: bool,

    /// Cache directory override (defaults to the platform cache dir).
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ProbeFlags {
    /// Timeout for RPC probing, in milliseconds.
    #[arg(short, long, default_value_t = 200, value_name = "MS")]
    timeout_ms: u64,

    /// Print candidate RPC URLs without probing them.
    #[arg(long)]
    no_test: bool,

    /// Only consider WebSocket RPC URLs.
    #[arg(long)]
    wss: bool,

    /// Only consider HTTPS RPC URLs.
    #[arg(long)]
    https: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find all working RPC endpoints for a chain.
    All {
        /// Chain ID (number) or chain name (string).
        #[arg(value_name = "CHAIN")]
        chain: String,
        #[command(flatten)]
        probe: ProbeFlags,
    },
    /// Get the chain ID for a chain name.
    Id {
        #[arg(value_name = "NAME")]
        chain_name: String,
    },
    /// Get the chain name for a chain ID.
    Name {
        #[arg(value_name = "ID")]
        chain_id: u64,
    },
    /// Manage the local chain data cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Download fresh chain data and rebuild the cache.
    Build,
    /// Remove the cache artifact, forcing a fresh download on next use.
    Clean,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(common: &CommonFlags) -> Result<DirectoryStore> {
    DirectoryStore::open(StoreOptions {
        cache_dir: common.cache_dir.clone(),
        force_rebuild: common.force,
        ..StoreOptions::default()
    })
    .context("open chain directory cache")
}

/// Numeric input is a chain ID, everything else a chain name.
fn lookup(store: &DirectoryStore, identifier: &str) -> Result<ChainRecord> {
    let record = match identifier.parse::<u64>() {
        Ok(chain_id) => store.chain_by_id(chain_id)?,
        Err(_) => store.chain_by_name(identifier)?,
    };
    tracing::debug!(chain_id = record.chain_id, name = %record.name, "resolved chain");
    Ok(record)
}

/// Non-empty candidate URLs, narrowed by the transport filter flags.
fn candidate_urls(record: &ChainRecord, probe: &ProbeFlags) -> Vec<String> {
    record
        .rpc_urls()
        .into_iter()
        .filter(|url| !probe.wss || rpc_probe::is_websocket_url(url))
        .filter(|url| !probe.https || url.starts_with("https://"))
        .collect()
}

async fn run_find(common: &CommonFlags, probe: &ProbeFlags, chain: &str, all: bool) -> Result<()> {
    let store = open_store(common)?;
    let record = lookup(&store, chain)?;

    let urls = candidate_urls(&record, probe);
    if urls.is_empty() {
        bail!("no known rpc urls for this chain at `chainlist.org`");
    }

    if probe.no_test {
        if all {
            for url in &urls {
                println!("{url}");
            }
        } else {
            println!("{}", urls[0]);
        }
        return Ok(());
    }

    let timeout = Duration::from_millis(probe.timeout_ms);
    if all {
        let working = rpc_probe::find_all_working(&urls, record.chain_id, timeout).await?;
        for url in working {
            println!("{url}");
        }
    } else {
        let url = rpc_probe::find_any_working(&urls, record.chain_id, timeout).await?;
        println!("{url}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);

    match &cli.command {
        None => {
            let Some(chain) = cli.chain.as_deref() else {
                bail!("expected a chain ID or chain name (see --help)");
            };
            run_find(&cli.common, &cli.probe, chain, false).await
        }
        Some(Command::All { chain, probe }) => run_find(&cli.common, probe, chain, true).await,
        Some(Command::Id { chain_name }) => {
            let store = open_store(&cli.common)?;
            let record = store.chain_by_name(chain_name)?;
            println!("{}", record.chain_id);
            Ok(())
        }
        Some(Command::Name { chain_id }) => {
            let store = open_store(&cli.common)?;
            let record = store.chain_by_id(*chain_id)?;
            println!("{}", record.name);
            Ok(())
        }
        Some(Command::Cache { action }) => {
            let store = open_store(&cli.common)?;
            match action {
                CacheAction::Build => store.rebuild().context("rebuild chain data cache")?,
                CacheAction::Clean => store.clean().context("remove chain data cache")?,
            }
            Ok(())
        }
    }
}
