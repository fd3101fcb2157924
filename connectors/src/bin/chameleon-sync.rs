//! Reconcile a component's saved sources against their backend and print
//! the result as JSON.

use anyhow::{Context, Result};
use chameleon_config::ChameleonConfig;
use chameleon_connectors::{ConnectorManager, ConnectorType};
use chameleon_models::{Source, SourcesQuery};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// CLI arguments for `chameleon-sync`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chameleon-sync",
    about = "Reconcile saved sources against their backend",
    long_about = "Reads a JSON list of saved sources, refreshes their availability \
                  and schema version flags through the configured connector and \
                  prints the reconciled sources as JSON."
)]
struct SyncArgs {
    /// Path to a JSON file containing the saved sources.
    #[arg(value_name = "path")]
    sources: PathBuf,
    /// Connector to sync through: `rest` or `ride_core`.
    #[arg(value_name = "connector", default_value = "ride_core")]
    connector: ConnectorType,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SyncArgs::parse();
    chameleon_observability::init_tracing_for("chameleon-sync");
    let config = ChameleonConfig::load().context("loading configuration")?;

    let path = args.sources.display().to_string();
    let content = std::fs::read_to_string(&args.sources).with_context(|| format!("reading {}", path))?;
    let sources: Vec<Source> =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path))?;

    let manager = ConnectorManager::new(config);
    let connector = manager.build_connector(args.connector, sources)?;

    let listing = connector.get_sources(&SourcesQuery::saved()).await?;
    info!(sources = listing.len(), connector = %args.connector, "Sync finished");

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
