//! Entry point for the `carv-node` binary.
//!
//! Wires the pieces together: RocksDB-backed store, Esplora block source,
//! protocol parsers, the ingestion loop, and the query API. Runs until the
//! ingestion loop hits a fatal error or a shutdown signal arrives.

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use carv_api::ApiConfig;
use carv_core::CoinView;
use carv_extract::{MempoolClient, Network};
use carv_ingest::{run_indexer, Loader, Transformer};
use carv_store::{CoinStore, Kv, RocksKv};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "debug"
    } else {
        cli.log_level.as_str()
    };
    logging::init(default_level, cli.log_json);

    let network: Network = cli
        .network
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let kv: Option<Box<dyn Kv>> = if cli.db_file_path.is_empty() {
        info!("persistence disabled");
        None
    } else {
        let kv = RocksKv::open(&cli.db_file_path)
            .with_context(|| format!("failed to open database at {}", cli.db_file_path))?;
        Some(Box::new(kv))
    };
    let store = Arc::new(
        CoinStore::open(kv, network.name(), cli.debug).context("failed to open coin store")?,
    );

    // A non-empty database dictates where to resume, not the CLI.
    let (stored_height, stored_network) = store.status();
    let start_height = if stored_height != 0 {
        warn!(
            height = stored_height + 1,
            network = %stored_network,
            "database holds indexed state, overriding --height"
        );
        stored_height + 1
    } else {
        cli.height
    };

    let client = MempoolClient::new(network);
    let transformer = Transformer::bitcoin(Arc::clone(&store) as Arc<dyn CoinView>);
    let loader = Loader::new(Arc::clone(&store));

    let api_config = ApiConfig {
        listen_addr: cli
            .api_addr
            .parse()
            .with_context(|| format!("invalid --api-addr {}", cli.api_addr))?,
        cors_enabled: true,
    };
    let api = tokio::spawn(carv_api::serve(api_config, Arc::clone(&store)));

    info!(
        network = network.name(),
        height = start_height,
        "starting indexer"
    );

    tokio::select! {
        result = run_indexer(client, transformer, loader, start_height) => {
            result.context("ingestion loop failed")?;
        }
        result = api => {
            match result {
                Ok(server_result) => server_result.context("API server failed")?,
                Err(join_error) => return Err(join_error).context("API server task panicked"),
            }
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received, closing store");
        }
    }
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
