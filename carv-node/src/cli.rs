//! Command-line argument structure, via `clap` derive.
//!
//! Every flag has an environment-variable fallback for container
//! deployments.

use clap::Parser;

/// Carv Coin protocol indexer.
///
/// Follows the Bitcoin chain from a starting height, extracts Carv protocol
/// operations, and serves the indexed view over a read-only JSON API.
#[derive(Parser, Debug)]
#[command(name = "carv-node", about = "Indexer for the Carv Coin protocol", version)]
pub struct Cli {
    /// Starting block height. Ignored when the database already holds a
    /// higher indexed height.
    #[arg(long, env = "CARV_HEIGHT", default_value_t = 823_122)]
    pub height: u32,

    /// Network to follow: mainnet or testnet.
    #[arg(long, env = "CARV_NETWORK", default_value = "mainnet")]
    pub network: String,

    /// Enable debug mode: fixture data in the store and debug-level logs.
    #[arg(long)]
    pub debug: bool,

    /// Database file path; pass an empty string to disable persistence.
    #[arg(long, env = "CARV_DB_FILE_PATH", default_value = "./indexer.db")]
    pub db_file_path: String,

    /// Bind address for the query API.
    #[arg(long, env = "CARV_API_ADDR", default_value = "0.0.0.0:8080")]
    pub api_addr: String,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, env = "CARV_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["carv-node"]);
        assert_eq!(cli.height, 823_122);
        assert_eq!(cli.network, "mainnet");
        assert!(!cli.debug);
        assert_eq!(cli.db_file_path, "./indexer.db");
        assert_eq!(cli.api_addr, "0.0.0.0:8080");
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_custom_flags() {
        let cli = Cli::parse_from([
            "carv-node",
            "--height",
            "840000",
            "--network",
            "testnet",
            "--debug",
            "--db-file-path",
            "",
            "--api-addr",
            "127.0.0.1:9090",
        ]);
        assert_eq!(cli.height, 840_000);
        assert_eq!(cli.network, "testnet");
        assert!(cli.debug);
        assert!(cli.db_file_path.is_empty());
        assert_eq!(cli.api_addr, "127.0.0.1:9090");
    }
}
