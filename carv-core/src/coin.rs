//! Coin state types: the durable entities the indexer maintains.

use serde::{Deserialize, Serialize};

/// Deployment parameters of a coin.
///
/// `max * sats` is the total BTC locked if the coin mints out, capped at 1%
/// of Bitcoin's ultimate supply by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinArgs {
    /// Maximum total supply, in coin units.
    pub max: u64,
    /// Satoshis representing one unit of the coin on-chain.
    pub sats: u64,
    /// Per-mint limit.
    pub limit: u64,
}

/// One deployed coin.
///
/// Created exactly once on a successful deploy, never deleted. `total_supply`,
/// `tx_count` and `holder_count` are mutated only by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    /// 1–6 uppercase-letter identifier.
    pub id: String,
    /// Units currently live in the UTXO set.
    pub total_supply: u64,
    /// Deployment parameters.
    pub args: CoinArgs,
    /// Number of transactions that affected this coin.
    pub tx_count: u64,
    /// Addresses with a non-zero balance.
    pub holder_count: u64,
    /// Block height at deploy.
    pub created_at: u32,
    /// Transaction that deployed the coin.
    #[serde(default)]
    pub deploy_tx: String,
    /// Block height of the deploying transaction.
    #[serde(default)]
    pub deploy_height: u32,
}

/// Coins sitting on one Bitcoin UTXO.
///
/// Created when a transaction output carries coins (mint or transfer credit),
/// destroyed when that UTXO shows up as an input of a later transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentCoin {
    /// Coin identifier.
    pub coin_id: String,
    /// Address that can spend the UTXO.
    pub owner: String,
    /// Amount in coin units.
    pub amount: u64,
    /// `"<txid>:<vout>"` key.
    pub utxo: String,
}

/// Read-only store view the protocol parsers run against.
///
/// Reads copy out; implementations take a shared lock internally, so parsers
/// observe either the pre-batch or post-batch state of the indexes.
pub trait CoinView: Send + Sync {
    /// Look up a coin by id.
    fn coin_info(&self, id: &str) -> Option<CoinInfo>;

    /// Return the unspent coins sitting on any of the given UTXOs.
    fn coins_in_utxos(&self, utxos: &[String]) -> Vec<UnspentCoin>;
}
