//! Parser output events and the per-block batch that carries them.
//!
//! Events are ephemeral value types: the parser emits them, the loader folds
//! them into store mutations, and they are dropped once the batch commits.

use serde::{Deserialize, Serialize};

use crate::coin::CoinArgs;

/// Chain tag stamped on every event.
pub const CHAIN_ID: &str = "bitcoin";

/// Protocol tag stamped on every Carv event.
pub const PROTOCOL_CARV: &str = "carv";

/// A successful coin deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoinEvent {
    /// Chain the event was observed on.
    pub chain_id: String,
    /// Meta-protocol that produced the event.
    pub protocol: String,
    /// Deployed coin id.
    pub coin_id: String,
    /// Deployment parameters.
    pub args: CoinArgs,
}

/// A signed balance movement pinned to one UTXO.
///
/// Negative deltas are the burn side of a spend; positive deltas credit a
/// newly created UTXO. `is_mint` marks the case that must check and raise
/// `total_supply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChangeEvent {
    /// Chain the event was observed on.
    pub chain_id: String,
    /// Meta-protocol that produced the event.
    pub protocol: String,
    /// Affected coin.
    pub coin_id: String,
    /// Affected address.
    pub address: String,
    /// Signed movement in coin units.
    pub delta: i64,
    /// UTXO the coins sit on (credits) or sat on (debits).
    pub utxo: String,
    /// Whether this credit mints new supply.
    #[serde(default)]
    pub is_mint: bool,
}

/// Everything one transaction contributed to a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxUpdate {
    /// Containing transaction.
    pub txid: String,
    /// Deploys (at most one in practice).
    pub new_coin_events: Vec<NewCoinEvent>,
    /// Balance movements, debits first, in output order.
    pub balance_change_events: Vec<BalanceChangeEvent>,
}

impl TxUpdate {
    /// Whether the transaction contributed anything at all.
    pub fn is_empty(&self) -> bool {
        self.new_coin_events.is_empty() && self.balance_change_events.is_empty()
    }
}

/// Identity of the block a batch was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Block hash, hex-encoded.
    pub hash: String,
    /// Block timestamp (unix seconds).
    pub time: u64,
    /// Block height.
    pub height: u32,
}

/// All parsed events of one block, applied atomically by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdate {
    /// Source block.
    pub block: BlockMeta,
    /// Per-transaction contributions, in block order.
    pub tx_updates: Vec<TxUpdate>,
}
