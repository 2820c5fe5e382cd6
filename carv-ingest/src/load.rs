//! Batch loading: fold a block's events into one store commit.
//!
//! Cross-transaction rules applied while folding:
//!
//! 1. Duplicate deploys in one block: the first wins, the later transaction
//!    is dropped whole.
//! 2. Mint/transfer on a coin absent from both the store and the pending
//!    batch: transaction dropped.
//! 3. Mint supply ceiling checked against the live pending supply.
//! 4. `tx_count`: one increment per transaction that moves any balance.
//! 5. UTXO tombstones win over upserts within a batch.
//!
//! Each transaction's effects are staged in tx-local buffers and merged only
//! once the whole transaction validates, so a dropped transaction leaves no
//! trace. Per coin, `total_supply` moves by the net of the transaction's
//! deltas: mints raise it, metadata-less burns lower it, balanced transfers
//! cancel out, keeping supply equal to the sum of live UTXO amounts.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use carv_core::{BatchUpdate, CoinInfo, Error, Result, UnspentCoin};
use carv_store::{CoinStore, CommitBatch};

/// Applies batch updates to the store, one block at a time.
pub struct Loader {
    store: Arc<CoinStore>,
}

impl Loader {
    /// Create a loader writing through the given store.
    pub fn new(store: Arc<CoinStore>) -> Self {
        Self { store }
    }

    /// Fold and commit one block.
    ///
    /// Blocks at or below the indexed height are skipped, which makes
    /// re-applying a batch a no-op.
    pub fn load(&self, batch: &BatchUpdate) -> Result<()> {
        let (indexed_height, _) = self.store.status();
        if indexed_height != 0 && batch.block.height <= indexed_height {
            warn!(
                height = batch.block.height,
                indexed_height, "skipping already indexed block"
            );
            return Ok(());
        }

        let mut coin_infos: HashMap<String, CoinInfo> = HashMap::new();
        let mut balances: HashMap<String, HashMap<String, i64>> = HashMap::new();
        let mut utxos: HashMap<String, Option<UnspentCoin>> = HashMap::new();

        'txs: for tx_update in &batch.tx_updates {
            let mut tx_coin_infos: HashMap<String, CoinInfo> = HashMap::new();
            let mut tx_balances: Vec<(String, String, i64)> = Vec::new();
            let mut tx_utxos: Vec<(String, Option<UnspentCoin>)> = Vec::new();

            for event in &tx_update.new_coin_events {
                if coin_infos.contains_key(&event.coin_id)
                    || tx_coin_infos.contains_key(&event.coin_id)
                {
                    info!(
                        id = %event.coin_id,
                        tx = %tx_update.txid,
                        "duplicated coin deployment transaction on same block"
                    );
                    continue 'txs;
                }
                if self.store.coin_info(&event.coin_id).is_some() {
                    // The parser rejects deploys of known coins; reaching this
                    // point means the pipeline itself is wrong.
                    return Err(Error::invariant(format!(
                        "deploy of already stored coin {} passed the parser",
                        event.coin_id
                    )));
                }
                tx_coin_infos.insert(
                    event.coin_id.clone(),
                    CoinInfo {
                        id: event.coin_id.clone(),
                        total_supply: 0,
                        args: event.args,
                        tx_count: 0,
                        holder_count: 0,
                        created_at: batch.block.height,
                        deploy_tx: tx_update.txid.clone(),
                        deploy_height: batch.block.height,
                    },
                );
            }

            let mut counted_tx = false;
            for event in &tx_update.balance_change_events {
                let ci = match tx_coin_infos.entry(event.coin_id.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let known = coin_infos
                            .get(&event.coin_id)
                            .cloned()
                            .or_else(|| self.store.coin_info(&event.coin_id));
                        match known {
                            Some(ci) => entry.insert(ci),
                            None => {
                                info!(
                                    id = %event.coin_id,
                                    tx = %tx_update.txid,
                                    "mint or transfer on a non-exist coin"
                                );
                                continue 'txs;
                            }
                        }
                    }
                };

                let supply = i128::from(ci.total_supply) + i128::from(event.delta);
                if supply < 0 {
                    return Err(Error::invariant(format!(
                        "total supply of {} would go negative",
                        event.coin_id
                    )));
                }
                let supply = supply as u64;
                if event.is_mint && supply > ci.args.max {
                    info!(
                        id = %event.coin_id,
                        tx = %tx_update.txid,
                        "mint exceed max supply"
                    );
                    continue 'txs;
                }
                ci.total_supply = supply;

                if !counted_tx {
                    ci.tx_count += 1;
                    counted_tx = true;
                }

                tx_balances.push((event.coin_id.clone(), event.address.clone(), event.delta));
                if event.delta > 0 {
                    tx_utxos.push((
                        event.utxo.clone(),
                        Some(UnspentCoin {
                            coin_id: event.coin_id.clone(),
                            owner: event.address.clone(),
                            amount: event.delta as u64,
                            utxo: event.utxo.clone(),
                        }),
                    ));
                } else {
                    tx_utxos.push((event.utxo.clone(), None));
                }
            }

            // The whole transaction validated; merge its staged effects.
            coin_infos.extend(tx_coin_infos);
            for (coin, address, delta) in tx_balances {
                *balances
                    .entry(coin)
                    .or_default()
                    .entry(address)
                    .or_insert(0) += delta;
            }
            for (utxo, op) in tx_utxos {
                match utxos.entry(utxo) {
                    Entry::Vacant(entry) => {
                        entry.insert(op);
                    }
                    Entry::Occupied(mut entry) => {
                        // An existing tombstone wins over any later write.
                        if entry.get().is_some() {
                            entry.insert(op);
                        }
                    }
                }
            }
        }

        debug!(
            height = batch.block.height,
            coins = coin_infos.len(),
            utxos = utxos.len(),
            "committing batch"
        );
        self.store.commit_batch(CommitBatch {
            coin_infos,
            balances,
            utxos,
            height: batch.block.height,
        })
    }
}
