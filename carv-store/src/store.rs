//! In-memory coin store with write-through persistence.
//!
//! Five denormalised indexes are kept mutually consistent behind one
//! readers-writer lock:
//!
//! - `coins`: coin_id → CoinInfo
//! - `utxo_coin`: utxo → UnspentCoin
//! - `address_utxo_coin`: address → utxo → UnspentCoin
//! - `address_coin_balance`: address → coin_id → balance
//! - `coin_address_balance`: coin_id → address → balance
//!
//! The loader is the single writer. A whole-block commit goes through
//! [`CoinStore::commit_batch`], which holds the write lock for all four
//! mutations and pushes one atomic KV batch, so readers only ever observe
//! pre-batch or post-batch states.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use carv_core::{CoinInfo, CoinView, Error, Result, UnspentCoin};

use crate::kv::{Kv, KvEntry};

/// Flat key schema of the persistent backend.
mod keys {
    pub const STATUS: &str = "status";
    pub const COINS_PREFIX: &str = "coins/";
    pub const UTXOS_PREFIX: &str = "utxos/";
    pub const AUC_PREFIX: &str = "a-u-c/";
    pub const ACB_PREFIX: &str = "a-c-b/";
    pub const CAB_PREFIX: &str = "c-a-b/";
}

/// Persisted indexing status.
#[derive(Debug, Serialize, Deserialize)]
struct Status {
    height: u32,
    network: String,
}

/// One block's worth of store mutations, applied under a single write lock.
#[derive(Debug, Default)]
pub struct CommitBatch {
    /// Full coin records to upsert.
    pub coin_infos: HashMap<String, CoinInfo>,
    /// Signed balance deltas, coin → address → delta.
    pub balances: HashMap<String, HashMap<String, i64>>,
    /// UTXO upserts; `None` is a tombstone.
    pub utxos: HashMap<String, Option<UnspentCoin>>,
    /// Height of the committed block.
    pub height: u32,
}

#[derive(Default)]
struct Inner {
    network: String,
    height: u32,
    coins: HashMap<String, CoinInfo>,
    utxo_coin: HashMap<String, UnspentCoin>,
    address_utxo_coin: HashMap<String, HashMap<String, UnspentCoin>>,
    address_coin_balance: HashMap<String, HashMap<String, i64>>,
    coin_address_balance: HashMap<String, HashMap<String, i64>>,
}

/// The authoritative coin state, optionally backed by a persistent KV.
pub struct CoinStore {
    inner: RwLock<Inner>,
    kv: Option<Box<dyn Kv>>,
}

impl CoinStore {
    /// Open a store, reloading state from the backend when one is given.
    ///
    /// `debug` seeds deterministic fixture data so the query API is
    /// exercisable without syncing a chain.
    pub fn open(kv: Option<Box<dyn Kv>>, network: impl Into<String>, debug: bool) -> Result<Self> {
        let mut inner = Inner {
            network: network.into(),
            ..Inner::default()
        };

        if let Some(kv) = kv.as_deref() {
            load_into(&mut inner, kv)?;
        }
        if debug {
            fill_debug_data(&mut inner);
        }

        Ok(Self {
            inner: RwLock::new(inner),
            kv,
        })
    }

    /// Open a store with no persistence (tests, `--db-file-path=""`).
    pub fn in_memory(network: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                network: network.into(),
                ..Inner::default()
            }),
            kv: None,
        }
    }

    // ------------------------------------------------------------------
    // Reads (shared lock, copy-out)
    // ------------------------------------------------------------------

    /// Indexed height and network name.
    pub fn status(&self) -> (u32, String) {
        let inner = self.inner.read();
        (inner.height, inner.network.clone())
    }

    /// All deployed coins, in no particular order.
    pub fn coin_infos(&self) -> Vec<CoinInfo> {
        self.inner.read().coins.values().cloned().collect()
    }

    /// One coin by id.
    pub fn coin_info(&self, id: &str) -> Option<CoinInfo> {
        self.inner.read().coins.get(id).cloned()
    }

    /// Unspent coins sitting on any of the given UTXOs.
    pub fn coins_in_utxos(&self, utxos: &[String]) -> Vec<UnspentCoin> {
        let inner = self.inner.read();
        utxos
            .iter()
            .filter_map(|utxo| inner.utxo_coin.get(utxo).cloned())
            .collect()
    }

    /// Balance map of one address, or `None` when the address holds nothing.
    pub fn balances_by_address(&self, address: &str) -> Option<HashMap<String, i64>> {
        self.inner.read().address_coin_balance.get(address).cloned()
    }

    /// Unspent coins owned by one address, or `None` when it owns none.
    pub fn coins_by_address(&self, address: &str) -> Option<Vec<UnspentCoin>> {
        self.inner
            .read()
            .address_utxo_coin
            .get(address)
            .map(|m| m.values().cloned().collect())
    }

    // ------------------------------------------------------------------
    // Writes (exclusive lock)
    // ------------------------------------------------------------------

    /// Apply a whole block's mutations under one write lock and one KV commit.
    ///
    /// Order inside the batch: coin infos, balances, UTXOs, height. Memory is
    /// mutated first; a KV failure surfaces as `Error::Storage` and the
    /// caller retries the block (recovery across a crash is reload-on-start).
    pub fn commit_batch(&self, batch: CommitBatch) -> Result<()> {
        let persist = self.kv.is_some();
        let mut entries = Vec::new();

        {
            let mut inner = self.inner.write();
            inner.apply_coin_infos(batch.coin_infos, persist, &mut entries)?;
            inner.apply_balances(batch.balances, persist, &mut entries)?;
            inner.apply_utxos(batch.utxos, persist, &mut entries)?;
            inner.apply_height(batch.height, persist, &mut entries)?;
        }

        if let Some(kv) = self.kv.as_deref() {
            kv.batch_set(entries)?;
            kv.sync()?;
        }
        Ok(())
    }

    /// Upsert coin records.
    pub fn coin_info_batch_update(&self, updates: HashMap<String, CoinInfo>) -> Result<()> {
        self.write_through(|inner, persist, entries| {
            inner.apply_coin_infos(updates, persist, entries)
        })
    }

    /// Apply signed balance deltas (coin → address → delta).
    ///
    /// Zero results are removed from both directions and `holder_count` is
    /// recomputed. Referencing a coin absent from `coins` is an
    /// [`Error::InvariantViolation`]: the loader must stage coin infos first.
    pub fn balance_batch_update(
        &self,
        updates: HashMap<String, HashMap<String, i64>>,
    ) -> Result<()> {
        self.write_through(|inner, persist, entries| {
            inner.apply_balances(updates, persist, entries)
        })
    }

    /// Upsert or tombstone unspent coins.
    pub fn utxo_batch_update(&self, updates: HashMap<String, Option<UnspentCoin>>) -> Result<()> {
        self.write_through(|inner, persist, entries| inner.apply_utxos(updates, persist, entries))
    }

    /// Advance the indexed height and sync the backend.
    pub fn indexed_height_update(&self, height: u32) -> Result<()> {
        self.write_through(|inner, persist, entries| inner.apply_height(height, persist, entries))?;
        if let Some(kv) = self.kv.as_deref() {
            kv.sync()?;
        }
        Ok(())
    }

    fn write_through(
        &self,
        apply: impl FnOnce(&mut Inner, bool, &mut Vec<KvEntry>) -> Result<()>,
    ) -> Result<()> {
        let persist = self.kv.is_some();
        let mut entries = Vec::new();
        apply(&mut *self.inner.write(), persist, &mut entries)?;
        if let Some(kv) = self.kv.as_deref() {
            kv.batch_set(entries)?;
        }
        Ok(())
    }
}

impl CoinView for CoinStore {
    fn coin_info(&self, id: &str) -> Option<CoinInfo> {
        CoinStore::coin_info(self, id)
    }

    fn coins_in_utxos(&self, utxos: &[String]) -> Vec<UnspentCoin> {
        CoinStore::coins_in_utxos(self, utxos)
    }
}

impl Inner {
    fn apply_coin_infos(
        &mut self,
        updates: HashMap<String, CoinInfo>,
        persist: bool,
        entries: &mut Vec<KvEntry>,
    ) -> Result<()> {
        for (id, ci) in updates {
            if persist {
                entries.push((
                    format!("{}{}", keys::COINS_PREFIX, id),
                    Some(serde_json::to_vec(&ci)?),
                ));
            }
            self.coins.insert(id, ci);
        }
        Ok(())
    }

    fn apply_balances(
        &mut self,
        updates: HashMap<String, HashMap<String, i64>>,
        persist: bool,
        entries: &mut Vec<KvEntry>,
    ) -> Result<()> {
        let mut touched_addresses = HashSet::new();

        for (coin, balances) in updates {
            if !self.coins.contains_key(&coin) {
                return Err(Error::invariant(format!(
                    "balance update for unknown coin {coin}"
                )));
            }

            for (address, delta) in balances {
                let coin_balances = self.coin_address_balance.entry(coin.clone()).or_default();
                let value = coin_balances.entry(address.clone()).or_insert(0);
                *value += delta;
                let new_value = *value;

                if new_value == 0 {
                    coin_balances.remove(&address);
                    if let Some(m) = self.address_coin_balance.get_mut(&address) {
                        m.remove(&coin);
                        if m.is_empty() {
                            self.address_coin_balance.remove(&address);
                        }
                    }
                } else {
                    self.address_coin_balance
                        .entry(address.clone())
                        .or_default()
                        .insert(coin.clone(), new_value);
                }
                touched_addresses.insert(address);
            }

            let holder_count = self
                .coin_address_balance
                .get(&coin)
                .map_or(0, |m| m.len() as u64);
            if holder_count == 0 {
                self.coin_address_balance.remove(&coin);
            }

            let ci = self
                .coins
                .get_mut(&coin)
                .ok_or_else(|| Error::invariant(format!("coin {coin} vanished mid-update")))?;
            ci.holder_count = holder_count;

            if persist {
                // Holder counts change here, after the coin-info pass, so the
                // record is re-persisted or a reload would resurrect stale counts.
                entries.push((
                    format!("{}{}", keys::COINS_PREFIX, coin),
                    Some(serde_json::to_vec(&*ci)?),
                ));
                entries.push((
                    format!("{}{}", keys::CAB_PREFIX, coin),
                    self.coin_address_balance
                        .get(&coin)
                        .map(encode_unsigned)
                        .transpose()?,
                ));
            }
        }

        if persist {
            for address in touched_addresses {
                entries.push((
                    format!("{}{}", keys::ACB_PREFIX, address),
                    self.address_coin_balance
                        .get(&address)
                        .map(encode_unsigned)
                        .transpose()?,
                ));
            }
        }
        Ok(())
    }

    fn apply_utxos(
        &mut self,
        updates: HashMap<String, Option<UnspentCoin>>,
        persist: bool,
        entries: &mut Vec<KvEntry>,
    ) -> Result<()> {
        let mut touched_addresses = HashSet::new();

        for (utxo, op) in updates {
            match op {
                None => {
                    // Read the owner off the removed record; a tombstone for
                    // a UTXO we never tracked is a no-op.
                    if let Some(old) = self.utxo_coin.remove(&utxo) {
                        if let Some(m) = self.address_utxo_coin.get_mut(&old.owner) {
                            m.remove(&utxo);
                            if m.is_empty() {
                                self.address_utxo_coin.remove(&old.owner);
                            }
                        }
                        touched_addresses.insert(old.owner);
                    }
                    if persist {
                        entries.push((format!("{}{}", keys::UTXOS_PREFIX, utxo), None));
                    }
                }
                Some(uc) => {
                    if persist {
                        entries.push((
                            format!("{}{}", keys::UTXOS_PREFIX, utxo),
                            Some(serde_json::to_vec(&uc)?),
                        ));
                    }
                    self.address_utxo_coin
                        .entry(uc.owner.clone())
                        .or_default()
                        .insert(utxo.clone(), uc.clone());
                    touched_addresses.insert(uc.owner.clone());
                    self.utxo_coin.insert(utxo, uc);
                }
            }
        }

        if persist {
            for address in touched_addresses {
                let value = self
                    .address_utxo_coin
                    .get(&address)
                    .map(serde_json::to_vec)
                    .transpose()?;
                entries.push((format!("{}{}", keys::AUC_PREFIX, address), value));
            }
        }
        Ok(())
    }

    fn apply_height(
        &mut self,
        height: u32,
        persist: bool,
        entries: &mut Vec<KvEntry>,
    ) -> Result<()> {
        self.height = height;
        if persist {
            let status = Status {
                height,
                network: self.network.clone(),
            };
            entries.push((keys::STATUS.to_string(), Some(serde_json::to_vec(&status)?)));
        }
        Ok(())
    }
}

/// Persist a balance map unsigned; deltas are strictly ephemeral, so a
/// negative quiescent balance means the loader is broken.
fn encode_unsigned(balances: &HashMap<String, i64>) -> Result<Vec<u8>> {
    let mut unsigned = HashMap::with_capacity(balances.len());
    for (key, &value) in balances {
        let value = u64::try_from(value)
            .map_err(|_| Error::invariant(format!("negative balance {value} for {key}")))?;
        unsigned.insert(key.clone(), value);
    }
    Ok(serde_json::to_vec(&unsigned)?)
}

fn decode_signed(bytes: &[u8]) -> Result<HashMap<String, i64>> {
    let unsigned: HashMap<String, u64> = serde_json::from_slice(bytes)?;
    Ok(unsigned
        .into_iter()
        .map(|(key, value)| (key, value as i64))
        .collect())
}

fn load_into(inner: &mut Inner, kv: &dyn Kv) -> Result<()> {
    let start = Instant::now();
    info!("loading indexes from disk into memory");

    match kv.get(keys::STATUS)? {
        None => {
            inner.height = 0;
            return Ok(());
        }
        Some(bytes) => {
            let status: Status = serde_json::from_slice(&bytes)?;
            inner.height = status.height;
            inner.network = status.network;
        }
    }

    if inner.height == 0 {
        return Ok(());
    }

    for (_, value) in kv.prefix_scan(keys::COINS_PREFIX)? {
        let ci: CoinInfo = serde_json::from_slice(&value)?;
        inner.coins.insert(ci.id.clone(), ci);
    }

    for (_, value) in kv.prefix_scan(keys::UTXOS_PREFIX)? {
        let uc: UnspentCoin = serde_json::from_slice(&value)?;
        inner.utxo_coin.insert(uc.utxo.clone(), uc);
    }

    for (key, value) in kv.prefix_scan(keys::AUC_PREFIX)? {
        let address = key[keys::AUC_PREFIX.len()..].to_string();
        let utxos: HashMap<String, UnspentCoin> = serde_json::from_slice(&value)?;
        inner.address_utxo_coin.insert(address, utxos);
    }

    for (key, value) in kv.prefix_scan(keys::ACB_PREFIX)? {
        let address = key[keys::ACB_PREFIX.len()..].to_string();
        inner
            .address_coin_balance
            .insert(address, decode_signed(&value)?);
    }

    for (key, value) in kv.prefix_scan(keys::CAB_PREFIX)? {
        let coin = key[keys::CAB_PREFIX.len()..].to_string();
        inner
            .coin_address_balance
            .insert(coin, decode_signed(&value)?);
    }

    info!(
        height = inner.height,
        coins = inner.coins.len(),
        utxos = inner.utxo_coin.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loading indexes from disk done"
    );
    Ok(())
}

/// Deterministic fixtures for `--debug`: consistent across all five indexes.
fn fill_debug_data(inner: &mut Inner) {
    use carv_core::CoinArgs;

    let args = CoinArgs {
        max: 100,
        sats: 10_000,
        limit: 1,
    };
    let fixtures = [
        ("TESTCA", 3u64, 3u64, 800_001u32, "1111"),
        ("TESTCB", 5, 1, 800_002, "2222"),
        ("TESTCC", 0, 0, 800_003, "3333"),
    ];
    for (id, total_supply, tx_count, height, deploy_tx) in fixtures {
        inner.coins.insert(
            id.to_string(),
            CoinInfo {
                id: id.to_string(),
                total_supply,
                args,
                tx_count,
                holder_count: 0,
                created_at: height,
                deploy_tx: deploy_tx.to_string(),
                deploy_height: height,
            },
        );
    }

    let unspent = [
        ("1111:0", "TESTCA", "addr1", 1u64),
        ("1112:0", "TESTCA", "addr2", 2),
        ("1113:0", "TESTCB", "addr1", 5),
    ];
    for (utxo, coin_id, owner, amount) in unspent {
        let uc = UnspentCoin {
            coin_id: coin_id.to_string(),
            owner: owner.to_string(),
            amount,
            utxo: utxo.to_string(),
        };
        inner.utxo_coin.insert(utxo.to_string(), uc.clone());
        inner
            .address_utxo_coin
            .entry(owner.to_string())
            .or_default()
            .insert(utxo.to_string(), uc);
        *inner
            .coin_address_balance
            .entry(coin_id.to_string())
            .or_default()
            .entry(owner.to_string())
            .or_insert(0) += amount as i64;
        *inner
            .address_coin_balance
            .entry(owner.to_string())
            .or_default()
            .entry(coin_id.to_string())
            .or_insert(0) += amount as i64;
    }
    for (coin, balances) in &inner.coin_address_balance {
        if let Some(ci) = inner.coins.get_mut(coin) {
            ci.holder_count = balances.len() as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carv_core::CoinArgs;

    use crate::rocks::RocksKv;

    fn coin(id: &str) -> CoinInfo {
        CoinInfo {
            id: id.to_string(),
            total_supply: 0,
            args: CoinArgs {
                max: 100,
                sats: 10_000,
                limit: 1,
            },
            tx_count: 0,
            holder_count: 0,
            created_at: 1,
            deploy_tx: String::new(),
            deploy_height: 1,
        }
    }

    fn unspent(utxo: &str, coin_id: &str, owner: &str, amount: u64) -> UnspentCoin {
        UnspentCoin {
            coin_id: coin_id.to_string(),
            owner: owner.to_string(),
            amount,
            utxo: utxo.to_string(),
        }
    }

    #[test]
    fn test_balance_batch_update_maintains_both_directions() {
        let store = CoinStore::in_memory("testnet");
        store
            .coin_info_batch_update(HashMap::from([
                ("c1".to_string(), coin("c1")),
                ("c2".to_string(), coin("c2")),
            ]))
            .unwrap();
        store
            .balance_batch_update(HashMap::from([(
                "c1".to_string(),
                HashMap::from([("a1".to_string(), 1), ("a2".to_string(), 2)]),
            )]))
            .unwrap();

        store
            .balance_batch_update(HashMap::from([
                (
                    "c1".to_string(),
                    HashMap::from([("a1".to_string(), -1), ("a2".to_string(), 1)]),
                ),
                ("c2".to_string(), HashMap::from([("a1".to_string(), 1)])),
            ]))
            .unwrap();

        let a1 = store.balances_by_address("a1").unwrap();
        assert_eq!(a1.get("c1"), None, "zeroed balance must disappear");
        assert_eq!(a1.get("c2"), Some(&1));

        let a2 = store.balances_by_address("a2").unwrap();
        assert_eq!(a2.get("c1"), Some(&3));

        assert_eq!(store.coin_info("c1").unwrap().holder_count, 1);
        assert_eq!(store.coin_info("c2").unwrap().holder_count, 1);
    }

    #[test]
    fn test_balance_update_on_unknown_coin_is_invariant_violation() {
        let store = CoinStore::in_memory("testnet");
        let err = store
            .balance_batch_update(HashMap::from([(
                "NONE".to_string(),
                HashMap::from([("a1".to_string(), 1)]),
            )]))
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_utxo_batch_update_upsert_and_tombstone() {
        let store = CoinStore::in_memory("testnet");

        store
            .utxo_batch_update(HashMap::from([(
                "5678:0".to_string(),
                Some(unspent("5678:0", "CARV", "1234", 1)),
            )]))
            .unwrap();
        assert_eq!(
            store.coins_in_utxos(&["5678:0".to_string()]),
            vec![unspent("5678:0", "CARV", "1234", 1)]
        );
        assert_eq!(store.coins_by_address("1234").unwrap().len(), 1);

        store
            .utxo_batch_update(HashMap::from([("5678:0".to_string(), None)]))
            .unwrap();
        assert!(store.coins_in_utxos(&["5678:0".to_string()]).is_empty());
        assert!(store.coins_by_address("1234").is_none());
    }

    #[test]
    fn test_utxo_tombstone_for_unknown_utxo_is_noop() {
        let store = CoinStore::in_memory("testnet");
        store
            .utxo_batch_update(HashMap::from([("dead:0".to_string(), None)]))
            .unwrap();
        assert!(store.coins_in_utxos(&["dead:0".to_string()]).is_empty());
    }

    #[test]
    fn test_commit_batch_updates_all_indexes_and_height() {
        let store = CoinStore::in_memory("mainnet");

        store
            .commit_batch(CommitBatch {
                coin_infos: HashMap::from([("CARV".to_string(), coin("CARV"))]),
                balances: HashMap::from([(
                    "CARV".to_string(),
                    HashMap::from([("1234".to_string(), 1)]),
                )]),
                utxos: HashMap::from([(
                    "5678:0".to_string(),
                    Some(unspent("5678:0", "CARV", "1234", 1)),
                )]),
                height: 823_123,
            })
            .unwrap();

        assert_eq!(store.status(), (823_123, "mainnet".to_string()));
        assert_eq!(store.coin_info("CARV").unwrap().holder_count, 1);
        assert_eq!(
            store.balances_by_address("1234").unwrap().get("CARV"),
            Some(&1)
        );
        assert_eq!(store.coins_by_address("1234").unwrap().len(), 1);
    }

    #[test]
    fn test_negative_persisted_balance_is_invariant_violation() {
        let dir = tempfile::tempdir().unwrap();
        let kv = RocksKv::open(dir.path()).unwrap();
        let store = CoinStore::open(Some(Box::new(kv)), "testnet", false).unwrap();

        store
            .coin_info_batch_update(HashMap::from([("c1".to_string(), coin("c1"))]))
            .unwrap();
        let err = store
            .balance_batch_update(HashMap::from([(
                "c1".to_string(),
                HashMap::from([("a1".to_string(), -1)]),
            )]))
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        {
            let kv = RocksKv::open(dir.path()).unwrap();
            let store = CoinStore::open(Some(Box::new(kv)), "testnet", false).unwrap();
            store
                .commit_batch(CommitBatch {
                    coin_infos: HashMap::from([("CARV".to_string(), coin("CARV"))]),
                    balances: HashMap::from([(
                        "CARV".to_string(),
                        HashMap::from([("1234".to_string(), 2), ("5678".to_string(), 1)]),
                    )]),
                    utxos: HashMap::from([
                        (
                            "aaaa:0".to_string(),
                            Some(unspent("aaaa:0", "CARV", "1234", 2)),
                        ),
                        (
                            "bbbb:0".to_string(),
                            Some(unspent("bbbb:0", "CARV", "5678", 1)),
                        ),
                    ]),
                    height: 823_200,
                })
                .unwrap();
        }

        let kv = RocksKv::open(dir.path()).unwrap();
        let reopened = CoinStore::open(Some(Box::new(kv)), "ignored", false).unwrap();

        // Status comes from disk, including the network recorded at write time.
        assert_eq!(reopened.status(), (823_200, "testnet".to_string()));

        let ci = reopened.coin_info("CARV").unwrap();
        assert_eq!(ci.holder_count, 2);

        assert_eq!(
            reopened.balances_by_address("1234").unwrap().get("CARV"),
            Some(&2)
        );
        assert_eq!(
            reopened.coins_in_utxos(&["aaaa:0".to_string(), "bbbb:0".to_string()]),
            vec![
                unspent("aaaa:0", "CARV", "1234", 2),
                unspent("bbbb:0", "CARV", "5678", 1),
            ]
        );
        let mut owned = reopened.coins_by_address("1234").unwrap();
        owned.sort_by(|a, b| a.utxo.cmp(&b.utxo));
        assert_eq!(owned, vec![unspent("aaaa:0", "CARV", "1234", 2)]);
    }

    #[test]
    fn test_cold_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = RocksKv::open(dir.path()).unwrap();
        let store = CoinStore::open(Some(Box::new(kv)), "mainnet", false).unwrap();

        assert_eq!(store.status(), (0, "mainnet".to_string()));
        assert!(store.coin_infos().is_empty());
    }

    #[test]
    fn test_debug_fixtures_satisfy_invariants() {
        let store = CoinStore::open(None, "testnet", true).unwrap();

        for ci in store.coin_infos() {
            let live: u64 = store
                .coins_by_address("addr1")
                .into_iter()
                .chain(store.coins_by_address("addr2"))
                .flatten()
                .filter(|uc| uc.coin_id == ci.id)
                .map(|uc| uc.amount)
                .sum();
            assert_eq!(ci.total_supply, live, "supply mismatch for {}", ci.id);
        }
        assert_eq!(store.coin_info("TESTCA").unwrap().holder_count, 2);
        assert_eq!(store.coin_info("TESTCB").unwrap().holder_count, 1);
        assert_eq!(store.coin_info("TESTCC").unwrap().holder_count, 0);
    }
}
