//! Key-value backend contract.
//!
//! The store is the only component that touches the backend. Keys are flat
//! strings (`coins/<id>`, `utxos/<utxo>`, ...); values are opaque bytes.

use carv_core::Result;

/// A batch entry: `None` deletes the key.
pub type KvEntry = (String, Option<Vec<u8>>);

/// Minimal embedded key-value contract used for write-through persistence.
pub trait Kv: Send + Sync {
    /// Read one key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Apply all entries atomically.
    fn batch_set(&self, entries: Vec<KvEntry>) -> Result<()>;

    /// Return every `(key, value)` pair whose key starts with `prefix`.
    fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Flush buffered writes to disk.
    fn sync(&self) -> Result<()>;
}
