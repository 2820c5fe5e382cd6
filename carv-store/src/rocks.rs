//! RocksDB implementation of the [`Kv`] contract.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::info;

use carv_core::{Error, Result};

use crate::kv::{Kv, KvEntry};

/// RocksDB-backed key-value store.
pub struct RocksKv {
    db: Arc<DB>,
}

impl RocksKv {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening RocksDB at {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| Error::storage(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl Clone for RocksKv {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl Kv for RocksKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| Error::storage(e.to_string()))
    }

    fn batch_set(&self, entries: Vec<KvEntry>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for (key, value) in entries {
            match value {
                Some(bytes) => batch.put(key.as_bytes(), &bytes),
                None => batch.delete(key.as_bytes()),
            }
        }
        self.db
            .write(batch)
            .map_err(|e| Error::storage(e.to_string()))
    }

    fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let mut results = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| Error::storage(e.to_string()))?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            let key = String::from_utf8(key.into_vec())
                .map_err(|e| Error::storage(format!("non-utf8 key: {e}")))?;
            results.push((key, value.into_vec()));
        }
        Ok(results)
    }

    fn sync(&self) -> Result<()> {
        self.db.flush().map_err(|e| Error::storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RocksKv, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let kv = RocksKv::open(dir.path()).unwrap();
        (kv, dir)
    }

    #[test]
    fn test_batch_set_and_get() {
        let (kv, _dir) = open_temp();

        kv.batch_set(vec![
            ("coins/CARV".to_string(), Some(b"one".to_vec())),
            ("coins/GOLD".to_string(), Some(b"two".to_vec())),
        ])
        .unwrap();

        assert_eq!(kv.get("coins/CARV").unwrap(), Some(b"one".to_vec()));
        assert_eq!(kv.get("coins/NONE").unwrap(), None);
    }

    #[test]
    fn test_batch_delete() {
        let (kv, _dir) = open_temp();

        kv.batch_set(vec![("utxos/1234:0".to_string(), Some(b"uc".to_vec()))])
            .unwrap();
        kv.batch_set(vec![("utxos/1234:0".to_string(), None)]).unwrap();

        assert_eq!(kv.get("utxos/1234:0").unwrap(), None);
    }

    #[test]
    fn test_prefix_scan_bounds() {
        let (kv, _dir) = open_temp();

        kv.batch_set(vec![
            ("a-c-b/addr1".to_string(), Some(b"1".to_vec())),
            ("a-u-c/addr1".to_string(), Some(b"2".to_vec())),
            ("coins/CARV".to_string(), Some(b"3".to_vec())),
            ("coins/GOLD".to_string(), Some(b"4".to_vec())),
            ("utxos/1234:0".to_string(), Some(b"5".to_vec())),
        ])
        .unwrap();

        let scanned = kv.prefix_scan("coins/").unwrap();
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].0, "coins/CARV");
        assert_eq!(scanned[1].0, "coins/GOLD");

        assert!(kv.prefix_scan("status").unwrap().is_empty());
    }
}
