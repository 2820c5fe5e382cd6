//! Storage layer for the Carv Coin indexer.
//!
//! Provides:
//! - The [`Kv`] contract for embedded key-value backends
//! - [`RocksKv`], the RocksDB implementation
//! - [`CoinStore`], five in-memory indexes with write-through persistence
//!   and cold-start reload
//!
//! # Commit semantics
//!
//! The loader applies one block at a time through [`CoinStore::commit_batch`]:
//!
//! ```ignore
//! use carv_store::{CoinStore, CommitBatch, RocksKv};
//!
//! let kv = RocksKv::open("./indexer.db")?;
//! let store = CoinStore::open(Some(Box::new(kv)), "mainnet", false)?;
//!
//! store.commit_batch(CommitBatch {
//!     coin_infos,
//!     balances,
//!     utxos,
//!     height,
//! })?; // one write lock, one atomic KV batch
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod kv;
mod rocks;
mod store;

pub use kv::{Kv, KvEntry};
pub use rocks::RocksKv;
pub use store::{CoinStore, CommitBatch};
