//! Core types for the Carv Coin indexer.
//!
//! This crate provides the data model and codecs used throughout the
//! indexer:
//!
//! - [`coin`] - Deployed coins, unspent coin records, the read-only view trait
//! - [`event`] - Parser events and per-block batches
//! - [`chain`] - Extracted chain types and the block accessor trait
//! - [`base26`] - Bijective base-26 coin-id codec
//! - [`varint`] - Unsigned varint codec (array form)

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod base26;
pub mod chain;
pub mod coin;
pub mod error;
pub mod event;
pub mod varint;

pub use chain::{ExtractedBlock, Transaction, TxIn, TxOut};
pub use coin::{CoinArgs, CoinInfo, CoinView, UnspentCoin};
pub use error::{Error, Result};
pub use event::{
    BalanceChangeEvent, BatchUpdate, BlockMeta, NewCoinEvent, TxUpdate, CHAIN_ID, PROTOCOL_CARV,
};
