//! Read-only HTTP query API for the Carv Coin indexer.
//!
//! A thin JSON layer over the store's read operations; the ingestion loop
//! writes concurrently behind the store's lock.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod server;

pub use routes::{router, ApiError, CoinsQuery, StatusResponse};
pub use server::{serve, ApiConfig};
