//! The pluggable ingestion source contract.

use std::future::Future;

use carv_core::ExtractedBlock;

use crate::error::Result;

/// A source of blocks by height.
///
/// The ingestion loop drives exactly these three operations; everything else
/// about the upstream node or API stays behind the implementation.
pub trait BitcoinApi: Send + Sync {
    /// Block type this source produces.
    type Block: ExtractedBlock + Send;

    /// Height of the chain tip.
    fn latest_block_height(&self) -> impl Future<Output = Result<u32>> + Send;

    /// Hash of the block at the given height.
    fn block_hash(&self, height: u32) -> impl Future<Output = Result<String>> + Send;

    /// Full block by hash.
    fn block(&self, hash: &str) -> impl Future<Output = Result<Self::Block>> + Send;
}
