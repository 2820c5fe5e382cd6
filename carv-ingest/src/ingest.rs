//! The ingestion loop: poll, fetch, transform, load, advance.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use carv_core::Result;
use carv_extract::BitcoinApi;

use crate::load::Loader;
use crate::transform::Transformer;

/// Back-off after a fetch or commit failure.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run the indexer from `start_height` until a fatal error.
///
/// Blocks are applied in strict height order; a height advances only after
/// its batch went through the loader. Transient fetch and commit failures
/// back off and retry the same height (the loader's height guard makes the
/// retry safe); an invariant violation ends the loop with the error.
pub async fn run_indexer<C: BitcoinApi>(
    client: C,
    transformer: Transformer,
    loader: Loader,
    start_height: u32,
) -> Result<()> {
    let mut height = start_height;
    loop {
        match client.latest_block_height().await {
            Ok(tip) if height > tip => {
                debug!(height, tip, "waiting for next block");
                sleep(RETRY_DELAY).await;
                continue;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(height, %error, "tip height fetch failed");
                sleep(RETRY_DELAY).await;
                continue;
            }
        }

        let hash = match client.block_hash(height).await {
            Ok(hash) => hash,
            Err(error) => {
                warn!(height, %error, "block hash fetch failed");
                sleep(RETRY_DELAY).await;
                continue;
            }
        };

        let block = match client.block(&hash).await {
            Ok(block) => block,
            Err(error) => {
                warn!(height, %hash, %error, "block fetch failed");
                sleep(RETRY_DELAY).await;
                continue;
            }
        };

        let batch = transformer.transform(&block);
        match loader.load(&batch) {
            Ok(()) => {
                debug!(height, txs = batch.tx_updates.len(), "block processed");
                height += 1;
            }
            Err(error) if error.is_retryable() => {
                warn!(height, %error, "batch commit failed, retrying block");
                sleep(RETRY_DELAY).await;
            }
            Err(error) => return Err(error),
        }
    }
}
