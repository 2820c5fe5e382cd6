//! Esplora (mempool.space) block source.
//!
//! Endpoints used:
//! - `GET /blocks/tip/height` - chain tip height
//! - `GET /block-height/{height}` - block hash at height
//! - `GET /block/{hash}` - block summary (id, height, timestamp, tx_count)
//! - `GET /block/{hash}/txs/{offset}` - transactions, 25 per page

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::debug;

use carv_core::{ExtractedBlock, Transaction, TxIn, TxOut};

use crate::api::BitcoinApi;
use crate::config::Network;
use crate::error::{ExtractError, Result};

/// Tip height cache lifetime in seconds.
const TIP_CACHE_SECS: i64 = 10;

/// A fully fetched block.
#[derive(Debug, Clone)]
pub struct MempoolBlock {
    hash: String,
    time: u64,
    height: u32,
    txs: Vec<Transaction>,
}

impl ExtractedBlock for MempoolBlock {
    fn hash(&self) -> &str {
        &self.hash
    }

    fn time(&self) -> u64 {
        self.time
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn txs(&self) -> &[Transaction] {
        &self.txs
    }
}

#[derive(Debug, Deserialize)]
struct WireBlockSummary {
    id: String,
    height: u32,
    timestamp: u64,
    tx_count: usize,
}

#[derive(Debug, Deserialize)]
struct WireVin {
    #[serde(default)]
    txid: String,
    #[serde(default)]
    vout: u32,
}

#[derive(Debug, Deserialize)]
struct WireVout {
    /// Integer-valued float on the wire; converted losslessly.
    value: f64,
    #[serde(default)]
    scriptpubkey_address: Option<String>,
    #[serde(default)]
    scriptpubkey_asm: String,
}

#[derive(Debug, Deserialize)]
struct WireTx {
    txid: String,
    vin: Vec<WireVin>,
    vout: Vec<WireVout>,
}

impl TryFrom<WireTx> for Transaction {
    type Error = ExtractError;

    fn try_from(wire: WireTx) -> Result<Self> {
        let vin = wire
            .vin
            .into_iter()
            .map(|v| TxIn {
                txid: v.txid,
                vout: v.vout,
            })
            .collect();
        let vout = wire
            .vout
            .into_iter()
            .map(|v| {
                Ok(TxOut {
                    value: sats_to_u64(v.value)?,
                    address: v.scriptpubkey_address.unwrap_or_default(),
                    asm: v.scriptpubkey_asm,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Transaction {
            txid: wire.txid,
            vin,
            vout,
        })
    }
}

/// Convert an Esplora satoshi value to `u64`, rejecting anything lossy.
fn sats_to_u64(value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(ExtractError::FractionalSats(value));
    }
    Ok(value as u64)
}

/// Block source backed by an Esplora-compatible REST API.
pub struct MempoolClient {
    http: reqwest::Client,
    base_url: String,
    cached_tip: RwLock<Option<(u32, i64)>>, // (height, unix seconds)
}

impl MempoolClient {
    /// Create a client for the public endpoint of the given network.
    pub fn new(network: Network) -> Self {
        Self::with_base_url(network.esplora_url())
    }

    /// Create a client against a custom Esplora base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cached_tip: RwLock::new(None),
        }
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

impl BitcoinApi for MempoolClient {
    type Block = MempoolBlock;

    async fn latest_block_height(&self) -> Result<u32> {
        let now = chrono::Utc::now().timestamp();
        if let Some((height, at)) = *self.cached_tip.read() {
            if now - at < TIP_CACHE_SECS {
                return Ok(height);
            }
        }

        let text = self.get_text("/blocks/tip/height").await?;
        let height: u32 = text
            .trim()
            .parse()
            .map_err(|_| ExtractError::InvalidBlockHeight(text.clone()))?;
        *self.cached_tip.write() = Some((height, now));
        Ok(height)
    }

    async fn block_hash(&self, height: u32) -> Result<String> {
        let hash = self.get_text(&format!("/block-height/{height}")).await?;
        let hash = hash.trim().to_string();
        if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ExtractError::InvalidBlockHash(hash));
        }
        Ok(hash)
    }

    async fn block(&self, hash: &str) -> Result<MempoolBlock> {
        let summary: WireBlockSummary = self.get_json(&format!("/block/{hash}")).await?;

        let mut txs = Vec::with_capacity(summary.tx_count);
        while txs.len() < summary.tx_count {
            let page: Vec<WireTx> = self
                .get_json(&format!("/block/{hash}/txs/{}", txs.len()))
                .await?;
            if page.is_empty() {
                return Err(ExtractError::Malformed(format!(
                    "block {hash} advertised {} txs but page at {} was empty",
                    summary.tx_count,
                    txs.len()
                )));
            }
            for wire in page {
                txs.push(Transaction::try_from(wire)?);
            }
        }

        debug!(
            hash = %summary.id,
            height = summary.height,
            txs = txs.len(),
            "block fetched"
        );

        Ok(MempoolBlock {
            hash: summary.id,
            time: summary.timestamp,
            height: summary.height,
            txs,
        })
    }
}
