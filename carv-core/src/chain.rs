//! Extracted chain types.
//!
//! Upstream block sources (Esplora REST, bitcoind RPC, ...) convert their
//! wire formats into these before anything downstream sees them. Satoshi
//! values are plain `u64`; the lossless float conversion happens at the
//! client boundary.

use serde::{Deserialize, Serialize};

/// One spent output reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Funding transaction id.
    pub txid: String,
    /// Output index within the funding transaction.
    pub vout: u32,
}

impl TxIn {
    /// The `"<txid>:<vout>"` key of the UTXO this input spends.
    pub fn utxo(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

/// One transaction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOut {
    /// Value in satoshis.
    pub value: u64,
    /// Receiving address; empty for non-standard scripts such as OP_RETURN.
    pub address: String,
    /// Space-separated script disassembly.
    pub asm: String,
}

/// One transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id.
    pub txid: String,
    /// Inputs.
    pub vin: Vec<TxIn>,
    /// Outputs, in consensus order.
    pub vout: Vec<TxOut>,
}

impl Transaction {
    /// UTXO keys of every input of this transaction.
    pub fn spent_utxos(&self) -> Vec<String> {
        self.vin.iter().map(TxIn::utxo).collect()
    }
}

/// The four accessors the pipeline needs from a block, whatever its source.
pub trait ExtractedBlock {
    /// Block hash, hex-encoded.
    fn hash(&self) -> &str;

    /// Block timestamp (unix seconds).
    fn time(&self) -> u64;

    /// Block height.
    fn height(&self) -> u32;

    /// Transactions in consensus order.
    fn txs(&self) -> &[Transaction];
}
