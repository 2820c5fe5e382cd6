//! Block-to-batch transformation.

use std::sync::Arc;

use tracing::warn;

use carv_core::{BatchUpdate, BlockMeta, CoinView, ExtractedBlock, TxUpdate};
use carv_protocol::{CarvParser, Parser, RuneParser};

/// Runs every registered protocol parser over every transaction of a block.
///
/// A parser error drops that transaction's contribution and nothing else;
/// block order is preserved in the resulting batch.
pub struct Transformer {
    parsers: Vec<Box<dyn Parser>>,
}

impl Transformer {
    /// Create a transformer over an explicit parser registry.
    pub fn new(parsers: Vec<Box<dyn Parser>>) -> Self {
        Self { parsers }
    }

    /// The standard Bitcoin registry: Carv plus the Rune observer stub.
    pub fn bitcoin(view: Arc<dyn CoinView>) -> Self {
        Self::new(vec![
            Box::new(CarvParser::new(view)),
            Box::new(RuneParser),
        ])
    }

    /// Fold one block into a batch update.
    pub fn transform(&self, block: &impl ExtractedBlock) -> BatchUpdate {
        let mut batch = BatchUpdate {
            block: BlockMeta {
                hash: block.hash().to_string(),
                time: block.time(),
                height: block.height(),
            },
            tx_updates: Vec::new(),
        };

        for tx in block.txs() {
            for parser in &self.parsers {
                match parser.parse(tx) {
                    Ok(parsed) if !parsed.is_empty() => {
                        batch.tx_updates.push(TxUpdate {
                            txid: tx.txid.clone(),
                            new_coin_events: parsed.new_coin_events,
                            balance_change_events: parsed.balance_change_events,
                        });
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(txid = %tx.txid, %error, "parser rejected transaction");
                    }
                }
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use carv_core::{Transaction, TxOut};
    use carv_store::CoinStore;

    struct TestBlock {
        hash: String,
        height: u32,
        txs: Vec<Transaction>,
    }

    impl ExtractedBlock for TestBlock {
        fn hash(&self) -> &str {
            &self.hash
        }

        fn time(&self) -> u64 {
            1_703_500_000
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn txs(&self) -> &[Transaction] {
            &self.txs
        }
    }

    fn deploy_tx(txid: &str) -> Transaction {
        Transaction {
            txid: txid.to_string(),
            vin: vec![],
            vout: vec![TxOut {
                value: 0,
                address: String::new(),
                asm: "OP_RETURN OP_PUSHBYTES_1 43 OP_PUSHBYTES_10 82a4058980dd40cd1001"
                    .to_string(),
            }],
        }
    }

    fn malformed_tx(txid: &str) -> Transaction {
        Transaction {
            txid: txid.to_string(),
            vin: vec![],
            vout: vec![TxOut {
                value: 0,
                address: String::new(),
                asm: "OP_RETURN OP_PUSHBYTES_1 43 OP_PUSHBYTES_1 XX".to_string(),
            }],
        }
    }

    fn plain_tx(txid: &str) -> Transaction {
        Transaction {
            txid: txid.to_string(),
            vin: vec![],
            vout: vec![TxOut {
                value: 42_000,
                address: "someone".to_string(),
                asm: String::new(),
            }],
        }
    }

    #[test]
    fn test_transform_collects_only_contributing_txs() {
        let store = Arc::new(CoinStore::in_memory("testnet"));
        let transformer = Transformer::bitcoin(store);

        let block = TestBlock {
            hash: "blockhash".to_string(),
            height: 823_122,
            txs: vec![plain_tx("aaaa"), deploy_tx("bbbb"), malformed_tx("cccc")],
        };
        let batch = transformer.transform(&block);

        assert_eq!(batch.block.height, 823_122);
        assert_eq!(batch.block.hash, "blockhash");
        assert_eq!(batch.tx_updates.len(), 1);
        assert_eq!(batch.tx_updates[0].txid, "bbbb");
        assert_eq!(batch.tx_updates[0].new_coin_events.len(), 1);
    }
}
