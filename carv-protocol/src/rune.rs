//! Rune protocol recogniser.
//!
//! Observation only: logs transactions carrying Rune metadata so the traffic
//! can be sized up before a full parser exists. Emits no events.

use carv_core::Transaction;
use tracing::debug;

use crate::error::Result;
use crate::parser::{ParsedTx, Parser};

/// ASM prefix marking a Rune metadata output (0x52 = 'R').
pub const RUNE_PREFIX: &str = "OP_RETURN OP_PUSHBYTES_1 52 ";

/// Parser stub for the Rune protocol.
#[derive(Debug, Default)]
pub struct RuneParser;

impl Parser for RuneParser {
    fn parse(&self, tx: &Transaction) -> Result<ParsedTx> {
        for vout in &tx.vout {
            if vout.asm.starts_with(RUNE_PREFIX) {
                debug!(txid = %tx.txid, asm = %vout.asm, "rune metadata observed");
            }
        }
        Ok(ParsedTx::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carv_core::TxOut;

    #[test]
    fn test_rune_metadata_emits_nothing() {
        let tx = Transaction {
            txid: "1".to_string(),
            vin: vec![],
            vout: vec![TxOut {
                value: 0,
                address: String::new(),
                asm: format!("{RUNE_PREFIX}OP_PUSHBYTES_2 0102"),
            }],
        };
        assert!(RuneParser.parse(&tx).unwrap().is_empty());
    }
}
