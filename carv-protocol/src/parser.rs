//! The parser seam between the transformer and the protocol implementations.

use carv_core::{BalanceChangeEvent, NewCoinEvent, Transaction};

use crate::error::Result;

/// Events one parser extracted from one transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTx {
    /// Coin deployments.
    pub new_coin_events: Vec<NewCoinEvent>,
    /// Balance movements, debits first, then credits in output order.
    pub balance_change_events: Vec<BalanceChangeEvent>,
}

impl ParsedTx {
    /// Whether the parser extracted anything from the transaction.
    pub fn is_empty(&self) -> bool {
        self.new_coin_events.is_empty() && self.balance_change_events.is_empty()
    }
}

/// One meta-protocol recogniser.
///
/// Errors are per-transaction: the caller drops the transaction and keeps
/// going with the rest of the block.
pub trait Parser: Send + Sync {
    /// Extract this protocol's events from one transaction.
    fn parse(&self, tx: &Transaction) -> Result<ParsedTx>;
}
