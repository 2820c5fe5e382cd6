//! The Carv Coin protocol parser.
//!
//! Carv metadata rides in an OP_RETURN output whose pushed payload starts
//! with the byte `0x43` ('C'). The remaining push data is a varint array:
//! four values deploy a coin, one value mints or transfers depending on
//! whether the transaction spends coin-bearing UTXOs.

use std::sync::Arc;

use carv_core::{
    base26, varint, BalanceChangeEvent, CoinArgs, CoinView, NewCoinEvent, Transaction, UnspentCoin,
    CHAIN_ID, PROTOCOL_CARV,
};

use crate::error::{ParseError, Result};
use crate::parser::{ParsedTx, Parser};

/// ASM prefix marking a Carv metadata output (0x43 = 'C').
pub const CARV_PREFIX: &str = "OP_RETURN OP_PUSHBYTES_1 43 ";

const PUSHBYTES: &str = "OP_PUSHBYTES_";

const COIN_ID_LEN_MIN: usize = 1;
const COIN_ID_LEN_MAX: usize = 6;
const COIN_SUPPLY_MIN: u64 = 1;
const COIN_SATS_MIN: u64 = 10_000;
const COIN_MINT_LIMIT_MIN: u64 = 1;
/// 1% of total BTC supply, in satoshis.
const COIN_LOCKED_BTC_MAX: u64 = 21_000_000 * 1_000_000;

/// Parser for the Carv Coin protocol.
pub struct CarvParser {
    view: Arc<dyn CoinView>,
}

impl CarvParser {
    /// Create a parser reading coin state through the given view.
    pub fn new(view: Arc<dyn CoinView>) -> Self {
        Self { view }
    }

    fn deploy(&self, args: &[u64], meta_index: usize) -> Result<NewCoinEvent> {
        let id = base26::decode(args[0]);
        let (max, sats, limit) = (args[1], args[2], args[3]);

        if id.len() < COIN_ID_LEN_MIN
            || id.len() > COIN_ID_LEN_MAX
            || max < COIN_SUPPLY_MIN
            || sats < COIN_SATS_MIN
            || limit < COIN_MINT_LIMIT_MIN
        {
            return Err(ParseError::invalid(format!(
                "invalid arguments for deployment, id = {id}, max = {max}, sats = {sats}, limit = {limit}"
            )));
        }

        match max.checked_mul(sats) {
            Some(locked_btc) if locked_btc <= COIN_LOCKED_BTC_MAX => {}
            _ => {
                return Err(ParseError::invalid(format!(
                    "locked BTC out of range, max = {max}, sats = {sats}"
                )))
            }
        }

        if meta_index != 0 {
            return Err(ParseError::invalid(format!(
                "metadata for deployment placed at output {meta_index}, should be the first"
            )));
        }

        if self.view.coin_info(&id).is_some() {
            return Err(ParseError::invalid(format!("coin ID already taken: {id}")));
        }

        Ok(NewCoinEvent {
            chain_id: CHAIN_ID.to_string(),
            protocol: PROTOCOL_CARV.to_string(),
            coin_id: id,
            args: CoinArgs { max, sats, limit },
        })
    }

    fn mint_or_transfer(
        &self,
        coin_id_b26: u64,
        meta_index: usize,
        tx: &Transaction,
        spent_coins: &[UnspentCoin],
    ) -> Result<Vec<BalanceChangeEvent>> {
        let id = base26::decode(coin_id_b26);
        let Some(ci) = self.view.coin_info(&id) else {
            return Err(ParseError::invalid(format!("coin ID not found: {id}")));
        };
        let sats = ci.args.sats;

        let total_input: u64 = spent_coins
            .iter()
            .filter(|uc| uc.coin_id == id)
            .map(|uc| uc.amount)
            .sum();

        if total_input == 0 {
            // Mint: the receiving output precedes the metadata.
            if meta_index != 1 {
                return Err(ParseError::invalid(format!(
                    "mint metadata placed at output {meta_index}, should follow the receiving output"
                )));
            }
            let first = &tx.vout[0];
            if first.value == 0 || first.value % sats != 0 || first.address.is_empty() {
                return Err(ParseError::invalid(format!(
                    "the valid output of Carv Coin {id} should be an integer multiple of {sats}"
                )));
            }
            let delta = first.value / sats;

            match ci.total_supply.checked_add(delta) {
                Some(supply) if supply <= ci.args.max => {}
                _ => {
                    return Err(ParseError::invalid(format!(
                        "mint Carv Coin {id} exceed max supply, total_supply = {}, delta = {delta}, max = {}",
                        ci.total_supply, ci.args.max
                    )))
                }
            }

            return Ok(vec![BalanceChangeEvent {
                chain_id: CHAIN_ID.to_string(),
                protocol: PROTOCOL_CARV.to_string(),
                coin_id: id,
                address: first.address.clone(),
                delta: delta as i64,
                utxo: format!("{}:0", tx.txid),
                is_mint: true,
            }]);
        }

        // Transfer: every output before the metadata receives coins; outputs
        // after it are change carriers.
        let mut events = Vec::with_capacity(meta_index);
        let mut total_output: u64 = 0;
        for (j, vout) in tx.vout.iter().enumerate().take(meta_index) {
            if vout.value == 0 || vout.value % sats != 0 || vout.address.is_empty() {
                return Err(ParseError::invalid(format!(
                    "the valid output of Carv Coin {id} should be an integer multiple of {sats}"
                )));
            }
            let delta = vout.value / sats;
            total_output += delta;
            events.push(BalanceChangeEvent {
                chain_id: CHAIN_ID.to_string(),
                protocol: PROTOCOL_CARV.to_string(),
                coin_id: id.clone(),
                address: vout.address.clone(),
                delta: delta as i64,
                utxo: format!("{}:{j}", tx.txid),
                is_mint: false,
            });
        }

        if total_output > total_input {
            return Err(ParseError::invalid(format!(
                "insufficient inputs for transfer, input = {total_input}, output = {total_output}"
            )));
        }
        if total_output < total_input {
            // Burning happens by spending without metadata, never implicitly.
            return Err(ParseError::invalid(format!(
                "transfer would implicitly burn coins, input = {total_input}, output = {total_output}"
            )));
        }

        Ok(events)
    }
}

impl Parser for CarvParser {
    fn parse(&self, tx: &Transaction) -> Result<ParsedTx> {
        // Burn side first: spending a coin-bearing UTXO always debits, with
        // or without Carv metadata in the transaction.
        let spent_coins = self.view.coins_in_utxos(&tx.spent_utxos());
        let mut parsed = ParsedTx {
            new_coin_events: Vec::new(),
            balance_change_events: spent_coins.iter().map(debit_event).collect(),
        };

        let mut meta: Option<usize> = None;
        for (i, vout) in tx.vout.iter().enumerate() {
            if vout.value != 0 || !vout.address.is_empty() || !vout.asm.starts_with(CARV_PREFIX) {
                continue;
            }
            if meta.is_some() {
                return Err(ParseError::malformed(format!(
                    "multiple Carv protocol metadata found in tx {}",
                    tx.txid
                )));
            }
            meta = Some(i);
        }
        let Some(meta_index) = meta else {
            return Ok(parsed);
        };

        let args = decode_metadata(&tx.vout[meta_index].asm)?;
        match args.len() {
            4 => parsed
                .new_coin_events
                .push(self.deploy(&args, meta_index)?),
            1 => parsed.balance_change_events.extend(self.mint_or_transfer(
                args[0],
                meta_index,
                tx,
                &spent_coins,
            )?),
            _ => {
                return Err(ParseError::malformed(format!(
                    "invalid Carv protocol metadata: {}",
                    tx.vout[meta_index].asm
                )))
            }
        }
        Ok(parsed)
    }
}

fn debit_event(uc: &UnspentCoin) -> BalanceChangeEvent {
    BalanceChangeEvent {
        chain_id: CHAIN_ID.to_string(),
        protocol: PROTOCOL_CARV.to_string(),
        coin_id: uc.coin_id.clone(),
        address: uc.owner.clone(),
        delta: -(uc.amount as i64),
        utxo: uc.utxo.clone(),
        is_mint: false,
    }
}

/// Split the metadata ASM into its varint argument array.
fn decode_metadata(asm: &str) -> Result<Vec<u64>> {
    let body = &asm[CARV_PREFIX.len()..];
    let rest = body
        .strip_prefix(PUSHBYTES)
        .ok_or_else(|| ParseError::malformed(format!("metadata is too short: {asm}")))?;

    let mut segments = rest.split(' ');
    let (length, payload) = match (segments.next(), segments.next(), segments.next()) {
        (Some(length), Some(payload), None) => (length, payload),
        _ => {
            return Err(ParseError::malformed(format!(
                "invalid metadata format: {asm}"
            )))
        }
    };

    let length: usize = length
        .parse()
        .map_err(|_| ParseError::malformed(format!("error parsing metadata length: {asm}")))?;
    if payload.len() != length * 2 {
        return Err(ParseError::malformed(format!(
            "metadata length mismatch: {asm}"
        )));
    }

    let bytes = hex::decode(payload).map_err(|_| {
        ParseError::malformed(format!("failed to decode metadata into bytes: {asm}"))
    })?;
    varint::decode_array(&bytes)
        .map_err(|_| ParseError::malformed(format!("truncated varint in metadata: {asm}")))
}
