//! Meta-protocol parsers for the Carv Coin indexer.
//!
//! A [`Parser`] turns one Bitcoin transaction into typed events. The
//! transformer runs every registered parser over every transaction of a
//! block; [`CarvParser`] is the real protocol, [`RuneParser`] a logging stub
//! showing where a second protocol plugs in.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod carv;
mod error;
mod parser;
mod rune;

pub use carv::{CarvParser, CARV_PREFIX};
pub use error::{ParseError, Result};
pub use parser::{ParsedTx, Parser};
pub use rune::{RuneParser, RUNE_PREFIX};
