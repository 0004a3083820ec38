//! Sibling (uncle) records awaiting distribution.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use remasc_core::types::{Address, BlockHeader, Hash256};

/// Siblings keyed by the height they were mined at.
///
/// Within one height, siblings stay in the order their including blocks
/// listed them. Ordered by height so the storage encoding is canonical.
pub type SiblingsMap = BTreeMap<u64, Vec<Sibling>>;

/// An uncle block as remembered for later payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Sibling {
    /// Hash of the uncle header.
    pub hash: Hash256,
    /// Miner of the uncle.
    pub coinbase: Address,
    /// Fees the uncle would have collected.
    pub paid_fees: u64,
    /// Height of the main-chain block that first referenced the uncle.
    pub included_height: u64,
    /// Miner of that including block (the publisher).
    pub included_block_coinbase: Address,
}

impl Sibling {
    /// Record `uncle` as included by the block at `included_height` mined by
    /// `included_block_coinbase`.
    pub fn from_uncle(uncle: &BlockHeader, included_block_coinbase: Address, included_height: u64) -> Self {
        Self {
            hash: uncle.hash,
            coinbase: uncle.coinbase,
            paid_fees: uncle.paid_fees,
            included_height,
            included_block_coinbase,
        }
    }
}

impl fmt::Display for Sibling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sibling{{hash={}, coinbase={}, paid_fees={}, included_height={}, included_block_coinbase={}}}",
            self.hash, self.coinbase, self.paid_fees, self.included_height, self.included_block_coinbase
        )
    }
}
