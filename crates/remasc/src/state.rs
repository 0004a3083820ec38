//! Debug snapshot of the contract state.

use std::fmt;

use num_bigint::BigUint;
use serde::Serialize;

use remasc_core::types::serialize_biguint;

use crate::sibling::SiblingsMap;

/// By-value copy of the four persistent cells. Not used by the engine
/// itself; returned to hosts for inspection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemascState {
    #[serde(serialize_with = "serialize_biguint")]
    pub reward_balance: BigUint,
    #[serde(serialize_with = "serialize_biguint")]
    pub burned_balance: BigUint,
    pub siblings: SiblingsMap,
    pub broken_selection_rule: bool,
}

impl fmt::Display for RemascState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sibling_count: usize = self.siblings.values().map(Vec::len).sum();
        write!(
            f,
            "RemascState{{reward_balance={}, burned_balance={}, siblings={} at {} heights, broken_selection_rule={}}}",
            self.reward_balance,
            self.burned_balance,
            sibling_count,
            self.siblings.len(),
            self.broken_selection_rule
        )
    }
}
