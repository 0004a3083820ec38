//! Persistent cells of the Remasc contract.
//!
//! [`RemascStorageProvider`] reads the four cells once, hands out in-memory
//! values for the engine to mutate, and on [`save`](RemascStorageProvider::save)
//! writes back only the cells whose value differs from what was loaded.
//! All changed cells are encoded before the first write.

use num_bigint::BigUint;

use remasc_core::constants::{
    CELL_BROKEN_SELECTION_RULE, CELL_BURNED_BALANCE, CELL_REWARD_BALANCE, CELL_SIBLINGS,
};
use remasc_core::error::{CodecError, RemascError};
use remasc_core::traits::StateAccess;
use remasc_core::types::Address;

use crate::codec;
use crate::sibling::SiblingsMap;
use crate::state::RemascState;

/// Cell name for error reporting.
fn cell_name(key: &[u8]) -> &'static str {
    match key {
        CELL_REWARD_BALANCE => "REWARD_BALANCE",
        CELL_BURNED_BALANCE => "BURNED_BALANCE",
        CELL_BROKEN_SELECTION_RULE => "BROKEN_SELECTION_RULE",
        _ => "SIBLINGS",
    }
}

fn read_cell<S, T>(
    state: &S,
    contract: &Address,
    key: &'static [u8],
    decode: impl FnOnce(&[u8]) -> Result<T, CodecError>,
) -> Result<T, RemascError>
where
    S: StateAccess + ?Sized,
{
    let bytes = state.get_storage_bytes(contract, key)?;
    decode(&bytes).map_err(|source| RemascError::CorruptState {
        cell: cell_name(key),
        source,
    })
}

/// In-memory view over the contract's storage cells.
#[derive(Clone, Debug)]
pub struct RemascStorageProvider {
    contract: Address,
    current: RemascState,
    /// Values as last loaded or saved.
    persisted: RemascState,
}

impl RemascStorageProvider {
    /// Read and decode all four cells of `contract`.
    ///
    /// # Errors
    ///
    /// - [`RemascError::CorruptState`] if any cell holds malformed bytes
    /// - [`RemascError::Storage`] if the state cannot be read
    pub fn load<S: StateAccess + ?Sized>(state: &S, contract: Address) -> Result<Self, RemascError> {
        let loaded = RemascState {
            reward_balance: read_cell(state, &contract, CELL_REWARD_BALANCE, codec::decode_biguint)?,
            burned_balance: read_cell(state, &contract, CELL_BURNED_BALANCE, codec::decode_biguint)?,
            broken_selection_rule: read_cell(
                state,
                &contract,
                CELL_BROKEN_SELECTION_RULE,
                codec::decode_bool,
            )?,
            siblings: read_cell(state, &contract, CELL_SIBLINGS, codec::decode_siblings)?,
        };
        Ok(Self {
            contract,
            current: loaded.clone(),
            persisted: loaded,
        })
    }

    pub fn reward_balance(&self) -> &BigUint {
        &self.current.reward_balance
    }

    pub fn set_reward_balance(&mut self, value: BigUint) {
        self.current.reward_balance = value;
    }

    pub fn burned_balance(&self) -> &BigUint {
        &self.current.burned_balance
    }

    /// Add `amount` to the burned balance. The burned balance only grows.
    pub fn add_to_burn_balance(&mut self, amount: &BigUint) {
        self.current.burned_balance += amount;
    }

    pub fn broken_selection_rule(&self) -> bool {
        self.current.broken_selection_rule
    }

    pub fn set_broken_selection_rule(&mut self, value: bool) {
        self.current.broken_selection_rule = value;
    }

    pub fn siblings(&self) -> &SiblingsMap {
        &self.current.siblings
    }

    pub fn siblings_mut(&mut self) -> &mut SiblingsMap {
        &mut self.current.siblings
    }

    /// Copy of the current in-memory values.
    pub fn snapshot(&self) -> RemascState {
        self.current.clone()
    }

    /// Whether any cell differs from its persisted value.
    pub fn is_dirty(&self) -> bool {
        self.current != self.persisted
    }

    /// Write back changed cells.
    pub fn save<S: StateAccess + ?Sized>(&mut self, state: &mut S) -> Result<(), RemascError> {
        let mut writes: Vec<(&'static [u8], Vec<u8>)> = Vec::with_capacity(4);
        if self.current.reward_balance != self.persisted.reward_balance {
            writes.push((CELL_REWARD_BALANCE, codec::encode_biguint(&self.current.reward_balance)));
        }
        if self.current.burned_balance != self.persisted.burned_balance {
            writes.push((CELL_BURNED_BALANCE, codec::encode_biguint(&self.current.burned_balance)));
        }
        if self.current.broken_selection_rule != self.persisted.broken_selection_rule {
            writes.push((
                CELL_BROKEN_SELECTION_RULE,
                codec::encode_bool(self.current.broken_selection_rule),
            ));
        }
        if self.current.siblings != self.persisted.siblings {
            writes.push((CELL_SIBLINGS, codec::encode_siblings(&self.current.siblings)));
        }

        for (key, bytes) in writes {
            state.put_storage_bytes(&self.contract, key, bytes)?;
        }
        self.persisted = self.current.clone();
        Ok(())
    }
}
