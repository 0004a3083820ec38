//! In-memory implementation of the engine's collaborators.
//!
//! [`MemoryWorld`] implements both [`StateAccess`] and [`BlockByDepth`] over
//! in-memory maps and records every transfer. Suitable for tests and simulation;
//! the production node backs these traits with its state trie and block store.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{RemascError, TransferError};
use crate::traits::{BlockByDepth, StateAccess};
use crate::types::{Address, Block, Hash256};

/// A single recorded balance movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: BigUint,
}

/// In-memory accounts, contract storage, and block store.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    /// Account balances, ordered by address. Missing accounts hold zero.
    balances: BTreeMap<Address, BigUint>,
    /// Contract storage: (contract, key) → bytes.
    storage: HashMap<(Address, Vec<u8>), Vec<u8>>,
    /// Blocks by header hash.
    blocks: HashMap<Hash256, Block>,
    /// Every successful transfer, in order.
    transfers: Vec<Transfer>,
}

impl MemoryWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into `address`. Used to model fees credited to the
    /// contract during block execution.
    pub fn credit(&mut self, address: Address, amount: impl Into<BigUint>) {
        *self.balances.entry(address).or_default() += amount.into();
    }

    /// Add a block to the block store.
    pub fn insert_block(&mut self, block: Block) {
        self.blocks.insert(block.hash(), block);
    }

    /// Balance of `address` (zero if unknown).
    pub fn balance_of(&self, address: &Address) -> BigUint {
        self.balances.get(address).cloned().unwrap_or_default()
    }

    /// All accounts with a non-zero balance, in address order.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &BigUint)> {
        self.balances.iter().filter(|(_, v)| !v.is_zero())
    }

    /// Transfers recorded since creation or the last [`take_transfers`](Self::take_transfers).
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Drain the transfer log.
    pub fn take_transfers(&mut self) -> Vec<Transfer> {
        std::mem::take(&mut self.transfers)
    }

    /// Raw storage cell, for inspecting or corrupting state in tests.
    pub fn storage_cell(&self, address: &Address, key: &[u8]) -> Option<&[u8]> {
        self.storage.get(&(*address, key.to_vec())).map(Vec::as_slice)
    }

    /// Overwrite a raw storage cell.
    pub fn set_storage_cell(&mut self, address: Address, key: &[u8], value: Vec<u8>) {
        self.storage.insert((address, key.to_vec()), value);
    }
}

impl StateAccess for MemoryWorld {
    fn balance(&self, address: &Address) -> Result<BigUint, RemascError> {
        Ok(self.balance_of(address))
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: &BigUint) -> Result<(), TransferError> {
        let have = self.balance_of(from);
        if &have < amount {
            return Err(TransferError::InsufficientBalance {
                address: *from,
                have: have.to_string(),
                need: amount.to_string(),
            });
        }
        self.balances.insert(*from, have - amount);
        *self.balances.entry(*to).or_default() += amount;
        self.transfers.push(Transfer {
            from: *from,
            to: *to,
            amount: amount.clone(),
        });
        Ok(())
    }

    fn get_storage_bytes(&self, address: &Address, key: &[u8]) -> Result<Vec<u8>, RemascError> {
        Ok(self.storage_cell(address, key).map(<[u8]>::to_vec).unwrap_or_default())
    }

    fn put_storage_bytes(&mut self, address: &Address, key: &[u8], value: Vec<u8>) -> Result<(), RemascError> {
        self.set_storage_cell(*address, key, value);
        Ok(())
    }
}

impl BlockByDepth for MemoryWorld {
    fn block_by_hash_and_depth(&self, hash: &Hash256, depth: u64) -> Result<Option<Block>, RemascError> {
        let Some(mut block) = self.blocks.get(hash) else {
            return Ok(None);
        };
        for _ in 0..depth {
            match self.blocks.get(&block.parent_hash()) {
                Some(parent) => block = parent,
                None => return Ok(None),
            }
        }
        Ok(Some(block.clone()))
    }
}
