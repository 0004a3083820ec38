//! Collaborator interfaces consumed by the reward engine.
//!
//! - [`StateAccess`] — account balances and contract storage (the host's state trie)
//! - [`BlockByDepth`] — ancestor lookup (the host's block store)
//!
//! The host guarantees exclusive access for the duration of one transaction,
//! so neither trait is required to be thread-safe.

use num_bigint::BigUint;

use crate::error::{RemascError, TransferError};
use crate::types::{Address, Block, Hash256};

/// Mutable view of account balances and contract storage.
pub trait StateAccess {
    /// Current balance of `address`. Unknown accounts have balance zero.
    fn balance(&self, address: &Address) -> Result<BigUint, RemascError>;

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InsufficientBalance`] if `from` holds less than `amount`
    /// - [`TransferError::State`] if the underlying state cannot be written
    fn transfer(&mut self, from: &Address, to: &Address, amount: &BigUint) -> Result<(), TransferError>;

    /// Raw bytes of a storage cell. Absent cells read as empty.
    fn get_storage_bytes(&self, address: &Address, key: &[u8]) -> Result<Vec<u8>, RemascError>;

    /// Overwrite a storage cell.
    fn put_storage_bytes(&mut self, address: &Address, key: &[u8], value: Vec<u8>) -> Result<(), RemascError>;
}

/// Ancestor lookup over the block store.
pub trait BlockByDepth {
    /// The block `depth` generations back from the block with `hash`.
    ///
    /// Depth 0 is the block with `hash` itself. Returns `None` if the walk
    /// leaves the known chain.
    fn block_by_hash_and_depth(&self, hash: &Hash256, depth: u64) -> Result<Option<Block>, RemascError>;
}
