//! Precompiled-contract entry point.
//!
//! [`RemascContract`] is what the block executor calls for the final
//! transaction of every block. It owns no state between blocks: each call
//! loads the contract storage, runs the engine, and persists only on success.

use remasc_core::config::RemascConfig;
use remasc_core::error::RemascError;
use remasc_core::traits::{BlockByDepth, StateAccess};
use remasc_core::types::{Block, Transaction};

use crate::engine::Remasc;
use crate::state::RemascState;

/// The Remasc precompiled contract.
#[derive(Debug, Clone)]
pub struct RemascContract {
    config: RemascConfig,
}

impl RemascContract {
    /// Create the contract with frozen network parameters.
    pub fn new(config: RemascConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RemascConfig {
        &self.config
    }

    /// Run the reward distribution for `block` on behalf of `tx`.
    ///
    /// The configuration is validated on every call. On error nothing is
    /// written to contract storage; the caller reverts the transaction,
    /// which also undoes any transfers already made.
    pub fn execute<S, B>(
        &self,
        state: &mut S,
        blocks: &B,
        block: &Block,
        tx: &Transaction,
    ) -> Result<RemascState, RemascError>
    where
        S: StateAccess + ?Sized,
        B: BlockByDepth + ?Sized,
    {
        let mut remasc = Remasc::new(&self.config, state, blocks)?;
        remasc.process_miners_fees(block, tx)?;
        let snapshot = remasc.state_for_debugging();
        remasc.save()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use remasc_core::constants::{CELL_SIBLINGS, REMASC_ADDRESS};
    use remasc_core::memory::MemoryWorld;
    use remasc_core::types::{Address, BlockHeader, Hash256};

    fn genesis_and_child(world: &mut MemoryWorld) -> Block {
        let genesis = BlockHeader {
            number: 0,
            parent_hash: Hash256::ZERO,
            coinbase: Address([0; 20]),
            timestamp: 0,
            paid_fees: 0,
            nonce: 0,
            hash: Hash256::ZERO,
        }
        .seal();
        let child = BlockHeader {
            number: 1,
            parent_hash: genesis.hash,
            coinbase: Address([1; 20]),
            timestamp: 1,
            paid_fees: 0,
            nonce: 0,
            hash: Hash256::ZERO,
        }
        .seal();
        world.insert_block(Block {
            header: genesis.clone(),
            uncles: vec![],
            transactions: vec![],
        });
        Block {
            header: child,
            uncles: vec![genesis],
            transactions: vec![Transaction::remasc(1)],
        }
    }

    #[test]
    fn execute_persists_on_success() {
        let mut world = MemoryWorld::new();
        let block = genesis_and_child(&mut world);
        let contract = RemascContract::new(RemascConfig::default());
        let store = world.clone();
        let state = contract
            .execute(&mut world, &store, &block, &Transaction::remasc(1))
            .unwrap();
        assert_eq!(state.siblings[&0].len(), 1);
        assert!(world.storage_cell(&REMASC_ADDRESS, CELL_SIBLINGS).is_some());
    }

    #[test]
    fn execute_writes_nothing_on_invalid_invocation() {
        let mut world = MemoryWorld::new();
        let block = genesis_and_child(&mut world);
        let contract = RemascContract::new(RemascConfig::default());
        let store = world.clone();
        let err = contract
            .execute(&mut world, &store, &block, &Transaction::default())
            .unwrap_err();
        assert!(matches!(err, RemascError::InvalidInvocation(_)));
        assert!(world.storage_cell(&REMASC_ADDRESS, CELL_SIBLINGS).is_none());
        assert_eq!(world.balance_of(&REMASC_ADDRESS), BigUint::default());
    }

    #[test]
    fn execute_rejects_zero_divisor_before_touching_state() {
        let mut world = MemoryWorld::new();
        let block = genesis_and_child(&mut world);
        let contract = RemascContract::new(RemascConfig {
            rsk_labs_divisor: 0,
            ..RemascConfig::default()
        });
        let store = world.clone();
        let err = contract
            .execute(&mut world, &store, &block, &Transaction::remasc(1))
            .unwrap_err();
        assert!(matches!(err, RemascError::InvalidConfig(_)));
        assert!(world.storage_cell(&REMASC_ADDRESS, CELL_SIBLINGS).is_none());
    }

    #[test]
    fn config_is_exposed() {
        let contract = RemascContract::new(RemascConfig::default());
        assert_eq!(contract.config().maturity, 4000);
    }
}
