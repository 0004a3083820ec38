//! Shared helpers for scenario and property tests.

use num_bigint::BigUint;

use remasc::{RemascContract, RemascState, RemascStorageProvider};
use remasc_core::config::RemascConfig;
use remasc_core::constants::REMASC_ADDRESS;
use remasc_core::error::RemascError;
use remasc_core::memory::{MemoryWorld, Transfer};
use remasc_core::types::{Address, Block, BlockHeader, Hash256, Transaction};

/// Beneficiary address used by [`test_config`].
pub const LABS: Address = Address([0xAA; 20]);

/// Simple address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

pub fn big(v: u64) -> BigUint {
    BigUint::from(v)
}

/// Miner of main-chain block `number`. Distinct from every [`addr`] seed.
pub fn miner(number: u64) -> Address {
    let mut bytes = [0x4D; 20];
    bytes[12..].copy_from_slice(&number.to_be_bytes());
    Address(bytes)
}

/// Small-chain parameters with round divisors.
pub fn test_config(maturity: u64, synthetic_span: u64) -> RemascConfig {
    RemascConfig {
        maturity,
        synthetic_span,
        rsk_labs_divisor: 10,
        publishers_divisor: 10,
        punishment_divisor: 10,
        late_uncle_inclusion_punishment_divisor: 10,
        paid_fees_multiplier: 2,
        paid_fees_divisor: 1,
        rsk_labs_address: LABS,
        ..RemascConfig::default()
    }
}

/// Sealed uncle header at `number`. `salt` keeps hashes of otherwise equal
/// uncles apart.
pub fn make_uncle(number: u64, coinbase: Address, paid_fees: u64, salt: u64) -> BlockHeader {
    BlockHeader {
        number,
        parent_hash: Hash256::ZERO,
        coinbase,
        timestamp: number,
        paid_fees,
        nonce: salt,
        hash: Hash256::ZERO,
    }
    .seal()
}

/// A linear chain with a separate state and block store.
///
/// Every pushed block credits its fees to the contract, the way block
/// execution does before the Remasc transaction runs.
#[derive(Debug, Default)]
pub struct TestChain {
    pub state: MemoryWorld,
    pub store: MemoryWorld,
    blocks: Vec<Block>,
}

impl TestChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block paying `paid_fees` and including `uncles`.
    pub fn push(&mut self, paid_fees: u64, uncles: Vec<BlockHeader>) -> &Block {
        self.push_with_hash(paid_fees, uncles, None)
    }

    /// Append a block, optionally forcing its hash instead of sealing it.
    pub fn push_with_hash(
        &mut self,
        paid_fees: u64,
        uncles: Vec<BlockHeader>,
        hash: Option<Hash256>,
    ) -> &Block {
        let number = self.blocks.len() as u64;
        let parent_hash = self.blocks.last().map(Block::hash).unwrap_or(Hash256::ZERO);
        let mut header = BlockHeader {
            number,
            parent_hash,
            coinbase: miner(number),
            timestamp: number,
            paid_fees,
            nonce: 0,
            hash: Hash256::ZERO,
        }
        .seal();
        if let Some(hash) = hash {
            header.hash = hash;
        }
        let block = Block {
            header,
            uncles,
            transactions: vec![Transaction::remasc(number)],
        };
        self.store.insert_block(block.clone());
        self.state.credit(REMASC_ADDRESS, paid_fees);
        self.blocks.push(block);
        &self.blocks[number as usize]
    }

    /// Append blocks without uncles, one per entry of `fees`.
    pub fn extend(&mut self, fees: &[u64]) {
        for &f in fees {
            self.push(f, vec![]);
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, number: u64) -> &Block {
        &self.blocks[number as usize]
    }

    /// Run the contract for block `number`.
    pub fn execute(&mut self, contract: &RemascContract, number: u64) -> Result<RemascState, RemascError> {
        let block = &self.blocks[number as usize];
        contract.execute(
            &mut self.state,
            &self.store,
            block,
            &Transaction::remasc(block.number()),
        )
    }

    /// Run the contract for every block in `range`, stopping at the first error.
    pub fn execute_range(
        &mut self,
        contract: &RemascContract,
        range: std::ops::RangeInclusive<u64>,
    ) -> Result<(), RemascError> {
        for number in range {
            self.execute(contract, number)?;
        }
        Ok(())
    }

    /// Contract state as persisted in storage.
    pub fn persisted(&self) -> RemascState {
        persisted_state(&self.state)
    }

    /// Transfers out of the contract since the last call.
    pub fn take_payouts(&mut self) -> Vec<Transfer> {
        self.state
            .take_transfers()
            .into_iter()
            .filter(|t| t.from == REMASC_ADDRESS)
            .collect()
    }
}

/// Load the contract state persisted in `world`.
pub fn persisted_state(world: &MemoryWorld) -> RemascState {
    RemascStorageProvider::load(world, REMASC_ADDRESS)
        .expect("contract storage unreadable")
        .snapshot()
}

/// Overwrite the persisted broken-selection-rule flag.
pub fn set_broken_selection_rule(world: &mut MemoryWorld, value: bool) {
    world.set_storage_cell(
        REMASC_ADDRESS,
        remasc_core::constants::CELL_BROKEN_SELECTION_RULE,
        remasc::codec::encode_bool(value),
    );
}

/// Sum of transfer amounts.
pub fn total(transfers: &[Transfer]) -> BigUint {
    transfers.iter().map(|t| &t.amount).sum()
}
