//! The Remasc distribution engine.
//!
//! Runs once per block as the block's final transaction. Each run records the
//! block's uncles as siblings, accrues the fees of the block that just reached
//! maturity, and pays out one smoothed slice of the reward balance for that
//! height.

use std::fmt;
use std::num::NonZeroUsize;

use num_bigint::BigUint;
use tracing::{debug, warn};

use remasc_core::config::RemascConfig;
use remasc_core::constants::REMASC_ADDRESS;
use remasc_core::error::RemascError;
use remasc_core::traits::{BlockByDepth, StateAccess};
use remasc_core::types::{Address, Block, BlockHeader, Transaction};

use crate::calculator::{late_inclusion_penalty, SiblingPayment};
use crate::selection::is_broken_selection_rule;
use crate::sibling::Sibling;
use crate::state::RemascState;
use crate::storage::RemascStorageProvider;

/// One invocation of the reward distribution.
///
/// Built per block with the host's state and block store, driven by a single
/// [`process_miners_fees`](Remasc::process_miners_fees) call, then either
/// [`save`](Remasc::save)d or dropped. Dropping without saving discards every
/// storage change; balance transfers follow the surrounding transaction.
pub struct Remasc<'a, S: ?Sized, B: ?Sized> {
    config: &'a RemascConfig,
    state: &'a mut S,
    blocks: &'a B,
    provider: RemascStorageProvider,
    invoked: bool,
}

impl<S: ?Sized, B: ?Sized> fmt::Debug for Remasc<'_, S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remasc")
            .field("provider", &self.provider)
            .field("invoked", &self.invoked)
            .finish_non_exhaustive()
    }
}

impl<'a, S, B> Remasc<'a, S, B>
where
    S: StateAccess + ?Sized,
    B: BlockByDepth + ?Sized,
{
    /// Load the contract's persistent state and prepare an invocation.
    ///
    /// # Errors
    ///
    /// - [`RemascError::InvalidConfig`] if a count or divisor is zero
    /// - [`RemascError::CorruptState`] if a storage cell cannot be decoded
    pub fn new(config: &'a RemascConfig, state: &'a mut S, blocks: &'a B) -> Result<Self, RemascError> {
        config.validate()?;
        let provider = RemascStorageProvider::load(&*state, REMASC_ADDRESS)?;
        Ok(Self {
            config,
            state,
            blocks,
            provider,
            invoked: false,
        })
    }

    /// Copy of the in-memory contract state.
    pub fn state_for_debugging(&self) -> RemascState {
        self.provider.snapshot()
    }

    /// Persist the storage changes of this invocation.
    pub fn save(mut self) -> Result<(), RemascError> {
        self.provider.save(&mut *self.state)
    }

    /// Distribute matured fees for `block`.
    ///
    /// # Errors
    ///
    /// - [`RemascError::InvalidInvocation`] if `tx` is not the synthetic
    ///   Remasc transaction, or this invocation already ran
    /// - [`RemascError::AncestorMissing`] if the matured block is not in the store
    /// - [`RemascError::ConsensusViolation`] if the contract cannot cover a payout
    pub fn process_miners_fees(&mut self, block: &Block, tx: &Transaction) -> Result<(), RemascError> {
        if !tx.is_remasc() {
            warn!(height = block.number(), sender = %tx.sender, "rejected remasc call from non-remasc transaction");
            return Err(RemascError::InvalidInvocation(
                "invoked outside the block's remasc transaction".into(),
            ));
        }
        if self.invoked {
            warn!(height = block.number(), "rejected repeated remasc invocation");
            return Err(RemascError::InvalidInvocation(
                "remasc already ran for this block".into(),
            ));
        }
        self.invoked = true;

        self.add_new_siblings(block);

        let block_number = block.number();
        let maturity = self.config.maturity;
        if block_number <= maturity {
            debug!(height = block_number, "first block has not reached maturity yet");
            return Ok(());
        }
        let processing_height = block_number - maturity;

        let parent_hash = block.parent_hash();
        let depth = maturity - 1;
        let matured = self
            .blocks
            .block_by_hash_and_depth(&parent_hash, depth)?
            .ok_or(RemascError::AncestorMissing {
                hash: parent_hash,
                depth,
            })?
            .header;

        let mut reward_balance = self.provider.reward_balance() + matured.paid_fees;
        self.provider.set_reward_balance(reward_balance.clone());

        if processing_height < self.config.synthetic_span {
            debug!(
                height = block_number,
                "first block has not reached maturity + synthetic span yet"
            );
            return Ok(());
        }

        let burned_before = self.provider.burned_balance().clone();

        let mut full_reward = &reward_balance / self.config.synthetic_span;
        reward_balance -= &full_reward;
        self.provider.set_reward_balance(reward_balance);

        let rsk_labs_address = self.config.rsk_labs_address;
        let pay_to_rsk_labs = &full_reward / self.config.rsk_labs_divisor;
        self.transfer(&rsk_labs_address, &pay_to_rsk_labs)?;
        full_reward -= &pay_to_rsk_labs;

        // Federation cut (full_reward / federation_divisor) stays disabled
        // until federator payouts have a destination.

        let siblings = self
            .provider
            .siblings()
            .get(&processing_height)
            .cloned()
            .unwrap_or_default();

        match NonZeroUsize::new(siblings.len()) {
            None => self.pay_without_siblings(&matured, full_reward.clone())?,
            Some(count) => self.pay_with_siblings(&matured, &full_reward, &siblings, count, processing_height)?,
        }

        // Heights at or below the processed one can never be paid again,
        // including uncles recorded after their height matured.
        let siblings_map = self.provider.siblings_mut();
        let pending = siblings_map.split_off(&(processing_height + 1));
        *siblings_map = pending;

        debug!(
            height = block_number,
            processing_height,
            siblings = siblings.len(),
            rsk_labs = %pay_to_rsk_labs,
            full_reward = %full_reward,
            burned = %(self.provider.burned_balance() - &burned_before),
            broken_selection_rule = self.provider.broken_selection_rule(),
            "distributed matured block reward"
        );
        Ok(())
    }

    /// Remember this block's uncles for payout once their height matures.
    fn add_new_siblings(&mut self, block: &Block) {
        let included_height = block.number();
        let publisher = block.coinbase();
        let siblings = self.provider.siblings_mut();
        for uncle in &block.uncles {
            siblings
                .entry(uncle.number)
                .or_default()
                .push(Sibling::from_uncle(uncle, publisher, included_height));
        }
    }

    /// Whole reward to the main-chain miner, less punishment if the previous
    /// height broke the selection rule.
    fn pay_without_siblings(&mut self, matured: &BlockHeader, mut reward: BigUint) -> Result<(), RemascError> {
        if self.provider.broken_selection_rule() {
            let punishment = &reward / self.config.punishment_divisor;
            reward -= &punishment;
            self.provider.add_to_burn_balance(&punishment);
        }
        self.transfer(&matured.coinbase, &reward)?;
        self.provider.set_broken_selection_rule(false);
        Ok(())
    }

    /// Split among publishers, sibling miners, and the main-chain miner, then
    /// re-evaluate the selection rule for the next height.
    ///
    /// Split remainders and any punishment are burned up front; late
    /// penalties are burned per sibling.
    fn pay_with_siblings(
        &mut self,
        matured: &BlockHeader,
        full_reward: &BigUint,
        siblings: &[Sibling],
        count: NonZeroUsize,
        processing_height: u64,
    ) -> Result<(), RemascError> {
        let previous_broken = self.provider.broken_selection_rule();
        let payment = SiblingPayment::compute(full_reward, previous_broken, count, self.config);

        for sibling in siblings {
            self.transfer(&sibling.included_block_coinbase, &payment.individual_publisher_reward)?;
        }
        self.provider
            .add_to_burn_balance(&payment.burned(count, previous_broken));

        for sibling in siblings {
            let blocks_late = sibling.included_height.saturating_sub(processing_height + 1);
            let penalty = late_inclusion_penalty(&payment.individual_miner_reward, blocks_late, self.config);
            self.transfer(&sibling.coinbase, &(&payment.individual_miner_reward - &penalty))?;
            self.provider.add_to_burn_balance(&penalty);
        }

        self.transfer(&matured.coinbase, &payment.individual_miner_reward)?;

        let broken = is_broken_selection_rule(matured, siblings, self.config);
        if broken {
            warn!(height = processing_height, miner = %matured.coinbase, "selection rule broken");
        }
        self.provider.set_broken_selection_rule(broken);
        Ok(())
    }

    fn transfer(&mut self, to: &Address, amount: &BigUint) -> Result<(), RemascError> {
        self.state.transfer(&REMASC_ADDRESS, to, amount)?;
        Ok(())
    }
}
