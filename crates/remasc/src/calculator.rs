//! Split of one height's reward among the main-chain miner, sibling miners,
//! and the publishers that included those siblings.
//!
//! Pure integer arithmetic. Division remainders end up in
//! [`miners_surplus`](SiblingPayment::miners_surplus) and
//! [`publishers_surplus`](SiblingPayment::publishers_surplus), which the
//! engine burns.

use std::num::NonZeroUsize;

use num_bigint::BigUint;
use num_traits::Zero;

use remasc_core::config::RemascConfig;

/// Amounts owed to each party for one height with siblings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiblingPayment {
    /// Paid to the main-chain miner and, before late penalties, to each
    /// sibling miner.
    pub individual_miner_reward: BigUint,
    /// Paid to the includer of each sibling.
    pub individual_publisher_reward: BigUint,
    /// Remainder of the miners' pool after the even split.
    pub miners_surplus: BigUint,
    /// Remainder of the publishers' pool after the even split.
    pub publishers_surplus: BigUint,
    /// Per-party punishment. Always computed; only withheld (and burned
    /// `siblings + 1` times) when the previous height broke the selection
    /// rule.
    pub punishment: BigUint,
}

impl SiblingPayment {
    /// Split `full_reward` for a height with `siblings` siblings.
    ///
    /// With `previous_broken_selection_rule` set, `punishment × (siblings + 1)`
    /// is taken off the top before the pool is split. The punishment is
    /// `full_reward / punishment_divisor`, capped at
    /// `full_reward / (siblings + 1)` so the pool stays non-negative.
    pub fn compute(
        full_reward: &BigUint,
        previous_broken_selection_rule: bool,
        siblings: NonZeroUsize,
        config: &RemascConfig,
    ) -> Self {
        let publishers = BigUint::from(siblings.get());
        let miners = &publishers + 1u32;

        let punishment = (full_reward / config.punishment_divisor).min(full_reward / &miners);
        let pool = if previous_broken_selection_rule {
            full_reward - &punishment * &miners
        } else {
            full_reward.clone()
        };

        let publishers_reward = &pool / config.publishers_divisor;
        let miners_reward = &pool - &publishers_reward;

        let individual_publisher_reward = &publishers_reward / &publishers;
        let publishers_surplus = &publishers_reward - &individual_publisher_reward * &publishers;

        let individual_miner_reward = &miners_reward / &miners;
        let miners_surplus = &miners_reward - &individual_miner_reward * &miners;

        Self {
            individual_miner_reward,
            individual_publisher_reward,
            miners_surplus,
            publishers_surplus,
            punishment,
        }
    }

    /// Total burned by the split itself, excluding late-inclusion penalties.
    pub fn burned(&self, siblings: NonZeroUsize, previous_broken_selection_rule: bool) -> BigUint {
        let mut burned = &self.miners_surplus + &self.publishers_surplus;
        if previous_broken_selection_rule {
            burned += &self.punishment * BigUint::from(siblings.get() + 1);
        }
        burned
    }
}

/// Late-inclusion penalty for a sibling included `blocks_late` blocks after
/// the earliest possible height. Never exceeds `reward`.
pub fn late_inclusion_penalty(reward: &BigUint, blocks_late: u64, config: &RemascConfig) -> BigUint {
    if blocks_late == 0 || reward.is_zero() {
        return BigUint::zero();
    }
    (reward * blocks_late / config.late_uncle_inclusion_punishment_divisor).min(reward.clone())
}
