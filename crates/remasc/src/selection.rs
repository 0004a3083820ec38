//! Main-chain block selection rule.
//!
//! A miner is expected to build on the best sibling available at a height.
//! The rule is broken when some sibling either paid materially more fees
//! than the block that made it into the main chain, or has a smaller hash.

use num_bigint::BigUint;

use remasc_core::config::RemascConfig;
use remasc_core::types::BlockHeader;

use crate::sibling::Sibling;

/// Whether `sibling` should have been chosen over `main`.
pub fn beats_main_chain_block(main: &BlockHeader, sibling: &Sibling, config: &RemascConfig) -> bool {
    let threshold = BigUint::from(config.paid_fees_multiplier) * main.paid_fees / config.paid_fees_divisor;
    BigUint::from(sibling.paid_fees) > threshold || sibling.hash < main.hash
}

/// Whether any sibling at `main`'s height beats it.
pub fn is_broken_selection_rule(main: &BlockHeader, siblings: &[Sibling], config: &RemascConfig) -> bool {
    siblings
        .iter()
        .any(|sibling| beats_main_chain_block(main, sibling, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use remasc_core::types::{Address, Hash256};

    fn config() -> RemascConfig {
        RemascConfig {
            paid_fees_multiplier: 2,
            paid_fees_divisor: 1,
            ..RemascConfig::default()
        }
    }

    fn main_block(first_hash_byte: u8, paid_fees: u64) -> BlockHeader {
        let mut hash = [0x00; 32];
        hash[0] = first_hash_byte;
        BlockHeader {
            number: 10,
            parent_hash: Hash256::ZERO,
            coinbase: Address([1; 20]),
            timestamp: 0,
            paid_fees,
            nonce: 0,
            hash: Hash256(hash),
        }
    }

    fn sibling(first_hash_byte: u8, fill: u8, paid_fees: u64) -> Sibling {
        let mut hash = [fill; 32];
        hash[0] = first_hash_byte;
        Sibling {
            hash: Hash256(hash),
            coinbase: Address([2; 20]),
            paid_fees,
            included_height: 11,
            included_block_coinbase: Address([3; 20]),
        }
    }

    // ------------------------------------------------------------------
    // Hash comparison
    // ------------------------------------------------------------------

    #[test]
    fn lower_hash_with_equal_fees_breaks_rule() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x0F, 0xFF, 100)];
        assert!(is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn higher_hash_with_equal_fees_keeps_rule() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x11, 0x00, 100)];
        assert!(!is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn equal_hash_is_not_lower() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x10, 0x00, 100)];
        assert!(!is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn hash_compared_over_all_bytes() {
        let mut main = main_block(0x10, 100);
        main.hash.0[31] = 0x05;
        let mut s = sibling(0x10, 0x00, 100);
        s.hash.0[31] = 0x04;
        assert!(beats_main_chain_block(&main, &s, &config()));
    }

    // ------------------------------------------------------------------
    // Fee comparison
    // ------------------------------------------------------------------

    #[test]
    fn fees_at_threshold_keep_rule() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x20, 0x00, 200)];
        assert!(!is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn fees_above_threshold_break_rule() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x20, 0x00, 201)];
        assert!(is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn threshold_truncates() {
        let cfg = RemascConfig {
            paid_fees_multiplier: 3,
            paid_fees_divisor: 2,
            ..RemascConfig::default()
        };
        // 3 * 5 / 2 = 7
        let main = main_block(0x10, 5);
        assert!(!beats_main_chain_block(&main, &sibling(0x20, 0, 7), &cfg));
        assert!(beats_main_chain_block(&main, &sibling(0x20, 0, 8), &cfg));
    }

    #[test]
    fn threshold_does_not_overflow() {
        let main = main_block(0x10, u64::MAX);
        let sibs = [sibling(0x20, 0x00, u64::MAX)];
        assert!(!is_broken_selection_rule(&main, &sibs, &config()));
    }

    // ------------------------------------------------------------------
    // Multiple siblings
    // ------------------------------------------------------------------

    #[test]
    fn any_offending_sibling_breaks_rule() {
        let main = main_block(0x10, 100);
        let sibs = [sibling(0x20, 0, 10), sibling(0x30, 0, 10), sibling(0x01, 0, 10)];
        assert!(is_broken_selection_rule(&main, &sibs, &config()));
    }

    #[test]
    fn no_siblings_keeps_rule() {
        let main = main_block(0x10, 100);
        assert!(!is_broken_selection_rule(&main, &[], &config()));
    }
}
