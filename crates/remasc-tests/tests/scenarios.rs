//! End-to-end distribution scenarios over small synthetic chains.
//!
//! Every scenario uses `maturity = 4`, so block `n` pays out height `n - 4`.

use num_traits::Zero;

use remasc::RemascContract;
use remasc_core::constants::REMASC_ADDRESS;
use remasc_core::error::RemascError;
use remasc_core::memory::Transfer;
use remasc_core::traits::StateAccess;
use remasc_core::types::Hash256;
use remasc_tests::helpers::*;

fn payout(to: remasc_core::types::Address, amount: u64) -> Transfer {
    Transfer {
        from: REMASC_ADDRESS,
        to,
        amount: big(amount),
    }
}

fn hash_with_prefix(prefix: u8) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[0] = prefix;
    Hash256(bytes)
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

#[test]
fn pre_maturity_is_noop() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 3]);
    chain.execute_range(&contract, 0..=2).unwrap();

    let state = chain.persisted();
    assert!(state.reward_balance.is_zero());
    assert!(state.burned_balance.is_zero());
    assert!(!state.broken_selection_rule);
    assert!(chain.take_payouts().is_empty());
}

#[test]
fn accrue_only_before_synthetic_span() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 6]);
    chain.execute_range(&contract, 0..=5).unwrap();

    let state = chain.persisted();
    assert_eq!(state.reward_balance, big(100));
    assert!(state.siblings.is_empty());
    assert!(chain.take_payouts().is_empty());
}

// ---------------------------------------------------------------------------
// Distribution without siblings
// ---------------------------------------------------------------------------

#[test]
fn first_full_distribution_without_siblings() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 7]);
    chain.execute_range(&contract, 0..=5).unwrap();
    assert_eq!(chain.persisted().reward_balance, big(100));

    chain.execute(&contract, 6).unwrap();
    assert_eq!(
        chain.take_payouts(),
        vec![payout(LABS, 10), payout(miner(2), 90)]
    );
    let state = chain.persisted();
    assert_eq!(state.reward_balance, big(100));
    assert!(state.burned_balance.is_zero());
    assert!(!state.broken_selection_rule);
}

#[test]
fn punishment_burned_after_broken_rule() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 7]);
    chain.execute_range(&contract, 0..=5).unwrap();
    set_broken_selection_rule(&mut chain.state, true);

    chain.execute(&contract, 6).unwrap();
    assert_eq!(
        chain.take_payouts(),
        vec![payout(LABS, 10), payout(miner(2), 81)]
    );
    let state = chain.persisted();
    assert_eq!(state.burned_balance, big(9));
    assert!(!state.broken_selection_rule);
}

// ---------------------------------------------------------------------------
// Distribution with siblings
// ---------------------------------------------------------------------------

#[test]
fn lower_hash_sibling_breaks_selection_rule() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 2]);
    chain.push_with_hash(100, vec![], Some(hash_with_prefix(0x10)));
    let mut uncle = make_uncle(2, addr(0xC2), 100, 1);
    uncle.hash = hash_with_prefix(0x0F);
    chain.push(100, vec![uncle]);
    chain.extend(&[100; 4]);

    chain.execute_range(&contract, 0..=5).unwrap();
    chain.take_payouts();
    chain.execute(&contract, 6).unwrap();

    // slice 100, labs 10; 90 left: publishers 9, miners 81 over two (40 r1)
    assert_eq!(
        chain.take_payouts(),
        vec![
            payout(LABS, 10),
            payout(miner(3), 9),
            payout(addr(0xC2), 40),
            payout(miner(2), 40),
        ]
    );
    let state = chain.persisted();
    assert!(state.broken_selection_rule);
    assert_eq!(state.burned_balance, big(1));
    assert!(!state.siblings.contains_key(&2));

    // the next height carries the punishment
    chain.execute(&contract, 7).unwrap();
    assert_eq!(
        chain.take_payouts(),
        vec![payout(LABS, 10), payout(miner(3), 81)]
    );
    let state = chain.persisted();
    assert_eq!(state.burned_balance, big(1 + 9));
    assert!(!state.broken_selection_rule);
}

#[test]
fn late_inclusion_penalty_is_burned() {
    let contract = RemascContract::new(test_config(4, 1));
    let mut chain = TestChain::new();
    chain.extend(&[0, 2468, 0, 0]);
    // height 1 included at height 4: two blocks later than possible
    chain.push(0, vec![make_uncle(1, addr(0xC1), 0, 7)]);
    chain.extend(&[0]);

    chain.execute_range(&contract, 0..=4).unwrap();
    chain.execute(&contract, 5).unwrap();

    // slice 2468, labs 246; 2222 left: publishers 222, miners 2000 over two
    assert_eq!(
        chain.take_payouts(),
        vec![
            payout(LABS, 246),
            payout(miner(4), 222),
            payout(addr(0xC1), 800),
            payout(miner(1), 1000),
        ]
    );
    let state = chain.persisted();
    assert_eq!(state.burned_balance, big(200));
    assert!(state.reward_balance.is_zero());
}

#[test]
fn siblings_of_unprocessed_heights_are_kept() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 3]);
    chain.push(100, vec![make_uncle(2, addr(0xC2), 0, 1)]);
    chain.push(100, vec![make_uncle(3, addr(0xC3), 0, 2)]);
    chain.extend(&[100; 2]);

    chain.execute_range(&contract, 0..=6).unwrap();
    let state = chain.persisted();
    assert!(!state.siblings.contains_key(&2));
    assert_eq!(state.siblings[&3].len(), 1);
    assert_eq!(state.siblings[&3][0].coinbase, addr(0xC3));
}

#[test]
fn uncle_of_paid_height_is_dropped_unpaid() {
    let contract = RemascContract::new(test_config(2, 1));
    let mut chain = TestChain::new();
    chain.extend(&[100; 6]);
    // height 3 was paid out by block 5
    chain.push(100, vec![make_uncle(3, addr(0xC3), 0, 1)]);
    chain.extend(&[100; 4]);

    chain.execute_range(&contract, 0..=10).unwrap();
    let state = chain.persisted();
    let stale: Vec<u64> = state.siblings.range(..=8).map(|(h, _)| *h).collect();
    assert!(stale.is_empty(), "stale heights {stale:?}");
    assert!(chain.state.balance_of(&addr(0xC3)).is_zero());
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[test]
fn failed_payout_leaves_storage_untouched() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 7]);
    chain.execute_range(&contract, 0..=5).unwrap();
    let before = chain.persisted();

    let all = chain.state.balance_of(&REMASC_ADDRESS);
    chain.state.transfer(&REMASC_ADDRESS, &addr(0xFE), &all).unwrap();

    let err = chain.execute(&contract, 6).unwrap_err();
    assert!(matches!(err, RemascError::ConsensusViolation(_)));
    assert_eq!(chain.persisted(), before);
}

#[test]
fn unknown_ancestor_is_reported() {
    let contract = RemascContract::new(test_config(4, 2));
    let mut chain = TestChain::new();
    chain.extend(&[100; 6]);
    chain.store = remasc_core::memory::MemoryWorld::new();

    let err = chain.execute(&contract, 5).unwrap_err();
    assert!(matches!(err, RemascError::AncestorMissing { depth: 3, .. }));
}
