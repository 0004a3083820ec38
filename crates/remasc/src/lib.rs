//! # remasc — Deferred block reward distribution.
//!
//! Fees collected by the Remasc contract are held for `maturity` blocks,
//! smoothed over `synthetic_span` payouts, and split among:
//! - the protocol beneficiary
//! - the main-chain miner of the matured height
//! - the miners of sibling (uncle) blocks at that height
//! - the main-chain miners that published those siblings
//!
//! Modules:
//! - [`engine::Remasc`] — one invocation of the distribution
//! - [`calculator`] — sibling payment split and late-inclusion penalty
//! - [`selection`] — main-chain selection rule
//! - [`storage::RemascStorageProvider`] — persistent contract cells
//! - [`codec`] — byte encoding of those cells
//! - [`contract::RemascContract`] — entry point for the block executor

pub mod calculator;
pub mod codec;
pub mod contract;
pub mod engine;
pub mod selection;
pub mod sibling;
pub mod state;
pub mod storage;

pub use contract::RemascContract;
pub use engine::Remasc;
pub use sibling::{Sibling, SiblingsMap};
pub use state::RemascState;
pub use storage::RemascStorageProvider;
