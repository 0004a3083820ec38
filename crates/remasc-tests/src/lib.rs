//! Scenario and property-based test suite for the Remasc engine.
//!
//! Integration tests drive the contract over synthetic chains and check the
//! accounting invariants: conservation of accrued fees, burn monotonicity,
//! pruning of processed heights, and sibling insertion order.

pub mod helpers;
