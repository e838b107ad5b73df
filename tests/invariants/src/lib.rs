//! GoodCommit Property-Based Invariant Tests
//!
//! Uses proptest to verify the engine's invariants across:
//! - Reward, penalty and check-in window arithmetic
//! - Random operation sequences against a live engine

pub mod reward_invariants;
pub mod staking_invariants;
