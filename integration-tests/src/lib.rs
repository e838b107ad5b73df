//! GoodCommit Integration Tests
//!
//! End-to-end tests of the commitment staking engine against the in-memory
//! token.
//!
//! # Areas Tested
//!
//! 1. **Lifecycle**: plant, daily check-ins, maturity, harvest, replant
//! 2. **Settlement**: slashing to the pool, early exit, treasury accounting,
//!    atomicity under token failures
//! 3. **Relay**: verifier-driven check-ins and overdue sweeps
//! 4. **Persistence**: snapshot, restore and continue
//! 5. **Concurrency**: many owners and racing operators

#![allow(clippy::arithmetic_side_effects)]

pub mod harness;
