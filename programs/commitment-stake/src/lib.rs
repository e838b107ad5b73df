//! GoodCommit Commitment Staking Engine
//!
//! Users lock tokens against a declared habit and grow a daily streak.  A
//! trusted operator checks the owner in once per period after an external
//! verifier confirms the activity.  Completing the declared duration matures
//! the stake and lets the owner harvest principal plus yield; missing a
//! period lets the operator slash the principal into a shared UBI pool.
//!
//! ## Lifecycle
//!
//! | From      | To        | Operation        | Caller   |
//! |-----------|-----------|------------------|----------|
//! | (none)    | Active    | `plant`          | owner    |
//! | Active    | Active    | `check_in`       | operator |
//! | Active    | Mature    | `check_in` (last)| operator |
//! | Active    | Withered  | `slash_stake`    | operator |
//! | Mature    | Harvested | `harvest_rewards`| owner    |
//! | Active    | Harvested | `unstake`        | owner    |
//!
//! Withered and Harvested are terminal; a new `plant` replaces them.
//!
//! ## Quick start
//!
//! ```rust
//! use {
//!     goodcommit_commitment_stake::{
//!         clock::ManualClock, config::{EngineAccounts, StakingConfig},
//!         engine::CommitmentEngine, operator::OperatorRegistry, state::HabitCategory,
//!         token::InMemoryToken,
//!     },
//!     solana_pubkey::Pubkey,
//!     std::sync::Arc,
//! };
//!
//! let accounts = EngineAccounts::new(Pubkey::new_unique(), Pubkey::new_unique());
//! let (admin, operator, owner) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
//!
//! let token = Arc::new(InMemoryToken::new());
//! token.mint(&owner, 1_000).unwrap();
//! token.approve(&owner, &accounts.escrow, 1_000);
//!
//! let clock = Arc::new(ManualClock::new(1_700_000_000));
//! let mut operators = OperatorRegistry::new(admin);
//! operators.add_operator(&admin, operator).unwrap();
//!
//! let engine = CommitmentEngine::new(
//!     StakingConfig::default(), accounts, token, clock.clone(), operators,
//! ).unwrap();
//!
//! engine.plant(&owner, HabitCategory::Health, 1_000, 7).unwrap();
//! clock.advance_periods(1, engine.config().period_secs);
//! let receipt = engine.check_in(&operator, &owner, HabitCategory::Health).unwrap();
//! assert_eq!(receipt.streak, 1);
//! ```

#![allow(clippy::arithmetic_side_effects)]

pub mod amount;
pub mod check_in;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod metrics;
pub mod operator;
pub mod relay;
pub mod reward;
pub mod state;
pub mod token;
pub mod treasury;


// Re-exports for convenience.
pub use {
    amount::Amount,
    config::{EngineAccounts, StakingConfig},
    engine::CommitmentEngine,
    error::StakingError,
    state::{HabitCategory, StakeKey, StakeRecord, StakeRecordView, StakeStatus},
};
