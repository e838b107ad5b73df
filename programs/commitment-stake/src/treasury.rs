//! Ledger-wide treasury book.
//!
//! Tracks reward funding separately from user principal.  Funds move
//! `available -> outstanding` when a check-in commits reward, then leave the
//! book on payout or flow back to `available` when reward is forfeited.

use {
    crate::{amount::Amount, error::StakingError, reward::EarlyExitSettlement},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct TreasuryBook {
    /// Funding not yet committed to any record.
    pub treasury_available: Amount,
    /// Reward committed to live records but not yet paid.
    pub rewards_outstanding: Amount,
    /// Principal forfeited to the shared pool.  Only increases.
    pub total_slashed_to_pool: Amount,
    /// Lifetime funding received.
    pub total_funded: Amount,
}

impl TreasuryBook {
    pub fn fund(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.treasury_available = checked_add(self.treasury_available, amount)?;
        self.total_funded = checked_add(self.total_funded, amount)?;
        Ok(())
    }

    /// Commit `amount` of available funding to a record.
    pub fn reserve(&mut self, amount: Amount) -> Result<(), StakingError> {
        if self.treasury_available < amount {
            return Err(StakingError::TreasuryExhausted);
        }
        self.treasury_available -= amount;
        self.rewards_outstanding = checked_add(self.rewards_outstanding, amount)?;
        Ok(())
    }

    /// Return committed reward that will never be paid.
    pub fn release(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.rewards_outstanding = checked_sub(self.rewards_outstanding, amount)?;
        self.treasury_available = checked_add(self.treasury_available, amount)?;
        Ok(())
    }

    /// Committed reward leaves the book as a payout.
    pub fn settle_payout(&mut self, amount: Amount) -> Result<(), StakingError> {
        if self.rewards_outstanding < amount {
            return Err(StakingError::TreasuryExhausted);
        }
        self.rewards_outstanding -= amount;
        Ok(())
    }

    pub fn record_slash(
        &mut self,
        principal: Amount,
        discarded_reward: Amount,
    ) -> Result<(), StakingError> {
        self.total_slashed_to_pool = checked_add(self.total_slashed_to_pool, principal)?;
        self.release(discarded_reward)
    }

    /// Withheld principal becomes reward funding.
    pub fn absorb_penalty(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.treasury_available = checked_add(self.treasury_available, amount)?;
        Ok(())
    }

    pub fn settle_early_exit(
        &mut self,
        settlement: &EarlyExitSettlement,
    ) -> Result<(), StakingError> {
        self.settle_payout(settlement.reward_returned)?;
        self.release(settlement.reward_forfeited)?;
        self.absorb_penalty(settlement.principal_penalty)
    }

    /// Tokens the escrow must hold on the treasury's behalf.
    pub fn escrowed(&self) -> Result<Amount, StakingError> {
        checked_add(self.treasury_available, self.rewards_outstanding)
    }
}

fn checked_add(a: Amount, b: Amount) -> Result<Amount, StakingError> {
    a.checked_add(b).ok_or(StakingError::ArithmeticOverflow)
}

fn checked_sub(a: Amount, b: Amount) -> Result<Amount, StakingError> {
    a.checked_sub(b).ok_or(StakingError::ArithmeticOverflow)
}
