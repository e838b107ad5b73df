//! Reward accrual and early-exit settlement arithmetic.
//!
//! All arithmetic is integer, truncates toward zero and is overflow-checked.

use crate::{
    amount::Amount,
    config::StakingConfig,
    constants::{BPS_DENOMINATOR, PPM_DENOMINATOR},
    error::StakingError,
    state::StakeRecord,
};

/// Reward added by one accepted check-in: `principal * rate_ppm / 1_000_000`.
pub fn reward_increment(principal: Amount, reward_rate_ppm: u64) -> Result<Amount, StakingError> {
    principal
        .checked_mul(Amount::from(reward_rate_ppm))
        .map(|scaled| scaled / Amount::from(PPM_DENOMINATOR))
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Reward a record would hold if every remaining period were checked in.
pub fn projected_full_term_reward(
    record: &StakeRecord,
    reward_rate_ppm: u64,
) -> Result<Amount, StakingError> {
    let per_period = reward_increment(record.principal, reward_rate_ppm)?;
    per_period
        .checked_mul(Amount::from(record.remaining_periods()))
        .and_then(|remaining| remaining.checked_add(record.accumulated_reward))
        .ok_or(StakingError::ArithmeticOverflow)
}

/// `amount * bps / 10_000`, truncated.
pub fn apply_bps(amount: Amount, bps: u64) -> Result<Amount, StakingError> {
    amount
        .checked_mul(Amount::from(bps))
        .map(|scaled| scaled / Amount::from(BPS_DENOMINATOR))
        .ok_or(StakingError::ArithmeticOverflow)
}

/// How an early exit splits a record's principal and reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EarlyExitSettlement {
    pub principal_returned: Amount,
    pub principal_penalty: Amount,
    pub reward_returned: Amount,
    pub reward_forfeited: Amount,
}

impl EarlyExitSettlement {
    /// What the owner receives.
    pub fn payout(&self) -> Result<Amount, StakingError> {
        self.principal_returned
            .checked_add(self.reward_returned)
            .ok_or(StakingError::ArithmeticOverflow)
    }

    /// What flows back to the treasury.
    pub fn retained(&self) -> Result<Amount, StakingError> {
        self.principal_penalty
            .checked_add(self.reward_forfeited)
            .ok_or(StakingError::ArithmeticOverflow)
    }
}

pub fn early_exit_settlement(
    record: &StakeRecord,
    config: &StakingConfig,
) -> Result<EarlyExitSettlement, StakingError> {
    let principal_penalty = apply_bps(record.principal, config.early_exit_principal_penalty_bps)?;
    let reward_forfeited = apply_bps(
        record.accumulated_reward,
        config.early_exit_reward_penalty_bps,
    )?;
    Ok(EarlyExitSettlement {
        principal_returned: record
            .principal
            .checked_sub(principal_penalty)
            .ok_or(StakingError::ArithmeticOverflow)?,
        principal_penalty,
        reward_returned: record
            .accumulated_reward
            .checked_sub(reward_forfeited)
            .ok_or(StakingError::ArithmeticOverflow)?,
        reward_forfeited,
    })
}
