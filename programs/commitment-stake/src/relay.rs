//! Verification relay.
//!
//! Turns an external "activity verified" signal into an operator check-in,
//! and sweeps overdue stakes into the pool.  The engine never sees the raw
//! evidence (quiz answers, GPS traces, photos); only the verifier's verdict.

use {
    crate::{
        amount::Amount,
        engine::{CheckInReceipt, CommitmentEngine},
        error::StakingError,
        state::{HabitCategory, StakeKey},
        token::TokenLedger,
    },
    log::*,
    serde::Serialize,
    solana_pubkey::Pubkey,
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("verifier unavailable: {0}")]
    Unavailable(String),

    #[error("evidence could not be evaluated: {0}")]
    InvalidEvidence(String),
}

/// Answers "did `owner` complete `category`'s activity for `period`?".
pub trait ActivityVerifier: Send + Sync {
    fn verify(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
        period: u64,
    ) -> Result<bool, VerifierError>;
}

impl<F> ActivityVerifier for F
where
    F: Fn(&Pubkey, HabitCategory, u64) -> Result<bool, VerifierError> + Send + Sync,
{
    fn verify(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
        period: u64,
    ) -> Result<bool, VerifierError> {
        self(owner, category, period)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("activity not verified for {owner}/{category} in period {period}")]
    NotVerified {
        owner: Pubkey,
        category: HabitCategory,
        period: u64,
    },

    #[error(transparent)]
    Verifier(#[from] VerifierError),

    #[error(transparent)]
    Staking(#[from] StakingError),
}

/// Outcome of one overdue sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub slashed: Vec<(StakeKey, Amount)>,
    pub failed: Vec<(StakeKey, StakingError)>,
    pub total_slashed: Amount,
}

pub struct CheckInRelay<T: TokenLedger, V: ActivityVerifier> {
    operator: Pubkey,
    verifier: V,
    engine: Arc<CommitmentEngine<T>>,
}

impl<T: TokenLedger, V: ActivityVerifier> CheckInRelay<T, V> {
    pub fn new(operator: Pubkey, verifier: V, engine: Arc<CommitmentEngine<T>>) -> Self {
        Self {
            operator,
            verifier,
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<CommitmentEngine<T>> {
        &self.engine
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Ask the verifier about the current period and check the owner in if
    /// it says yes.
    pub fn submit(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<CheckInReceipt, RelayError> {
        let period = self
            .engine
            .current_period(owner, category)
            .ok_or(StakingError::NotStaked)?;

        if !self.verifier.verify(owner, category, period)? {
            debug!("relay: {owner}/{category} not verified for period {period}");
            return Err(RelayError::NotVerified {
                owner: *owner,
                category,
                period,
            });
        }

        Ok(self.engine.check_in(&self.operator, owner, category)?)
    }

    /// Slash every overdue stake.  A failure on one key is recorded and the
    /// sweep moves on.
    pub fn sweep_overdue(&self) -> SweepReport {
        let mut report = SweepReport::default();
        for key in self.engine.overdue_stakes() {
            match self
                .engine
                .slash_stake(&self.operator, &key.owner, key.category)
            {
                Ok(amount) => {
                    report.total_slashed = report.total_slashed.saturating_add(amount);
                    report.slashed.push((key, amount));
                }
                Err(err) => {
                    warn!("relay: sweep could not slash {key}: {err}");
                    report.failed.push((key, err));
                }
            }
        }
        if !report.slashed.is_empty() {
            info!(
                "relay: swept {} overdue stakes, {} to pool",
                report.slashed.len(),
                report.total_slashed
            );
        }
        report
    }
}
