//! Custom errors for the commitment staking engine.

use {
    num_derive::{FromPrimitive, ToPrimitive},
    serde::{Deserialize, Serialize},
    std::fmt,
    thiserror::Error,
};

#[derive(
    Error,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum StakingError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized = 0,

    #[error("An active or mature stake already exists for this category")]
    AlreadyStaked,

    #[error("No active stake exists for this category")]
    NotStaked,

    #[error("Stake is not overdue")]
    NotOverdue,

    #[error("Stake has not matured yet")]
    NotMature,

    #[error("Stake has already matured")]
    AlreadyMatured,

    #[error("Illegal stake status transition")]
    InvalidTransition,

    #[error("Already checked in for the current period")]
    AlreadyCheckedInToday,

    #[error("Check-in window has passed; the stake is overdue")]
    CheckInOverdue,

    #[error("Token allowance is below the requested amount")]
    InsufficientAllowance,

    #[error("Token balance is below the requested amount")]
    InsufficientBalance,

    #[error("Reward treasury cannot cover the requested amount")]
    TreasuryExhausted,

    #[error("Arithmetic overflow in stake accounting")]
    ArithmeticOverflow,

    #[error("Token transfer failed")]
    TransferFailed,

    #[error("Amount must be greater than zero and at least the minimum stake")]
    InvalidAmount,

    #[error("Duration must be between one period and the configured maximum")]
    InvalidDuration,
}

/// Coarse grouping used by callers to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authorization,
    State,
    Timing,
    Funds,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::State => "state",
            ErrorCategory::Timing => "timing",
            ErrorCategory::Funds => "funds",
            ErrorCategory::Validation => "validation",
        };
        f.write_str(name)
    }
}

impl StakingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StakingError::Unauthorized => ErrorCategory::Authorization,
            StakingError::AlreadyStaked
            | StakingError::NotStaked
            | StakingError::NotOverdue
            | StakingError::NotMature
            | StakingError::AlreadyMatured
            | StakingError::InvalidTransition => ErrorCategory::State,
            StakingError::AlreadyCheckedInToday | StakingError::CheckInOverdue => {
                ErrorCategory::Timing
            }
            StakingError::InsufficientAllowance
            | StakingError::InsufficientBalance
            | StakingError::TreasuryExhausted
            | StakingError::ArithmeticOverflow
            | StakingError::TransferFailed => ErrorCategory::Funds,
            StakingError::InvalidAmount | StakingError::InvalidDuration => {
                ErrorCategory::Validation
            }
        }
    }

    /// Whether the same call may succeed later without the caller changing
    /// anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StakingError::AlreadyCheckedInToday
                | StakingError::TransferFailed
                | StakingError::TreasuryExhausted
        )
    }

    /// Short, actionable text for the owning application.
    pub fn user_message(&self) -> &'static str {
        match self {
            StakingError::Unauthorized => "only the verification operator can do that",
            StakingError::AlreadyStaked => "you already have a plant growing in this category",
            StakingError::NotStaked => "plant a seed first",
            StakingError::NotOverdue => "this commitment is still on schedule",
            StakingError::NotMature => "keep going, your plant has not matured yet",
            StakingError::AlreadyMatured => "your plant is mature, harvest it",
            StakingError::InvalidTransition => "that action is not possible right now",
            StakingError::AlreadyCheckedInToday => "already checked in today",
            StakingError::CheckInOverdue => "the check-in window has passed",
            StakingError::InsufficientAllowance => "approve tokens first",
            StakingError::InsufficientBalance => "not enough tokens in your wallet",
            StakingError::TreasuryExhausted => "the reward treasury is empty, try again later",
            StakingError::ArithmeticOverflow => "amount too large",
            StakingError::TransferFailed => "token transfer failed, try again",
            StakingError::InvalidAmount => "enter an amount above the minimum stake",
            StakingError::InvalidDuration => "choose a valid number of days",
        }
    }
}
