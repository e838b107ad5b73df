//! Staking policy configuration.
//!
//! Defines the check-in period, grace window, reward rate and early-exit
//! penalties.  Everything here is policy; none of it is baked into the ledger.

use {
    crate::{
        amount::Amount,
        constants::{
            BPS_DENOMINATOR, DEFAULT_EARLY_EXIT_PRINCIPAL_PENALTY_BPS,
            DEFAULT_EARLY_EXIT_REWARD_PENALTY_BPS, DEFAULT_GRACE_WINDOW_SECS,
            DEFAULT_MAX_DURATION_PERIODS, DEFAULT_MIN_STAKE, DEFAULT_PERIOD_SECS,
            DEFAULT_REWARD_RATE_PPM, PPM_DENOMINATOR,
        },
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{fs, io, path::Path},
};

/// Policy parameters for the commitment engine.
///
/// Missing keys in a TOML file fall back to [`StakingConfig::default`].
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(default)]
pub struct StakingConfig {
    /// Length of one check-in period in seconds.
    /// Default: 86_400 (one day).
    pub period_secs: i64,

    /// Extra seconds past a full period before a stake counts as overdue.
    /// Default: 0.
    ///
    /// With 0 a check-in is accepted only at exactly one period after the
    /// previous one.  Deployments driven by the wall clock, where the
    /// verifier reports whenever the owner finishes the activity, need a
    /// non-zero grace window (e.g. `period_secs`) or most check-ins will be
    /// rejected as too early or overdue.
    pub grace_window_secs: i64,

    /// Reward added per accepted check-in, in parts per million of principal.
    /// Default: 1_000 (0.1%).
    pub reward_rate_ppm: u64,

    /// Share of accrued reward forfeited on early exit.
    /// Default: 10_000 (all of it).
    pub early_exit_reward_penalty_bps: u64,

    /// Share of principal withheld on early exit.
    /// Default: 0.
    pub early_exit_principal_penalty_bps: u64,

    /// Smallest accepted stake in base units.
    pub min_stake: Amount,

    /// Longest accepted commitment in periods.
    pub max_duration_periods: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            grace_window_secs: DEFAULT_GRACE_WINDOW_SECS,
            reward_rate_ppm: DEFAULT_REWARD_RATE_PPM,
            early_exit_reward_penalty_bps: DEFAULT_EARLY_EXIT_REWARD_PENALTY_BPS,
            early_exit_principal_penalty_bps: DEFAULT_EARLY_EXIT_PRINCIPAL_PENALTY_BPS,
            min_stake: DEFAULT_MIN_STAKE,
            max_duration_periods: DEFAULT_MAX_DURATION_PERIODS,
        }
    }
}

impl StakingConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_secs <= 0 {
            return Err(ConfigError::InvalidPeriod(self.period_secs));
        }
        if self.grace_window_secs < 0 {
            return Err(ConfigError::InvalidGraceWindow(self.grace_window_secs));
        }
        if self.reward_rate_ppm > PPM_DENOMINATOR {
            return Err(ConfigError::InvalidRewardRate(self.reward_rate_ppm));
        }
        if self.early_exit_reward_penalty_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidPenalty {
                field: "early_exit_reward_penalty_bps",
                bps: self.early_exit_reward_penalty_bps,
            });
        }
        if self.early_exit_principal_penalty_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidPenalty {
                field: "early_exit_principal_penalty_bps",
                bps: self.early_exit_principal_penalty_bps,
            });
        }
        if self.min_stake == 0 {
            return Err(ConfigError::InvalidMinStake);
        }
        if self.max_duration_periods == 0 {
            return Err(ConfigError::InvalidMaxDuration);
        }
        Ok(())
    }

    /// Parse and validate a TOML policy document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: StakingConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Seconds after `last_check_in` past which a stake is overdue.
    pub fn overdue_after_secs(&self) -> i64 {
        self.period_secs.saturating_add(self.grace_window_secs)
    }
}

/// Errors in staking configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("period_secs must be > 0, got {0}")]
    InvalidPeriod(i64),
    #[error("grace_window_secs must be >= 0, got {0}")]
    InvalidGraceWindow(i64),
    #[error("reward_rate_ppm must be <= {PPM_DENOMINATOR}, got {0}")]
    InvalidRewardRate(u64),
    #[error("{field} must be <= {BPS_DENOMINATOR}, got {bps}")]
    InvalidPenalty { field: &'static str, bps: u64 },
    #[error("min_stake must be > 0")]
    InvalidMinStake,
    #[error("max_duration_periods must be > 0")]
    InvalidMaxDuration,
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
}

/// Token accounts the engine moves funds through.
///
/// There is no separate reward-treasury account: funding deposited through
/// `fund_treasury` sits in `escrow` next to user principal, and the two are
/// told apart only by the ledger's treasury book.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct EngineAccounts {
    /// Holds all principal and treasury funds.
    pub escrow: Pubkey,
    /// Receives slashed principal.
    pub pool: Pubkey,
}

impl EngineAccounts {
    pub fn new(escrow: Pubkey, pool: Pubkey) -> Self {
        Self { escrow, pool }
    }
}
