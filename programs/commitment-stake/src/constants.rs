//! Token scale, denominators, and policy defaults.
//!
//! Every default here is a starting value for [`crate::config::StakingConfig`],
//! not a protocol constant.  Deployments override them through configuration.

/// Decimal places of the escrowed token (G$ is an 18-decimal ERC-20).
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units (`10^TOKEN_DECIMALS`).
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Seconds per day, the default check-in period.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Basis points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Parts-per-million denominator used by the reward rate.
pub const PPM_DENOMINATOR: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Policy defaults
// ---------------------------------------------------------------------------

/// One check-in per day.
pub const DEFAULT_PERIOD_SECS: i64 = SECONDS_PER_DAY;

/// No grace: a missed period is immediately slashable.
pub const DEFAULT_GRACE_WINDOW_SECS: i64 = 0;

/// 1_000 ppm = 0.1% of principal per accepted check-in.
pub const DEFAULT_REWARD_RATE_PPM: u64 = 1_000;

/// Early exit forfeits the whole accrued reward.
pub const DEFAULT_EARLY_EXIT_REWARD_PENALTY_BPS: u64 = BPS_DENOMINATOR;

/// Early exit returns the whole principal.
pub const DEFAULT_EARLY_EXIT_PRINCIPAL_PENALTY_BPS: u64 = 0;

/// Smallest accepted stake, in base units.
pub const DEFAULT_MIN_STAKE: u128 = 1;

/// Longest accepted commitment, in periods.
pub const DEFAULT_MAX_DURATION_PERIODS: u64 = 365;

// ---------------------------------------------------------------------------
// Serialisation
// ---------------------------------------------------------------------------

/// Discriminator byte written at the start of every serialised ledger
/// snapshot to distinguish it from foreign or truncated data.
pub const LEDGER_SNAPSHOT_DISCRIMINATOR: u8 = 1;
