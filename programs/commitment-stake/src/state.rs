//! Ledger state types: habit categories, stake records and their views.

use {
    crate::{amount::Amount, clock::UnixTimestamp},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{fmt, str::FromStr},
};

/// The habit a stake is committed to.
///
/// Only used as a partition key; the discriminants match the app's contract
/// ABI (`uint8 habitType`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum HabitCategory {
    Health = 0,
    Academics = 1,
    Focus = 2,
}

impl HabitCategory {
    pub const ALL: [HabitCategory; 3] = [
        HabitCategory::Health,
        HabitCategory::Academics,
        HabitCategory::Focus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Health => "health",
            HabitCategory::Academics => "academics",
            HabitCategory::Focus => "focus",
        }
    }
}

impl TryFrom<u8> for HabitCategory {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HabitCategory::ALL
            .into_iter()
            .find(|category| *category as u8 == value)
            .ok_or_else(|| format!("unknown habit category discriminant {value}"))
    }
}

impl FromStr for HabitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(discriminant) = s.parse::<u8>() {
            return HabitCategory::try_from(discriminant);
        }
        HabitCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("Invalid habit category '{s}'. Valid values: health, academics, focus")
            })
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a stake record.  Discriminants match the app's
/// `PlantStatus` enum.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum StakeStatus {
    Active = 0,
    Mature = 1,
    Withered = 2,
    /// Also the status reported for "no stake at all".
    #[default]
    Harvested = 3,
}

impl StakeStatus {
    /// Active and Mature records still hold collateral in escrow.
    pub fn is_live(&self) -> bool {
        matches!(self, StakeStatus::Active | StakeStatus::Mature)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StakeStatus::Active => "active",
            StakeStatus::Mature => "mature",
            StakeStatus::Withered => "withered",
            StakeStatus::Harvested => "harvested",
        };
        f.write_str(name)
    }
}

/// Partition key of the ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct StakeKey {
    pub owner: Pubkey,
    pub category: HabitCategory,
}

impl StakeKey {
    pub fn new(owner: Pubkey, category: HabitCategory) -> Self {
        Self { owner, category }
    }
}

impl fmt::Display for StakeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.category)
    }
}

/// A single commitment held by one owner in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakeRecord {
    /// Collateral currently held in escrow, in base units.
    pub principal: Amount,

    /// Number of check-in periods committed to at creation.  Never changes.
    pub duration_periods: u64,

    /// Periods successfully checked in.  Never exceeds `duration_periods`.
    pub streak: u64,

    pub status: StakeStatus,

    /// Reward committed from the treasury but not yet paid out.
    pub accumulated_reward: Amount,

    /// Time of the last accepted check-in, or `created_at` before the first.
    pub last_check_in: UnixTimestamp,

    pub created_at: UnixTimestamp,
}

impl StakeRecord {
    pub fn new(principal: Amount, duration_periods: u64, now: UnixTimestamp) -> Self {
        Self {
            principal,
            duration_periods,
            streak: 0,
            status: StakeStatus::Active,
            accumulated_reward: 0,
            last_check_in: now,
            created_at: now,
        }
    }

    /// Mature, or Active with the full streak but not yet flagged.
    pub fn is_harvestable(&self) -> bool {
        match self.status {
            StakeStatus::Mature => true,
            StakeStatus::Active => self.streak == self.duration_periods,
            StakeStatus::Withered | StakeStatus::Harvested => false,
        }
    }

    pub fn remaining_periods(&self) -> u64 {
        self.duration_periods.saturating_sub(self.streak)
    }

    pub fn view(&self) -> StakeRecordView {
        StakeRecordView {
            principal: self.principal,
            duration_periods: self.duration_periods,
            streak: self.streak,
            status: self.status,
            accumulated_reward: self.accumulated_reward,
            last_check_in: self.last_check_in,
        }
    }
}

/// Read-only projection returned by `get_stake_info`.
///
/// The default value (`principal == 0`, `status == Harvested`) doubles as the
/// "no stake" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecordView {
    pub principal: Amount,
    pub duration_periods: u64,
    pub streak: u64,
    pub status: StakeStatus,
    pub accumulated_reward: Amount,
    pub last_check_in: UnixTimestamp,
}

impl StakeRecordView {
    pub fn is_empty_sentinel(&self) -> bool {
        self.principal == 0 && self.status == StakeStatus::Harvested
    }
}
