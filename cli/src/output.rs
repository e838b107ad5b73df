//! Printable results.  Amounts are rendered as decimal G$ strings so the JSON
//! form never loses precision.

use {
    crate::cli::CliError,
    goodcommit_commitment_stake::{
        amount::{format_token_amount, Amount},
        engine::{CheckInReceipt, Payout, RewardOutcome},
        state::{HabitCategory, StakeKey, StakeRecordView},
        treasury::TreasuryBook,
    },
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::fmt,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Display,
    Json,
    JsonCompact,
}

impl OutputFormat {
    pub fn from_matches_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => OutputFormat::Json,
            Some("json-compact") => OutputFormat::JsonCompact,
            _ => OutputFormat::Display,
        }
    }

    pub fn formatted_string<T>(&self, item: &T) -> Result<String, CliError>
    where
        T: Serialize + fmt::Display,
    {
        match self {
            OutputFormat::Display => Ok(item.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(item)?),
        }
    }
}

// ── Stake info ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliStakeInfo {
    pub owner: String,
    pub category: String,
    pub status: String,
    pub principal: String,
    pub duration_periods: u64,
    pub streak: u64,
    pub accumulated_reward: String,
    pub last_check_in: i64,
    pub overdue: bool,
    /// Only for live stakes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_reward: Option<String>,
}

impl CliStakeInfo {
    pub fn new(
        owner: &Pubkey,
        category: HabitCategory,
        view: &StakeRecordView,
        overdue: bool,
        projected_reward: Option<Amount>,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            category: category.to_string(),
            status: view.status.to_string(),
            principal: format_token_amount(view.principal),
            duration_periods: view.duration_periods,
            streak: view.streak,
            accumulated_reward: format_token_amount(view.accumulated_reward),
            last_check_in: view.last_check_in,
            overdue,
            projected_reward: projected_reward.map(format_token_amount),
        }
    }
}

impl fmt::Display for CliStakeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stake: {}/{}", self.owner, self.category)?;
        writeln!(f, "  Status:             {}", self.status)?;
        writeln!(f, "  Principal:          {} G$", self.principal)?;
        writeln!(f, "  Streak:             {} / {}", self.streak, self.duration_periods)?;
        writeln!(f, "  Accrued Reward:     {} G$", self.accumulated_reward)?;
        if let Some(ref projected) = self.projected_reward {
            writeln!(f, "  Projected Reward:   {} G$", projected)?;
        }
        writeln!(f, "  Last Check-in:      {}", self.last_check_in)?;
        if self.overdue {
            writeln!(f, "  OVERDUE: this stake can be slashed")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CliStakeList {
    pub owner: String,
    pub stakes: Vec<CliStakeInfo>,
}

impl fmt::Display for CliStakeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stakes.is_empty() {
            return writeln!(f, "No stakes found for {}.", self.owner);
        }
        writeln!(
            f,
            "{:<10} {:>10} {:>26} {:>9} {:>26}",
            "Category", "Status", "Principal", "Streak", "Accrued Reward"
        )?;
        writeln!(f, "{}", "-".repeat(85))?;
        for stake in &self.stakes {
            writeln!(
                f,
                "{:<10} {:>10} {:>23} G$ {:>4}/{:<4} {:>23} G$",
                stake.category,
                stake.status,
                stake.principal,
                stake.streak,
                stake.duration_periods,
                stake.accumulated_reward
            )?;
        }
        Ok(())
    }
}

// ── Operation results ───────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliCheckIn {
    pub owner: String,
    pub category: String,
    pub streak: u64,
    pub matured: bool,
    pub reward: String,
    /// Set when the treasury could not cover this period's reward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_stalled: Option<String>,
}

impl CliCheckIn {
    pub fn new(key: &StakeKey, receipt: &CheckInReceipt) -> Self {
        let (reward, reward_stalled) = match receipt.reward {
            RewardOutcome::Accrued(amount) => (amount, None),
            RewardOutcome::Stalled(err) => (0, Some(err.to_string())),
        };
        Self {
            owner: key.owner.to_string(),
            category: key.category.to_string(),
            streak: receipt.streak,
            matured: receipt.matured,
            reward: format_token_amount(reward),
            reward_stalled,
        }
    }
}

impl fmt::Display for CliCheckIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checked in {}/{}", self.owner, self.category)?;
        writeln!(f, "  Streak:  {}", self.streak)?;
        match self.reward_stalled {
            Some(ref reason) => writeln!(f, "  Reward:  stalled ({reason})")?,
            None => writeln!(f, "  Reward:  +{} G$", self.reward)?,
        }
        if self.matured {
            writeln!(f, "  Commitment complete; ready to harvest")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliPayout {
    pub owner: String,
    pub category: String,
    pub principal: String,
    pub reward: String,
    pub withheld: String,
    pub total: String,
}

impl CliPayout {
    pub fn new(key: &StakeKey, payout: &Payout) -> Self {
        Self {
            owner: key.owner.to_string(),
            category: key.category.to_string(),
            principal: format_token_amount(payout.principal),
            reward: format_token_amount(payout.reward),
            withheld: format_token_amount(payout.withheld),
            total: format_token_amount(payout.total()),
        }
    }
}

impl fmt::Display for CliPayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Paid {} G$ to {}", self.total, self.owner)?;
        writeln!(f, "  Principal:  {} G$", self.principal)?;
        writeln!(f, "  Reward:     {} G$", self.reward)?;
        if self.withheld != "0" {
            writeln!(f, "  Withheld:   {} G$", self.withheld)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliSlash {
    pub owner: String,
    pub category: String,
    pub slashed: String,
    pub total_slashed_to_pool: String,
}

impl fmt::Display for CliSlash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Slashed {} G$ from {}/{}",
            self.slashed, self.owner, self.category
        )?;
        writeln!(f, "  Pool total: {} G$", self.total_slashed_to_pool)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CliOverdueList {
    pub now: i64,
    pub stakes: Vec<CliStakeInfo>,
}

impl fmt::Display for CliOverdueList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stakes.is_empty() {
            return writeln!(f, "No overdue stakes at {}.", self.now);
        }
        writeln!(f, "{} overdue stake(s) at {}:", self.stakes.len(), self.now)?;
        for stake in &self.stakes {
            writeln!(
                f,
                "  {}/{}  {} G$  last check-in {}",
                stake.owner, stake.category, stake.principal, stake.last_check_in
            )?;
        }
        Ok(())
    }
}

// ── Treasury and accounts ───────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliPool {
    pub escrow: String,
    pub pool: String,
    pub total_slashed_to_pool: String,
    pub treasury_available: String,
    pub rewards_outstanding: String,
    pub total_funded: String,
    pub escrow_balance: String,
    pub pool_balance: String,
}

impl CliPool {
    pub fn new(
        escrow: &Pubkey,
        pool: &Pubkey,
        book: &TreasuryBook,
        escrow_balance: Amount,
        pool_balance: Amount,
    ) -> Self {
        Self {
            escrow: escrow.to_string(),
            pool: pool.to_string(),
            total_slashed_to_pool: format_token_amount(book.total_slashed_to_pool),
            treasury_available: format_token_amount(book.treasury_available),
            rewards_outstanding: format_token_amount(book.rewards_outstanding),
            total_funded: format_token_amount(book.total_funded),
            escrow_balance: format_token_amount(escrow_balance),
            pool_balance: format_token_amount(pool_balance),
        }
    }
}

impl fmt::Display for CliPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Community Pool: {}", self.pool)?;
        writeln!(f, "  Slashed to Pool:     {} G$", self.total_slashed_to_pool)?;
        writeln!(f, "  Pool Balance:        {} G$", self.pool_balance)?;
        writeln!(f, "Reward Treasury (escrow {})", self.escrow)?;
        writeln!(f, "  Available:           {} G$", self.treasury_available)?;
        writeln!(f, "  Outstanding:         {} G$", self.rewards_outstanding)?;
        writeln!(f, "  Lifetime Funding:    {} G$", self.total_funded)?;
        writeln!(f, "  Escrow Balance:      {} G$", self.escrow_balance)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CliBalance {
    pub account: String,
    pub balance: String,
    pub allowance: String,
}

impl CliBalance {
    pub fn new(account: &Pubkey, balance: Amount, allowance: Amount) -> Self {
        Self {
            account: account.to_string(),
            balance: format_token_amount(balance),
            allowance: format_token_amount(allowance),
        }
    }
}

impl fmt::Display for CliBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account: {}", self.account)?;
        writeln!(f, "  Balance:           {} G$", self.balance)?;
        writeln!(f, "  Escrow Allowance:  {} G$", self.allowance)?;
        Ok(())
    }
}

/// Generic acknowledgement for administrative commands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CliMessage {
    pub status: String,
    pub message: String,
}

impl CliMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CliMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
