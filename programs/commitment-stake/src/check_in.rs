//! Check-in timing rules.

use crate::{
    clock::UnixTimestamp,
    config::StakingConfig,
    state::{StakeRecord, StakeStatus},
};

/// Where `now` falls relative to a record's last check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInWindow {
    /// Still inside the period of the last check-in.
    TooEarly,
    Open,
    /// Past the period plus grace window; only a slash is possible now.
    Overdue,
}

pub fn window(record: &StakeRecord, config: &StakingConfig, now: UnixTimestamp) -> CheckInWindow {
    let elapsed = now.saturating_sub(record.last_check_in);
    if elapsed < config.period_secs {
        CheckInWindow::TooEarly
    } else if elapsed > config.overdue_after_secs() {
        CheckInWindow::Overdue
    } else {
        CheckInWindow::Open
    }
}

/// True iff the record is Active and a full period plus grace has gone by
/// without a check-in.
pub fn is_overdue(record: &StakeRecord, config: &StakingConfig, now: UnixTimestamp) -> bool {
    record.status == StakeStatus::Active
        && window(record, config, now) == CheckInWindow::Overdue
}

/// Zero-based index of the period `now` falls into, counted from creation.
pub fn current_period_index(
    record: &StakeRecord,
    config: &StakingConfig,
    now: UnixTimestamp,
) -> u64 {
    let elapsed = now.saturating_sub(record.created_at).max(0);
    u64::try_from(elapsed / config.period_secs.max(1)).unwrap_or(0)
}
