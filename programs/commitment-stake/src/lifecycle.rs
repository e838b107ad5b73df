//! Stake lifecycle state machine.
//!
//! `None` stands for "no live record": either the key was never used or the
//! previous record reached a terminal state and is about to be replaced.

use crate::{error::StakingError, state::StakeStatus};

/// Every legal edge of the lifecycle graph.
pub const TRANSITIONS: [(Option<StakeStatus>, StakeStatus); 6] = [
    (None, StakeStatus::Active),
    (Some(StakeStatus::Active), StakeStatus::Active),
    (Some(StakeStatus::Active), StakeStatus::Mature),
    (Some(StakeStatus::Active), StakeStatus::Withered),
    (Some(StakeStatus::Active), StakeStatus::Harvested),
    (Some(StakeStatus::Mature), StakeStatus::Harvested),
];

pub fn can_transition(from: Option<StakeStatus>, to: StakeStatus) -> bool {
    let from = from.filter(StakeStatus::is_live);
    TRANSITIONS.contains(&(from, to))
}

/// Checked transition; returns the new status on success.
pub fn transition(from: Option<StakeStatus>, to: StakeStatus) -> Result<StakeStatus, StakingError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(StakingError::InvalidTransition)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    const ALL: [StakeStatus; 4] = [
        StakeStatus::Active,
        StakeStatus::Mature,
        StakeStatus::Withered,
        StakeStatus::Harvested,
    ];

    #[test_case(None, StakeStatus::Active ; "plant")]
    #[test_case(Some(StakeStatus::Withered), StakeStatus::Active ; "replant after wither")]
    #[test_case(Some(StakeStatus::Harvested), StakeStatus::Active ; "replant after harvest")]
    #[test_case(Some(StakeStatus::Active), StakeStatus::Active ; "check in")]
    #[test_case(Some(StakeStatus::Active), StakeStatus::Mature ; "final check in")]
    #[test_case(Some(StakeStatus::Active), StakeStatus::Withered ; "slash")]
    #[test_case(Some(StakeStatus::Active), StakeStatus::Harvested ; "unstake or late harvest")]
    #[test_case(Some(StakeStatus::Mature), StakeStatus::Harvested ; "harvest")]
    fn test_legal_edges(from: Option<StakeStatus>, to: StakeStatus) {
        assert_eq!(transition(from, to), Ok(to));
    }

    #[test]
    fn test_no_edge_leaves_a_terminal_state_except_replant() {
        for from in [StakeStatus::Withered, StakeStatus::Harvested] {
            for to in ALL {
                assert_eq!(can_transition(Some(from), to), to == StakeStatus::Active);
            }
        }
    }

    #[test]
    fn test_illegal_edges() {
        assert_eq!(
            transition(Some(StakeStatus::Mature), StakeStatus::Active),
            Err(StakingError::InvalidTransition)
        );
        assert_eq!(
            transition(Some(StakeStatus::Mature), StakeStatus::Withered),
            Err(StakingError::InvalidTransition)
        );
        assert_eq!(
            transition(None, StakeStatus::Mature),
            Err(StakingError::InvalidTransition)
        );
        assert!(!can_transition(Some(StakeStatus::Mature), StakeStatus::Mature));
    }
}
