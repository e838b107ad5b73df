//! Property-based tests for reward, penalty and timing arithmetic.
//!
//! Properties tested:
//! 1. A check-in reward never exceeds principal and grows with it.
//! 2. An early exit splits principal and reward without creating or losing
//!    a single base unit.
//! 3. The projected full-term reward is at least what has accrued.
//! 4. Every instant falls in exactly one check-in window, in order.

#[cfg(test)]
mod tests {
    use {
        goodcommit_commitment_stake::{
            check_in::{self, CheckInWindow},
            config::StakingConfig,
            constants::{BPS_DENOMINATOR, ONE_TOKEN, PPM_DENOMINATOR},
            reward,
            state::StakeRecord,
        },
        proptest::prelude::*,
    };

    const T0: i64 = 1_700_000_000;

    fn principal() -> impl Strategy<Value = u128> {
        1..=1_000_000_000 * ONE_TOKEN
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Reward increment is bounded and monotonic
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn reward_increment_bounded_by_principal(
            principal in principal(),
            rate in 0..=PPM_DENOMINATOR,
        ) {
            let increment = reward::reward_increment(principal, rate).unwrap();
            prop_assert!(increment <= principal);
            if rate == PPM_DENOMINATOR {
                prop_assert_eq!(increment, principal);
            }
        }

        #[test]
        fn reward_increment_monotonic(
            a in principal(),
            b in principal(),
            rate in 0..=PPM_DENOMINATOR,
        ) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                reward::reward_increment(small, rate).unwrap()
                    <= reward::reward_increment(large, rate).unwrap()
            );
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Early exit conserves principal and reward
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn early_exit_split_is_exact(
            principal in principal(),
            accrued in 0..=1_000_000 * ONE_TOKEN,
            reward_bps in 0..=BPS_DENOMINATOR,
            principal_bps in 0..=BPS_DENOMINATOR,
        ) {
            let config = StakingConfig {
                early_exit_reward_penalty_bps: reward_bps,
                early_exit_principal_penalty_bps: principal_bps,
                ..StakingConfig::default()
            };
            let mut record = StakeRecord::new(principal, 30, T0);
            record.accumulated_reward = accrued;

            let split = reward::early_exit_settlement(&record, &config).unwrap();
            prop_assert_eq!(split.principal_returned + split.principal_penalty, principal);
            prop_assert_eq!(split.reward_returned + split.reward_forfeited, accrued);
            prop_assert_eq!(
                split.payout().unwrap() + split.retained().unwrap(),
                principal + accrued
            );
            if reward_bps == BPS_DENOMINATOR {
                prop_assert_eq!(split.reward_returned, 0);
            }
            if principal_bps == 0 {
                prop_assert_eq!(split.principal_returned, principal);
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Projection never undershoots accrual
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn projection_covers_accrued_and_remaining(
            principal in principal(),
            duration in 1..=365u64,
            done_fraction in 0.0..=1.0f64,
            rate in 0..=10_000u64,
        ) {
            let streak = ((duration as f64) * done_fraction) as u64;
            let mut record = StakeRecord::new(principal, duration, T0);
            record.streak = streak.min(duration);
            let per_period = reward::reward_increment(principal, rate).unwrap();
            record.accumulated_reward = per_period * u128::from(record.streak);

            let projected = reward::projected_full_term_reward(&record, rate).unwrap();
            prop_assert!(projected >= record.accumulated_reward);
            prop_assert_eq!(projected, per_period * u128::from(duration));
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Check-in windows partition time
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1_000))]

        #[test]
        fn windows_are_ordered(
            period in 1..=7 * 86_400i64,
            grace in 0..=86_400i64,
            elapsed in 0..=20 * 86_400i64,
        ) {
            let config = StakingConfig {
                period_secs: period,
                grace_window_secs: grace,
                ..StakingConfig::default()
            };
            let record = StakeRecord::new(1_000, 30, T0);
            let window = check_in::window(&record, &config, T0 + elapsed);

            let expected = if elapsed < period {
                CheckInWindow::TooEarly
            } else if elapsed <= period + grace {
                CheckInWindow::Open
            } else {
                CheckInWindow::Overdue
            };
            prop_assert_eq!(window, expected);
            prop_assert_eq!(
                check_in::is_overdue(&record, &config, T0 + elapsed),
                expected == CheckInWindow::Overdue
            );
            prop_assert_eq!(
                check_in::current_period_index(&record, &config, T0 + elapsed),
                (elapsed / period) as u64
            );
        }
    }
}
