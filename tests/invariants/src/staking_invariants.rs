//! Property-based tests driving a live engine with random operation
//! sequences.
//!
//! Properties tested after every operation:
//! 1. A streak never exceeds its duration.
//! 2. Records only move along legal lifecycle edges.
//! 3. The pool total never decreases.
//! 4. Outstanding reward equals the sum over live records.
//! 5. Tokens are conserved: escrow holds live principal plus treasury funds,
//!    the pool holds exactly what was slashed, and supply never changes.
//! 6. A rejected operation leaves the ledger unchanged.

#[cfg(test)]
mod tests {
    use {
        goodcommit_commitment_stake::{
            amount::Amount,
            clock::ManualClock,
            config::{EngineAccounts, StakingConfig},
            engine::CommitmentEngine,
            lifecycle,
            operator::OperatorRegistry,
            state::{HabitCategory, StakeKey, StakeStatus},
            token::{InMemoryToken, TokenLedger},
        },
        proptest::prelude::*,
        solana_pubkey::Pubkey,
        std::{collections::HashMap, sync::Arc},
    };

    const OWNERS: usize = 3;
    const WALLET: Amount = 1_000_000_000;
    const PERIOD: i64 = 86_400;

    #[derive(Debug, Clone)]
    enum Op {
        Plant {
            owner: usize,
            category: usize,
            amount: Amount,
            duration: u64,
        },
        CheckIn { owner: usize, category: usize },
        Harvest { owner: usize, category: usize },
        Unstake { owner: usize, category: usize },
        Slash { owner: usize, category: usize },
        Fund { amount: Amount },
        Advance { secs: i64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        let owner = 0..OWNERS;
        let category = 0..HabitCategory::ALL.len();
        prop_oneof![
            2 => (owner.clone(), category.clone(), 0..=100_000u128, 0..=12u64).prop_map(
                |(owner, category, amount, duration)| Op::Plant {
                    owner,
                    category,
                    amount,
                    duration,
                }
            ),
            3 => (owner.clone(), category.clone())
                .prop_map(|(owner, category)| Op::CheckIn { owner, category }),
            1 => (owner.clone(), category.clone())
                .prop_map(|(owner, category)| Op::Harvest { owner, category }),
            1 => (owner.clone(), category.clone())
                .prop_map(|(owner, category)| Op::Unstake { owner, category }),
            1 => (owner, category).prop_map(|(owner, category)| Op::Slash { owner, category }),
            1 => (0..=5_000u128).prop_map(|amount| Op::Fund { amount }),
            3 => prop_oneof![
                Just(PERIOD),
                Just(PERIOD + 1),
                0..=3 * PERIOD,
            ]
            .prop_map(|secs| Op::Advance { secs }),
        ]
    }

    struct World {
        engine: CommitmentEngine<Arc<InMemoryToken>>,
        token: Arc<InMemoryToken>,
        clock: Arc<ManualClock>,
        accounts: EngineAccounts,
        owners: Vec<Pubkey>,
        funder: Pubkey,
        operator: Pubkey,
    }

    impl World {
        fn new(config: StakingConfig, treasury: Amount) -> Self {
            let accounts = EngineAccounts::new(Pubkey::new_unique(), Pubkey::new_unique());
            let admin = Pubkey::new_unique();
            let operator = Pubkey::new_unique();
            let mut operators = OperatorRegistry::new(admin);
            operators.add_operator(&admin, operator).unwrap();

            let token = Arc::new(InMemoryToken::new());
            let clock = Arc::new(ManualClock::new(1_700_000_000));
            let engine = CommitmentEngine::new(
                config,
                accounts,
                token.clone(),
                clock.clone(),
                operators,
            )
            .unwrap();

            let owners: Vec<Pubkey> = (0..OWNERS).map(|_| Pubkey::new_unique()).collect();
            let funder = Pubkey::new_unique();
            for id in owners.iter().chain([&funder]) {
                token.mint(id, WALLET).unwrap();
                token.approve(id, &accounts.escrow, WALLET);
            }
            if treasury > 0 {
                engine.fund_treasury(&funder, treasury).unwrap();
            }
            Self {
                engine,
                token,
                clock,
                accounts,
                owners,
                funder,
                operator,
            }
        }

        fn statuses(&self) -> HashMap<StakeKey, StakeStatus> {
            let ledger = self.engine.ledger();
            ledger
                .keys()
                .into_iter()
                .filter_map(|key| ledger.get(&key).map(|record| (key, record.status)))
                .collect()
        }

        fn apply(&self, op: &Op) -> bool {
            let key = |owner: usize, category: usize| {
                (&self.owners[owner], HabitCategory::ALL[category])
            };
            match *op {
                Op::Plant {
                    owner,
                    category,
                    amount,
                    duration,
                } => {
                    let (owner, category) = key(owner, category);
                    self.engine.plant(owner, category, amount, duration).is_ok()
                }
                Op::CheckIn { owner, category } => {
                    let (owner, category) = key(owner, category);
                    self.engine.check_in(&self.operator, owner, category).is_ok()
                }
                Op::Harvest { owner, category } => {
                    let (owner, category) = key(owner, category);
                    self.engine.harvest_rewards(owner, category).is_ok()
                }
                Op::Unstake { owner, category } => {
                    let (owner, category) = key(owner, category);
                    self.engine.unstake(owner, category).is_ok()
                }
                Op::Slash { owner, category } => {
                    let (owner, category) = key(owner, category);
                    self.engine
                        .slash_stake(&self.operator, owner, category)
                        .is_ok()
                }
                Op::Fund { amount } => self.engine.fund_treasury(&self.funder, amount).is_ok(),
                Op::Advance { secs } => {
                    self.clock.advance(secs);
                    true
                }
            }
        }

        fn balance(&self, id: &Pubkey) -> Amount {
            self.token.balance_of(id).unwrap_or_default()
        }

        fn check_books(&self) -> Result<(), TestCaseError> {
            let ledger = self.engine.ledger();
            let book = self.engine.treasury_book();
            let live: Vec<_> = ledger
                .keys()
                .iter()
                .filter_map(|key| ledger.get(key))
                .filter(|record| record.status.is_live())
                .collect();

            for record in &live {
                prop_assert!(record.streak <= record.duration_periods);
                prop_assert_eq!(
                    record.status == StakeStatus::Mature,
                    record.streak == record.duration_periods
                );
            }
            let live_principal: Amount = live.iter().map(|record| record.principal).sum();
            let live_reward: Amount = live.iter().map(|record| record.accumulated_reward).sum();

            prop_assert_eq!(book.rewards_outstanding, live_reward);
            prop_assert_eq!(
                self.balance(&self.accounts.escrow),
                live_principal + book.treasury_available + book.rewards_outstanding
            );
            prop_assert_eq!(self.balance(&self.accounts.pool), book.total_slashed_to_pool);
            prop_assert_eq!(self.token.total_supply(), WALLET * (OWNERS as u128 + 1));
            Ok(())
        }
    }

    fn run(config: StakingConfig, treasury: Amount, ops: &[Op]) -> Result<(), TestCaseError> {
        let world = World::new(config, treasury);
        world.check_books()?;

        for op in ops {
            let statuses_before = world.statuses();
            let ledger_before = world.engine.ledger().snapshot();
            let slashed_before = world.engine.total_slashed_to_pool();

            let accepted = world.apply(op);

            if !accepted {
                prop_assert_eq!(
                    &world.engine.ledger().snapshot(),
                    &ledger_before,
                    "rejected {:?} changed the ledger",
                    op
                );
            }
            prop_assert!(world.engine.total_slashed_to_pool() >= slashed_before);

            for (key, after) in world.statuses() {
                let before = statuses_before.get(&key).copied();
                prop_assert!(
                    before == Some(after) || lifecycle::can_transition(before, after),
                    "{:?} moved {} from {:?} to {:?}",
                    op,
                    key,
                    before,
                    after
                );
            }
            world.check_books()?;
        }
        Ok(())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Default policy
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn random_sequences_keep_invariants(
            treasury in 0..=2_000u128,
            ops in prop::collection::vec(op(), 1..80),
        ) {
            run(StakingConfig::default(), treasury, &ops)?;
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Arbitrary policy
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn random_policies_keep_invariants(
            grace in 0..=PERIOD,
            rate in 0..=100_000u64,
            reward_bps in 0..=10_000u64,
            principal_bps in 0..=10_000u64,
            treasury in 0..=20_000u128,
            ops in prop::collection::vec(op(), 1..80),
        ) {
            let config = StakingConfig {
                grace_window_secs: grace,
                reward_rate_ppm: rate,
                early_exit_reward_penalty_bps: reward_bps,
                early_exit_principal_penalty_bps: principal_bps,
                max_duration_periods: 10,
                ..StakingConfig::default()
            };
            run(config, treasury, &ops)?;
        }
    }
}
