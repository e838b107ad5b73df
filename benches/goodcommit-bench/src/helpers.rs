//! Shared helpers for GoodCommit benchmarks.

use {
    goodcommit_commitment_stake::{
        amount::Amount,
        clock::{ManualClock, UnixTimestamp},
        config::{EngineAccounts, StakingConfig},
        constants::ONE_TOKEN,
        engine::CommitmentEngine,
        operator::OperatorRegistry,
        state::HabitCategory,
        token::InMemoryToken,
    },
    solana_pubkey::Pubkey,
    std::sync::Arc,
};

pub const GENESIS: UnixTimestamp = 1_700_000_000;

/// Principal planted by every benchmark owner.
pub const STAKE: Amount = 100 * ONE_TOKEN;

pub type BenchEngine = CommitmentEngine<InMemoryToken>;

pub struct BenchWorld {
    pub engine: BenchEngine,
    pub clock: Arc<ManualClock>,
    pub operator: Pubkey,
    pub owners: Vec<Pubkey>,
}

impl BenchWorld {
    /// `n` owners, each with a wallet large enough for every category and
    /// the escrow fully approved. The treasury covers a year of rewards.
    pub fn new(n: usize) -> Self {
        let admin = Pubkey::new_unique();
        let operator = Pubkey::new_unique();
        let accounts = EngineAccounts::new(Pubkey::new_unique(), Pubkey::new_unique());
        let clock = Arc::new(ManualClock::new(GENESIS));

        let mut operators = OperatorRegistry::new(admin);
        operators
            .add_operator(&admin, operator)
            .expect("admin adds operator");
        let engine = CommitmentEngine::new(
            StakingConfig::default(),
            accounts,
            InMemoryToken::new(),
            clock.clone(),
            operators,
        )
        .expect("default config is valid");

        let wallet = STAKE * HabitCategory::ALL.len() as Amount;
        let owners: Vec<Pubkey> = (0..n)
            .map(|_| {
                let owner = Pubkey::new_unique();
                engine.token().mint(&owner, wallet).expect("mint");
                engine.token().approve(&owner, &accounts.escrow, wallet);
                owner
            })
            .collect();

        let treasury = STAKE * n as Amount;
        let funder = Pubkey::new_unique();
        engine.token().mint(&funder, treasury).expect("mint");
        engine.token().approve(&funder, &accounts.escrow, treasury);
        engine.fund_treasury(&funder, treasury).expect("fund treasury");

        Self {
            engine,
            clock,
            operator,
            owners,
        }
    }

    /// Plant one `duration`-day stake per owner in `category`.
    pub fn plant_all(&self, category: HabitCategory, duration: u64) {
        for owner in &self.owners {
            self.engine
                .plant(owner, category, STAKE, duration)
                .expect("plant");
        }
    }

    pub fn next_day(&self) {
        let period = self.engine.config().period_secs;
        self.clock.advance_periods(1, period);
    }
}
