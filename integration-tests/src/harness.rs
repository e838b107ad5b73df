//! GoodCommit Test Harness
//!
//! A deterministic environment for integration-testing the commitment
//! engine: an in-memory token, a manual clock, one admin, one operator and a
//! funded reward treasury.  Users are minted on demand with their whole
//! balance pre-approved to escrow.

use {
    goodcommit_commitment_stake::{
        amount::Amount,
        clock::{ManualClock, UnixTimestamp},
        config::{EngineAccounts, StakingConfig},
        constants::ONE_TOKEN,
        engine::{CheckInReceipt, CommitmentEngine},
        error::StakingError,
        operator::OperatorRegistry,
        state::HabitCategory,
        token::{InMemoryToken, TokenLedger},
    },
    log::*,
    solana_pubkey::Pubkey,
    std::sync::Arc,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// One whole G$ in base units.
pub const TOKEN: Amount = ONE_TOKEN;

/// Wallet balance given to every test user.
pub const DEFAULT_WALLET: Amount = 10_000 * TOKEN;

/// Reward funding deposited at harness start.
pub const DEFAULT_TREASURY: Amount = 1_000 * TOKEN;

/// Harness start time (~Nov 2023).
pub const GENESIS_TIMESTAMP: UnixTimestamp = 1_700_000_000;

pub type TestEngine = CommitmentEngine<Arc<InMemoryToken>>;

/// Initialize env_logger once; `RUST_LOG` still overrides the level.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .try_init();
}

// ─── Test harness ────────────────────────────────────────────────────────────

pub struct GoodCommitHarness {
    pub engine: Arc<TestEngine>,
    pub token: Arc<InMemoryToken>,
    pub clock: Arc<ManualClock>,
    pub accounts: EngineAccounts,
    pub admin: Pubkey,
    pub operator: Pubkey,
}

impl Default for GoodCommitHarness {
    fn default() -> Self {
        Self::new(StakingConfig::default())
    }
}

impl GoodCommitHarness {
    /// Harness with `config` and a treasury of `DEFAULT_TREASURY`.
    pub fn new(config: StakingConfig) -> Self {
        Self::with_treasury(config, DEFAULT_TREASURY)
    }

    pub fn with_treasury(config: StakingConfig, treasury: Amount) -> Self {
        init_logging();
        let accounts = EngineAccounts::new(Pubkey::new_unique(), Pubkey::new_unique());
        let admin = Pubkey::new_unique();
        let operator = Pubkey::new_unique();
        let token = Arc::new(InMemoryToken::new());
        let clock = Arc::new(ManualClock::new(GENESIS_TIMESTAMP));

        let mut operators = OperatorRegistry::new(admin);
        if let Err(err) = operators.add_operator(&admin, operator) {
            panic!("admin could not register operator: {err}");
        }
        let engine = match CommitmentEngine::new(
            config,
            accounts,
            token.clone(),
            clock.clone(),
            operators,
        ) {
            Ok(engine) => Arc::new(engine),
            Err(err) => panic!("invalid harness config: {err}"),
        };

        let harness = Self {
            engine,
            token,
            clock,
            accounts,
            admin,
            operator,
        };
        if treasury > 0 {
            let funder = harness.new_user_with(treasury);
            if let Err(err) = harness.engine.fund_treasury(&funder, treasury) {
                panic!("could not fund treasury: {err}");
            }
        }
        debug!("harness ready: escrow {} pool {}", accounts.escrow, accounts.pool);
        harness
    }

    /// A user holding `DEFAULT_WALLET`, all of it approved to escrow.
    pub fn new_user(&self) -> Pubkey {
        self.new_user_with(DEFAULT_WALLET)
    }

    pub fn new_user_with(&self, balance: Amount) -> Pubkey {
        let user = Pubkey::new_unique();
        if let Err(err) = self.token.mint(&user, balance) {
            panic!("mint failed: {err}");
        }
        self.token.approve(&user, &self.accounts.escrow, balance);
        user
    }

    pub fn period_secs(&self) -> i64 {
        self.engine.config().period_secs
    }

    /// Advance by whole periods (days under the default policy).
    pub fn advance_days(&self, days: u64) {
        self.clock.advance_periods(days, self.period_secs());
    }

    pub fn advance_seconds(&self, secs: i64) {
        self.clock.advance(secs);
    }

    pub fn check_in(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<CheckInReceipt, StakingError> {
        self.engine.check_in(&self.operator, owner, category)
    }

    /// Advance one period and check in, `days` times.
    pub fn check_in_daily(&self, owner: &Pubkey, category: HabitCategory, days: u64) {
        for day in 0..days {
            self.advance_days(1);
            if let Err(err) = self.check_in(owner, category) {
                panic!("check-in on day {} failed: {err}", day + 1);
            }
        }
    }

    pub fn balance(&self, id: &Pubkey) -> Amount {
        self.token.balance_of(id).unwrap_or_default()
    }

    pub fn escrow_balance(&self) -> Amount {
        self.balance(&self.accounts.escrow)
    }

    pub fn pool_balance(&self) -> Amount {
        self.balance(&self.accounts.pool)
    }

    /// Sum of principal over live records.
    pub fn live_principal(&self) -> Amount {
        let ledger = self.engine.ledger();
        ledger
            .keys()
            .iter()
            .filter_map(|key| ledger.get(key))
            .filter(|record| record.status.is_live())
            .map(|record| record.principal)
            .sum()
    }

    /// Escrow holds exactly the live principal plus the treasury's funds, and
    /// the outstanding reward matches the records.
    pub fn assert_conserved(&self) {
        let book = self.engine.treasury_book();
        let ledger = self.engine.ledger();
        let live_reward: Amount = ledger
            .keys()
            .iter()
            .filter_map(|key| ledger.get(key))
            .filter(|record| record.status.is_live())
            .map(|record| record.accumulated_reward)
            .sum();
        assert_eq!(book.rewards_outstanding, live_reward);
        assert_eq!(
            self.escrow_balance(),
            self.live_principal() + book.treasury_available + book.rewards_outstanding
        );
        assert_eq!(self.pool_balance(), book.total_slashed_to_pool);
    }
}
