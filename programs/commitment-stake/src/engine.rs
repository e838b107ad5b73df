//! The commitment staking engine.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. take the per-key lock and copy the record;
//! 2. validate and build the new record on the copy;
//! 3. dry-run the treasury change against a copy of the book;
//! 4. perform the token transfer, the only step that may fail for reasons
//!    outside the ledger;
//! 5. commit the book and the record.
//!
//! A failure at any step before 5 leaves the ledger untouched.

use {
    crate::{
        amount::Amount,
        check_in::{self, CheckInWindow},
        clock::{Clock, UnixTimestamp},
        config::{ConfigError, EngineAccounts, StakingConfig},
        error::StakingError,
        ledger::LedgerStore,
        lifecycle,
        metrics::StakingMetrics,
        operator::OperatorRegistry,
        reward,
        state::{HabitCategory, StakeKey, StakeRecord, StakeRecordView, StakeStatus},
        token::{TokenError, TokenLedger},
        treasury::TreasuryBook,
    },
    log::*,
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::sync::Arc,
};

/// What a check-in did to the record's reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardOutcome {
    /// The increment was committed from the treasury.
    Accrued(Amount),
    /// The streak advanced but the reward did not.
    Stalled(StakingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInReceipt {
    pub streak: u64,
    pub matured: bool,
    pub reward: RewardOutcome,
}

/// Tokens released to the owner by a harvest or unstake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub principal: Amount,
    pub reward: Amount,
    /// Kept by the treasury on an early exit.
    pub withheld: Amount,
}

impl Payout {
    pub fn total(&self) -> Amount {
        self.principal.saturating_add(self.reward)
    }
}

pub struct CommitmentEngine<T: TokenLedger> {
    config: StakingConfig,
    accounts: EngineAccounts,
    token: T,
    clock: Arc<dyn Clock>,
    operators: RwLock<OperatorRegistry>,
    ledger: LedgerStore,
    metrics: StakingMetrics,
}

impl<T: TokenLedger> CommitmentEngine<T> {
    pub fn new(
        config: StakingConfig,
        accounts: EngineAccounts,
        token: T,
        clock: Arc<dyn Clock>,
        operators: OperatorRegistry,
    ) -> Result<Self, ConfigError> {
        Self::from_parts(config, accounts, token, clock, operators, LedgerStore::new())
    }

    /// Build an engine around an existing ledger, e.g. one restored from a
    /// snapshot.
    pub fn from_parts(
        config: StakingConfig,
        accounts: EngineAccounts,
        token: T,
        clock: Arc<dyn Clock>,
        operators: OperatorRegistry,
        ledger: LedgerStore,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            accounts,
            token,
            clock,
            operators: RwLock::new(operators),
            ledger,
            metrics: StakingMetrics::default(),
        })
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn accounts(&self) -> &EngineAccounts {
        &self.accounts
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn metrics(&self) -> &StakingMetrics {
        &self.metrics
    }

    pub fn now(&self) -> UnixTimestamp {
        self.clock.now()
    }

    // -----------------------------------------------------------------------
    // Owner operations
    // -----------------------------------------------------------------------

    /// Lock `amount` against `category` for `duration_periods` periods.
    pub fn plant(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
        amount: Amount,
        duration_periods: u64,
    ) -> Result<StakeRecordView, StakingError> {
        let key = StakeKey::new(*owner, category);
        self.plant_inner(&key, amount, duration_periods)
            .inspect_err(|err| {
                // A rejected plant on a fresh key must not leave a slot behind.
                self.ledger.prune_empty_slot(&key);
                self.reject("plant", &key, err);
            })
    }

    fn plant_inner(
        &self,
        key: &StakeKey,
        amount: Amount,
        duration_periods: u64,
    ) -> Result<StakeRecordView, StakingError> {
        let _commit = self.ledger.begin_commit();
        if amount == 0 || amount < self.config.min_stake {
            return Err(StakingError::InvalidAmount);
        }
        if duration_periods == 0 || duration_periods > self.config.max_duration_periods {
            return Err(StakingError::InvalidDuration);
        }

        let slot = self.ledger.slot(key);
        let mut guard = slot.lock();
        let previous = guard.as_ref().map(|record| record.status);
        if previous.is_some_and(|status| status.is_live()) {
            return Err(StakingError::AlreadyStaked);
        }
        lifecycle::transition(previous, StakeStatus::Active)?;

        self.pull_from(&key.owner, amount)?;

        let record = StakeRecord::new(amount, duration_periods, self.now());
        let view = record.view();
        *guard = Some(record);

        self.metrics.plants.inc();
        info!("planted {key}: {amount} for {duration_periods} periods");
        Ok(view)
    }

    /// Pay out principal plus reward of a completed commitment.
    pub fn harvest_rewards(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<Payout, StakingError> {
        let key = StakeKey::new(*owner, category);
        self.harvest_inner(&key)
            .inspect_err(|err| self.reject("harvest", &key, err))
    }

    fn harvest_inner(&self, key: &StakeKey) -> Result<Payout, StakingError> {
        let _commit = self.ledger.begin_commit();
        let slot = self.ledger.existing_slot(key).ok_or(StakingError::NotStaked)?;
        let mut guard = slot.lock();
        let record = live_record(guard.as_ref())?;
        if !record.is_harvestable() {
            return Err(StakingError::NotMature);
        }

        let mut draft = record.clone();
        draft.status = lifecycle::transition(Some(record.status), StakeStatus::Harvested)?;
        draft.principal = 0;
        draft.accumulated_reward = 0;

        let payout = Payout {
            principal: record.principal,
            reward: record.accumulated_reward,
            withheld: 0,
        };
        let total = record
            .principal
            .checked_add(record.accumulated_reward)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let settle = |book: &mut TreasuryBook| book.settle_payout(payout.reward);

        self.ledger.check_book(settle)?;
        self.push_to(&key.owner, total)?;
        self.ledger.with_book(settle)?;
        *guard = Some(draft);

        self.metrics.harvests.inc();
        self.metrics.harvested_amount.add(total);
        info!(
            "harvested {key}: principal {} + reward {}",
            payout.principal, payout.reward
        );
        Ok(payout)
    }

    /// Early exit from an Active commitment.
    pub fn unstake(&self, owner: &Pubkey, category: HabitCategory) -> Result<Payout, StakingError> {
        let key = StakeKey::new(*owner, category);
        self.unstake_inner(&key)
            .inspect_err(|err| self.reject("unstake", &key, err))
    }

    fn unstake_inner(&self, key: &StakeKey) -> Result<Payout, StakingError> {
        let _commit = self.ledger.begin_commit();
        let slot = self.ledger.existing_slot(key).ok_or(StakingError::NotStaked)?;
        let mut guard = slot.lock();
        let record = live_record(guard.as_ref())?;
        if record.status == StakeStatus::Mature {
            return Err(StakingError::AlreadyMatured);
        }

        let mut draft = record.clone();
        draft.status = lifecycle::transition(Some(record.status), StakeStatus::Harvested)?;
        draft.principal = 0;
        draft.accumulated_reward = 0;

        let settlement = reward::early_exit_settlement(record, &self.config)?;
        let total = settlement.payout()?;
        let payout = Payout {
            principal: settlement.principal_returned,
            reward: settlement.reward_returned,
            withheld: settlement.retained()?,
        };
        let settle = |book: &mut TreasuryBook| book.settle_early_exit(&settlement);

        self.ledger.check_book(settle)?;
        self.push_to(&key.owner, total)?;
        self.ledger.with_book(settle)?;
        *guard = Some(draft);

        self.metrics.unstakes.inc();
        info!(
            "unstaked {key}: returned {total}, withheld {}",
            payout.withheld
        );
        Ok(payout)
    }

    /// Move `amount` from `funder` into escrow as reward funding.
    pub fn fund_treasury(&self, funder: &Pubkey, amount: Amount) -> Result<(), StakingError> {
        self.fund_inner(funder, amount).inspect_err(|err| {
            self.metrics.rejected.inc();
            debug!("fund_treasury by {funder} rejected: {err}");
        })
    }

    fn fund_inner(&self, funder: &Pubkey, amount: Amount) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        let _commit = self.ledger.begin_commit();
        let fund = |book: &mut TreasuryBook| book.fund(amount);
        self.ledger.check_book(fund)?;
        self.pull_from(funder, amount)?;
        self.ledger.with_book(fund)?;
        info!("treasury funded by {funder}: {amount}");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Operator operations
    // -----------------------------------------------------------------------

    /// Record one verified period for `owner`'s stake in `category`.
    pub fn check_in(
        &self,
        operator: &Pubkey,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<CheckInReceipt, StakingError> {
        let key = StakeKey::new(*owner, category);
        self.check_in_inner(operator, &key)
            .inspect_err(|err| self.reject("check_in", &key, err))
    }

    fn check_in_inner(
        &self,
        operator: &Pubkey,
        key: &StakeKey,
    ) -> Result<CheckInReceipt, StakingError> {
        let _commit = self.ledger.begin_commit();
        self.authorize(operator)?;
        let slot = self.ledger.existing_slot(key).ok_or(StakingError::NotStaked)?;
        let mut guard = slot.lock();
        let record = live_record(guard.as_ref())?;
        if record.status == StakeStatus::Mature || record.streak >= record.duration_periods {
            return Err(StakingError::AlreadyMatured);
        }

        let now = self.now();
        match check_in::window(record, &self.config, now) {
            CheckInWindow::TooEarly => return Err(StakingError::AlreadyCheckedInToday),
            CheckInWindow::Overdue => return Err(StakingError::CheckInOverdue),
            CheckInWindow::Open => {}
        }

        let mut draft = record.clone();
        draft.streak = record
            .streak
            .checked_add(1)
            .ok_or(StakingError::ArithmeticOverflow)?;
        draft.last_check_in = now;
        let matured = draft.streak == draft.duration_periods;
        let next = if matured {
            StakeStatus::Mature
        } else {
            StakeStatus::Active
        };
        draft.status = lifecycle::transition(Some(record.status), next)?;

        let increment = reward::reward_increment(record.principal, self.config.reward_rate_ppm)?;
        let accrued = record
            .accumulated_reward
            .checked_add(increment)
            .ok_or(StakingError::ArithmeticOverflow)?;

        // Last fallible step.  A shortfall stalls the reward, not the streak.
        let reward = match self.ledger.with_book(|book| book.reserve(increment)) {
            Ok(()) => {
                draft.accumulated_reward = accrued;
                RewardOutcome::Accrued(increment)
            }
            Err(StakingError::TreasuryExhausted) => {
                self.metrics.stalled_rewards.inc();
                warn!("reward stalled for {key}: treasury cannot cover {increment}");
                RewardOutcome::Stalled(StakingError::TreasuryExhausted)
            }
            Err(err) => return Err(err),
        };
        let streak = draft.streak;
        *guard = Some(draft);

        self.metrics.check_ins.inc();
        if matured {
            info!("{key} matured after {streak} periods");
        } else {
            debug!("checked in {key}: streak {streak}");
        }
        Ok(CheckInReceipt {
            streak,
            matured,
            reward,
        })
    }

    /// Forfeit an overdue stake's principal to the pool.  Returns the amount
    /// slashed.
    pub fn slash_stake(
        &self,
        operator: &Pubkey,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<Amount, StakingError> {
        let key = StakeKey::new(*owner, category);
        self.slash_inner(operator, &key)
            .inspect_err(|err| self.reject("slash", &key, err))
    }

    fn slash_inner(&self, operator: &Pubkey, key: &StakeKey) -> Result<Amount, StakingError> {
        let _commit = self.ledger.begin_commit();
        self.authorize(operator)?;
        let slot = self.ledger.existing_slot(key).ok_or(StakingError::NotStaked)?;
        let mut guard = slot.lock();
        let record = guard
            .as_ref()
            .filter(|record| record.status == StakeStatus::Active)
            .ok_or(StakingError::NotStaked)?;
        if !check_in::is_overdue(record, &self.config, self.now()) {
            return Err(StakingError::NotOverdue);
        }

        let mut draft = record.clone();
        draft.status = lifecycle::transition(Some(record.status), StakeStatus::Withered)?;
        draft.principal = 0;
        draft.accumulated_reward = 0;

        let (principal, discarded) = (record.principal, record.accumulated_reward);
        let settle = |book: &mut TreasuryBook| book.record_slash(principal, discarded);

        self.ledger.check_book(settle)?;
        self.token
            .transfer(&self.accounts.escrow, &self.accounts.pool, principal)
            .map_err(|err| token_error("slash transfer", err))?;
        self.ledger.with_book(settle)?;
        *guard = Some(draft);

        self.metrics.slashes.inc();
        self.metrics.slashed_amount.add(principal);
        warn!("slashed {key}: {principal} to pool, {discarded} reward discarded");
        Ok(principal)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The record for `(owner, category)`, or the empty sentinel.
    pub fn get_stake_info(&self, owner: &Pubkey, category: HabitCategory) -> StakeRecordView {
        self.ledger
            .get(&StakeKey::new(*owner, category))
            .map(|record| record.view())
            .unwrap_or_default()
    }

    pub fn is_check_in_overdue(&self, owner: &Pubkey, category: HabitCategory) -> bool {
        self.ledger
            .get(&StakeKey::new(*owner, category))
            .is_some_and(|record| check_in::is_overdue(&record, &self.config, self.now()))
    }

    /// Zero-based period index of a live stake, counted from its creation.
    pub fn current_period(&self, owner: &Pubkey, category: HabitCategory) -> Option<u64> {
        self.ledger
            .get(&StakeKey::new(*owner, category))
            .filter(|record| record.status.is_live())
            .map(|record| check_in::current_period_index(&record, &self.config, self.now()))
    }

    /// Reward the stake would hold if it completed its duration.
    pub fn projected_reward(
        &self,
        owner: &Pubkey,
        category: HabitCategory,
    ) -> Result<Amount, StakingError> {
        let record = self
            .ledger
            .get(&StakeKey::new(*owner, category))
            .filter(|record| record.status.is_live())
            .ok_or(StakingError::NotStaked)?;
        reward::projected_full_term_reward(&record, self.config.reward_rate_ppm)
    }

    pub fn stakes_of(&self, owner: &Pubkey) -> Vec<(HabitCategory, StakeRecordView)> {
        self.ledger
            .records_of(owner)
            .into_iter()
            .map(|(category, record)| (category, record.view()))
            .collect()
    }

    /// Keys an operator may slash right now.
    pub fn overdue_stakes(&self) -> Vec<StakeKey> {
        let now = self.now();
        self.ledger
            .keys()
            .into_iter()
            .filter(|key| {
                self.ledger
                    .get(key)
                    .is_some_and(|record| check_in::is_overdue(&record, &self.config, now))
            })
            .collect()
    }

    pub fn total_slashed_to_pool(&self) -> Amount {
        self.ledger.book().total_slashed_to_pool
    }

    pub fn treasury_available(&self) -> Amount {
        self.ledger.book().treasury_available
    }

    pub fn rewards_outstanding(&self) -> Amount {
        self.ledger.book().rewards_outstanding
    }

    pub fn treasury_book(&self) -> TreasuryBook {
        self.ledger.book()
    }

    // -----------------------------------------------------------------------
    // Operator registry
    // -----------------------------------------------------------------------

    pub fn operators(&self) -> RwLockReadGuard<'_, OperatorRegistry> {
        self.operators.read()
    }

    pub fn add_operator(&self, caller: &Pubkey, operator: Pubkey) -> Result<bool, StakingError> {
        self.operators.write().add_operator(caller, operator)
    }

    pub fn remove_operator(
        &self,
        caller: &Pubkey,
        operator: &Pubkey,
    ) -> Result<bool, StakingError> {
        self.operators.write().remove_operator(caller, operator)
    }

    pub fn rotate_admin(&self, caller: &Pubkey, new_admin: Pubkey) -> Result<(), StakingError> {
        self.operators.write().rotate_admin(caller, new_admin)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn authorize(&self, caller: &Pubkey) -> Result<(), StakingError> {
        if self.operators.read().is_operator(caller) {
            Ok(())
        } else {
            Err(StakingError::Unauthorized)
        }
    }

    /// Escrow `amount` from `owner`, checking allowance before balance so the
    /// caller learns to approve first.
    fn pull_from(&self, owner: &Pubkey, amount: Amount) -> Result<(), StakingError> {
        let escrow = &self.accounts.escrow;
        let allowance = self
            .token
            .allowance(owner, escrow)
            .map_err(|err| token_error("allowance query", err))?;
        if allowance < amount {
            return Err(StakingError::InsufficientAllowance);
        }
        let balance = self
            .token
            .balance_of(owner)
            .map_err(|err| token_error("balance query", err))?;
        if balance < amount {
            return Err(StakingError::InsufficientBalance);
        }
        self.token
            .transfer_from(escrow, owner, escrow, amount)
            .map_err(|err| token_error("escrow deposit", err))
    }

    fn push_to(&self, owner: &Pubkey, amount: Amount) -> Result<(), StakingError> {
        self.token
            .transfer(&self.accounts.escrow, owner, amount)
            .map_err(|err| token_error("payout transfer", err))
    }

    fn reject(&self, operation: &str, key: &StakeKey, err: &StakingError) {
        self.metrics.rejected.inc();
        debug!("{operation} on {key} rejected: {err}");
    }
}

fn live_record(record: Option<&StakeRecord>) -> Result<&StakeRecord, StakingError> {
    record
        .filter(|record| record.status.is_live())
        .ok_or(StakingError::NotStaked)
}

fn token_error(context: &str, err: TokenError) -> StakingError {
    match err {
        TokenError::InsufficientBalance => StakingError::InsufficientBalance,
        TokenError::InsufficientAllowance => StakingError::InsufficientAllowance,
        TokenError::Unavailable(reason) => {
            warn!("{context} failed: {reason}");
            StakingError::TransferFailed
        }
    }
}
