//! Boundary to the escrowed fungible token.
//!
//! The engine only ever sees balances, allowances and transfers.  The
//! in-memory implementation backs tests and the CLI state file.

use {
    crate::amount::Amount,
    log::*,
    parking_lot::RwLock,
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    },
    thiserror::Error,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient token balance")]
    InsufficientBalance,

    #[error("insufficient token allowance")]
    InsufficientAllowance,

    #[error("token ledger unavailable: {0}")]
    Unavailable(String),
}

pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, owner: &Pubkey) -> Result<Amount, TokenError>;

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<Amount, TokenError>;

    /// Move `amount` from `owner` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: Amount,
    ) -> Result<(), TokenError>;

    fn transfer(&self, from: &Pubkey, to: &Pubkey, amount: Amount) -> Result<(), TokenError>;
}

impl<T: TokenLedger + ?Sized> TokenLedger for Arc<T> {
    fn balance_of(&self, owner: &Pubkey) -> Result<Amount, TokenError> {
        (**self).balance_of(owner)
    }

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<Amount, TokenError> {
        (**self).allowance(owner, spender)
    }

    fn transfer_from(
        &self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: Amount,
    ) -> Result<(), TokenError> {
        (**self).transfer_from(spender, owner, to, amount)
    }

    fn transfer(&self, from: &Pubkey, to: &Pubkey, amount: Amount) -> Result<(), TokenError> {
        (**self).transfer(from, to, amount)
    }
}

// ---------------------------------------------------------------------------
// In-memory token
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryToken {
    balances: RwLock<HashMap<Pubkey, Amount>>,
    allowances: RwLock<HashMap<(Pubkey, Pubkey), Amount>>,
    fail_next_transfer: AtomicBool,
}

/// Serializable copy of an [`InMemoryToken`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub balances: Vec<(Pubkey, Amount)>,
    /// `(owner, spender, amount)`
    pub allowances: Vec<(Pubkey, Pubkey, Amount)>,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: TokenSnapshot) -> Self {
        Self {
            balances: RwLock::new(snapshot.balances.into_iter().collect()),
            allowances: RwLock::new(
                snapshot
                    .allowances
                    .into_iter()
                    .map(|(owner, spender, amount)| ((owner, spender), amount))
                    .collect(),
            ),
            fail_next_transfer: AtomicBool::new(false),
        }
    }

    pub fn mint(&self, to: &Pubkey, amount: Amount) -> Result<(), TokenError> {
        let mut balances = self.balances.write();
        let balance = balances.entry(*to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TokenError::Unavailable("mint overflows balance".to_string()))?;
        Ok(())
    }

    /// Set (not add to) the amount `spender` may move out of `owner`.
    pub fn approve(&self, owner: &Pubkey, spender: &Pubkey, amount: Amount) {
        self.allowances.write().insert((*owner, *spender), amount);
    }

    /// Make the next `transfer` or `transfer_from` fail with
    /// [`TokenError::Unavailable`].
    pub fn fail_next_transfer(&self) {
        self.fail_next_transfer.store(true, Ordering::SeqCst);
    }

    pub fn total_supply(&self) -> Amount {
        self.balances.read().values().sum()
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        let mut balances: Vec<_> = self
            .balances
            .read()
            .iter()
            .map(|(owner, amount)| (*owner, *amount))
            .collect();
        balances.sort();
        let mut allowances: Vec<_> = self
            .allowances
            .read()
            .iter()
            .map(|((owner, spender), amount)| (*owner, *spender, *amount))
            .collect();
        allowances.sort();
        TokenSnapshot {
            balances,
            allowances,
        }
    }

    fn check_injected_failure(&self) -> Result<(), TokenError> {
        if self.fail_next_transfer.swap(false, Ordering::SeqCst) {
            warn!("token transfer failed by injected fault");
            return Err(TokenError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn move_balance(
        balances: &mut HashMap<Pubkey, Amount>,
        from: &Pubkey,
        to: &Pubkey,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let from_balance = balances.get(from).copied().unwrap_or_default();
        let remaining = from_balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;
        let to_balance = balances.get(to).copied().unwrap_or_default();
        if from != to {
            let credited = to_balance
                .checked_add(amount)
                .ok_or_else(|| TokenError::Unavailable("balance overflow".to_string()))?;
            balances.insert(*from, remaining);
            balances.insert(*to, credited);
        }
        Ok(())
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, owner: &Pubkey) -> Result<Amount, TokenError> {
        Ok(self.balances.read().get(owner).copied().unwrap_or_default())
    }

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<Amount, TokenError> {
        Ok(self
            .allowances
            .read()
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default())
    }

    fn transfer_from(
        &self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.check_injected_failure()?;

        let mut allowances = self.allowances.write();
        let allowed = allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default();
        let remaining_allowance = allowed
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance)?;

        Self::move_balance(&mut self.balances.write(), owner, to, amount)?;
        allowances.insert((*owner, *spender), remaining_allowance);
        trace!("transfer_from {owner} -> {to}: {amount} (spender {spender})");
        Ok(())
    }

    fn transfer(&self, from: &Pubkey, to: &Pubkey, amount: Amount) -> Result<(), TokenError> {
        self.check_injected_failure()?;
        Self::move_balance(&mut self.balances.write(), from, to, amount)?;
        trace!("transfer {from} -> {to}: {amount}");
        Ok(())
    }
}
