//! Operator capability registry.

use {
    crate::error::StakingError,
    borsh::{BorshDeserialize, BorshSerialize},
    log::*,
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::collections::BTreeSet,
};

/// Identities allowed to check owners in and slash overdue stakes, plus the
/// admin that manages them.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct OperatorRegistry {
    admin: Pubkey,
    operators: BTreeSet<Pubkey>,
}

impl OperatorRegistry {
    pub fn new(admin: Pubkey) -> Self {
        Self {
            admin,
            operators: BTreeSet::new(),
        }
    }

    pub fn admin(&self) -> &Pubkey {
        &self.admin
    }

    pub fn is_operator(&self, id: &Pubkey) -> bool {
        self.operators.contains(id)
    }

    pub fn operators(&self) -> impl Iterator<Item = &Pubkey> {
        self.operators.iter()
    }

    /// Returns `false` if `id` was already an operator.
    pub fn add_operator(&mut self, caller: &Pubkey, id: Pubkey) -> Result<bool, StakingError> {
        self.check_admin(caller)?;
        let added = self.operators.insert(id);
        if added {
            info!("operator {id} added by {caller}");
        }
        Ok(added)
    }

    /// Returns `false` if `id` was not an operator.
    pub fn remove_operator(&mut self, caller: &Pubkey, id: &Pubkey) -> Result<bool, StakingError> {
        self.check_admin(caller)?;
        let removed = self.operators.remove(id);
        if removed {
            info!("operator {id} removed by {caller}");
        }
        Ok(removed)
    }

    pub fn rotate_admin(&mut self, caller: &Pubkey, new_admin: Pubkey) -> Result<(), StakingError> {
        self.check_admin(caller)?;
        info!("admin rotated from {} to {new_admin}", self.admin);
        self.admin = new_admin;
        Ok(())
    }

    fn check_admin(&self, caller: &Pubkey) -> Result<(), StakingError> {
        if caller != &self.admin {
            debug!("registry change rejected: {caller} is not the admin");
            return Err(StakingError::Unauthorized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_manages_operators() {
        let admin = Pubkey::new_unique();
        let (op1, op2) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut registry = OperatorRegistry::new(admin);

        assert_eq!(registry.add_operator(&admin, op1), Ok(true));
        assert_eq!(registry.add_operator(&admin, op1), Ok(false));
        assert_eq!(registry.add_operator(&admin, op2), Ok(true));
        assert!(registry.is_operator(&op1));
        assert!(registry.is_operator(&op2));
        assert!(!registry.is_operator(&admin));
        assert_eq!(registry.operators().count(), 2);

        assert_eq!(registry.remove_operator(&admin, &op1), Ok(true));
        assert!(!registry.is_operator(&op1));
        assert_eq!(registry.remove_operator(&admin, &op1), Ok(false));
    }

    #[test]
    fn test_non_admin_is_rejected() {
        let admin = Pubkey::new_unique();
        let op = Pubkey::new_unique();
        let mut registry = OperatorRegistry::new(admin);
        registry.add_operator(&admin, op).unwrap();

        assert_eq!(
            registry.add_operator(&op, Pubkey::new_unique()),
            Err(StakingError::Unauthorized)
        );
        assert_eq!(
            registry.remove_operator(&op, &op),
            Err(StakingError::Unauthorized)
        );
        assert_eq!(
            registry.rotate_admin(&op, op),
            Err(StakingError::Unauthorized)
        );
    }

    #[test]
    fn test_rotate_admin() {
        let (old, new) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut registry = OperatorRegistry::new(old);
        registry.rotate_admin(&old, new).unwrap();
        assert_eq!(registry.admin(), &new);
        assert_eq!(
            registry.add_operator(&old, Pubkey::new_unique()),
            Err(StakingError::Unauthorized)
        );
        assert!(registry.add_operator(&new, Pubkey::new_unique()).is_ok());
    }
}
