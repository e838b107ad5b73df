//! The JSON state file.

use {
    goodcommit_commitment_stake::{
        clock::Clock,
        config::{ConfigError, EngineAccounts, StakingConfig},
        engine::CommitmentEngine,
        ledger::{LedgerSnapshot, LedgerStore},
        operator::OperatorRegistry,
        token::{InMemoryToken, TokenSnapshot},
    },
    log::*,
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{
        fs, io,
        path::{Path, PathBuf},
        sync::Arc,
    },
    thiserror::Error,
};

pub type CliEngine = CommitmentEngine<InMemoryToken>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("No state file at {0}; run `goodcommit init` first")]
    Missing(PathBuf),

    #[error("State file {0} already exists; pass --force to overwrite it")]
    AlreadyInitialized(PathBuf),

    #[error("State file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("State file is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to rebuild the engine between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliState {
    pub config: StakingConfig,
    pub accounts: EngineAccounts,
    pub operators: OperatorRegistry,
    pub ledger: LedgerSnapshot,
    pub token: TokenSnapshot,
}

impl CliState {
    pub fn new(config: StakingConfig, accounts: EngineAccounts, admin: Pubkey) -> Self {
        Self {
            config,
            accounts,
            operators: OperatorRegistry::new(admin),
            ledger: LedgerSnapshot::default(),
            token: TokenSnapshot::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let data = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StateError::Missing(path.to_path_buf()),
            _ => StateError::Io(err),
        })?;
        let state = serde_json::from_slice(&data)?;
        debug!("loaded state from {}", path.display());
        Ok(state)
    }

    /// Write through a sibling temp file so a crash never leaves a torn state.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        debug!("saved state to {}", path.display());
        Ok(())
    }

    pub fn into_engine(self, clock: Arc<dyn Clock>) -> Result<CliEngine, ConfigError> {
        CommitmentEngine::from_parts(
            self.config,
            self.accounts,
            InMemoryToken::from_snapshot(self.token),
            clock,
            self.operators,
            LedgerStore::restore(self.ledger),
        )
    }

    pub fn from_engine(engine: &CliEngine) -> Self {
        Self {
            config: engine.config().clone(),
            accounts: *engine.accounts(),
            operators: engine.operators().clone(),
            ledger: engine.ledger().snapshot(),
            token: engine.token().snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        assert_matches::assert_matches,
        goodcommit_commitment_stake::{clock::ManualClock, state::HabitCategory},
    };

    fn accounts() -> EngineAccounts {
        EngineAccounts::new(Pubkey::new_unique(), Pubkey::new_unique())
    }

    #[test]
    fn test_missing_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_matches!(CliState::load(&path), Err(StateError::Missing(p)) if p == path);
    }

    #[test]
    fn test_engine_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let admin = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let state = CliState::new(StakingConfig::default(), accounts(), admin);

        let engine = state
            .clone()
            .into_engine(Arc::new(ManualClock::new(1_000)))
            .unwrap();
        let escrow = engine.accounts().escrow;
        engine.token().mint(&owner, 5_000).unwrap();
        engine.token().approve(&owner, &escrow, 5_000);
        engine.plant(&owner, HabitCategory::Focus, 2_000, 10).unwrap();
        CliState::from_engine(&engine).save(&path).unwrap();

        let loaded = CliState::load(&path).unwrap();
        assert_eq!(loaded.config, state.config);
        assert_eq!(loaded.operators.admin(), &admin);
        assert_eq!(loaded.ledger.records.len(), 1);

        let engine = loaded
            .into_engine(Arc::new(ManualClock::new(1_000)))
            .unwrap();
        assert_eq!(
            engine.get_stake_info(&owner, HabitCategory::Focus).principal,
            2_000
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_invalid_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert_matches!(CliState::load(&path), Err(StateError::Json(_)));
    }
}
