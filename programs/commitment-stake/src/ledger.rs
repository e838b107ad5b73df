//! Ledger store: the mapping from (owner, category) to stake records, plus
//! the ledger-wide treasury book.
//!
//! Each key owns its own mutex slot so operations on one key serialize while
//! distinct keys proceed in parallel.  The treasury book sits behind a
//! separate mutex that is held only for the final commit of an operation.
//!
//! Mutating operations also hold the commit gate in shared mode for their
//! whole run; [`LedgerStore::snapshot`] takes it exclusively, so a snapshot
//! never sees a book change without the matching record change.

use {
    crate::{
        constants::LEDGER_SNAPSHOT_DISCRIMINATOR,
        error::StakingError,
        state::{HabitCategory, StakeKey, StakeRecord},
        treasury::TreasuryBook,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    dashmap::DashMap,
    parking_lot::{Mutex, RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{
        fs, io,
        path::{Path, PathBuf},
        sync::Arc,
    },
    thiserror::Error,
};

/// The lock guarding one key's record.  `None` means no record was ever
/// written for the key.
pub type RecordSlot = Arc<Mutex<Option<StakeRecord>>>;

#[derive(Debug, Default)]
pub struct LedgerStore {
    records: DashMap<StakeKey, RecordSlot>,
    book: Mutex<TreasuryBook>,
    commit_gate: RwLock<()>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `key`, created empty on first use.
    pub fn slot(&self, key: &StakeKey) -> RecordSlot {
        self.records.entry(*key).or_default().clone()
    }

    /// Shared hold on the commit gate.  Take it before any slot lock and keep
    /// it until the record and the book are both written.
    pub fn begin_commit(&self) -> RwLockReadGuard<'_, ()> {
        self.commit_gate.read()
    }

    /// Drop `key`'s slot if it never received a record and nobody else holds
    /// it.  Returns whether the slot was removed.
    pub fn prune_empty_slot(&self, key: &StakeKey) -> bool {
        self.records
            .remove_if(key, |_, slot| {
                Arc::strong_count(slot) == 1 && slot.lock().is_none()
            })
            .is_some()
    }

    /// Number of allocated slots, including ones still empty.
    pub fn slot_count(&self) -> usize {
        self.records.len()
    }

    /// The slot for `key` if one was ever created.  Read paths use this so
    /// queries never allocate.
    pub fn existing_slot(&self, key: &StakeKey) -> Option<RecordSlot> {
        self.records.get(key).map(|slot| slot.value().clone())
    }

    pub fn get(&self, key: &StakeKey) -> Option<StakeRecord> {
        self.existing_slot(key).and_then(|slot| slot.lock().clone())
    }

    /// Every key holding a record, in key order.
    pub fn keys(&self) -> Vec<StakeKey> {
        // Collect first so no slot mutex is taken while a shard is locked.
        let slots: Vec<(StakeKey, RecordSlot)> = self
            .records
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        let mut keys: Vec<StakeKey> = slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_some())
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    pub fn records_of(&self, owner: &Pubkey) -> Vec<(HabitCategory, StakeRecord)> {
        HabitCategory::ALL
            .into_iter()
            .filter_map(|category| {
                self.get(&StakeKey::new(*owner, category))
                    .map(|record| (category, record))
            })
            .collect()
    }

    pub fn book(&self) -> TreasuryBook {
        *self.book.lock()
    }

    /// Apply `f` to a copy of the book and keep the copy only if `f` succeeds.
    pub fn with_book<R>(
        &self,
        f: impl FnOnce(&mut TreasuryBook) -> Result<R, StakingError>,
    ) -> Result<R, StakingError> {
        let mut book = self.book.lock();
        let mut draft = *book;
        let result = f(&mut draft)?;
        *book = draft;
        Ok(result)
    }

    /// Dry run of [`Self::with_book`]: reports whether `f` would succeed
    /// against the current book without changing it.
    pub fn check_book<R>(
        &self,
        f: impl FnOnce(&mut TreasuryBook) -> Result<R, StakingError>,
    ) -> Result<R, StakingError> {
        let mut draft = self.book();
        f(&mut draft)
    }

    /// Point-in-time copy of every record and the book.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let _quiesced = self.commit_gate.write();
        let records = self
            .keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|record| (key, record)))
            .collect();
        LedgerSnapshot {
            records,
            book: self.book(),
        }
    }

    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let records = snapshot
            .records
            .into_iter()
            .map(|(key, record)| (key, Arc::new(Mutex::new(Some(record)))))
            .collect();
        Self {
            records,
            book: Mutex::new(snapshot.book),
            commit_gate: RwLock::new(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot data is empty")]
    Empty,

    #[error("unexpected snapshot discriminator {0}")]
    InvalidDiscriminator(u8),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Serializable ledger contents.
///
/// Records are stored as a list rather than a map so the JSON form stays
/// valid with non-string keys.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct LedgerSnapshot {
    pub records: Vec<(StakeKey, StakeRecord)>,
    pub book: TreasuryBook,
}

impl LedgerSnapshot {
    /// Discriminator byte followed by the borsh payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut data = vec![LEDGER_SNAPSHOT_DISCRIMINATOR];
        BorshSerialize::serialize(self, &mut data)?;
        Ok(data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let (&discriminator, mut payload) = data.split_first().ok_or(SnapshotError::Empty)?;
        if discriminator != LEDGER_SNAPSHOT_DISCRIMINATOR {
            return Err(SnapshotError::InvalidDiscriminator(discriminator));
        }
        Ok(BorshDeserialize::deserialize_reader(&mut payload)?)
    }

    /// Writes a sibling `.tmp` file and renames it over `path`, so readers
    /// see either the old snapshot or the new one.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, self.to_bytes()?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Self::from_bytes(&fs::read(path)?)
    }
}
