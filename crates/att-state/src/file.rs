use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use att_types::TxId;
use tracing::{debug, info};

use crate::entry::{KeyModification, KeyValueEntry};
use crate::error::{LedgerError, LedgerResult};
use crate::iterator::{BoxedIterator, SnapshotIterator};
use crate::memory::LedgerState;
use crate::selector::Selector;
use crate::traits::StateStore;

/// World state persisted as a single JSON document.
///
/// Every mutation is applied to a copy of the state, written to a temporary
/// file beside the target and atomically renamed over it; only then does
/// the in-memory view change. A failed write leaves both untouched.
pub struct FileLedger {
    path: PathBuf,
    inner: RwLock<LedgerState>,
}

impl FileLedger {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text).map_err(|e| LedgerError::CorruptLedger {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            LedgerState::default()
        };

        info!(path = %path.display(), keys = state.len(), "ledger opened");
        Ok(Self {
            path,
            inner: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.inner.read().map(|state| state.len()).unwrap_or(0)
    }

    /// Returns `true` if no key is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Persist `next`, then make it the live state.
    fn commit(
        &self,
        state: &mut RwLockWriteGuard<'_, LedgerState>,
        next: LedgerState,
    ) -> LedgerResult<()> {
        self.persist(&next)?;
        **state = next;
        Ok(())
    }

    fn persist(&self, state: &LedgerState) -> LedgerResult<()> {
        let encoded = serde_json::to_vec_pretty(state)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| LedgerError::Io(e.error))?;

        debug!(path = %self.path.display(), bytes = encoded.len(), "ledger persisted");
        Ok(())
    }
}

impl StateStore for FileLedger {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.get(key))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<TxId> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let tx_id = next.put(key, value)?;
        self.commit(&mut state, next)?;
        Ok(tx_id)
    }

    fn delete_state(&self, key: &str) -> LedgerResult<Option<TxId>> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let Some(tx_id) = next.delete(key)? else {
            return Ok(None);
        };
        self.commit(&mut state, next)?;
        Ok(Some(tx_id))
    }

    fn query(&self, query: &str) -> LedgerResult<BoxedIterator<KeyValueEntry>> {
        let selector = Selector::parse(query)?;
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(Box::new(SnapshotIterator::new(state.query(&selector))))
    }

    fn history_for_key(&self, key: &str) -> LedgerResult<BoxedIterator<KeyModification>> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(Box::new(SnapshotIterator::new(state.history(key))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::ResultIterator;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("ledger.json")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.path().exists());
    }

    #[test]
    fn state_and_history_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let tx = {
            let ledger = FileLedger::open(&path).unwrap();
            ledger.put_state("1001", br#"{"value":"a"}"#).unwrap();
            ledger.put_state("1002", &[0xff, 0xfe]).unwrap();
            ledger.delete_state("1002").unwrap().unwrap()
        };

        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(
            reopened.get_state("1001").unwrap(),
            Some(br#"{"value":"a"}"#.to_vec())
        );
        assert_eq!(reopened.get_state("1002").unwrap(), None);

        let mut history = reopened.history_for_key("1002").unwrap();
        let first = history.advance().unwrap().value.unwrap();
        assert_eq!(first.value, vec![0xff, 0xfe]);
        let second = history.advance().unwrap().value.unwrap();
        assert!(second.is_delete);
        assert_eq!(second.tx_id, tx);
        history.close().unwrap();
    }

    #[test]
    fn nested_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("ledger.json");
        let ledger = FileLedger::open(&path).unwrap();
        ledger.put_state("k", b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            FileLedger::open(&path),
            Err(LedgerError::CorruptLedger { .. })
        ));
    }

    #[test]
    fn out_of_range_clock_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(
            &path,
            r#"{"state":{},"history":{},"clock":{"seconds":9999999999,"nanos":4294967295}}"#,
        )
        .unwrap();
        match FileLedger::open(&path) {
            Err(LedgerError::CorruptLedger { reason, .. }) => {
                assert!(reason.contains("out of range"), "{reason}")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a ledger with an invalid clock"),
        }
    }

    #[test]
    fn deleting_absent_key_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = FileLedger::open(&path).unwrap();
        assert_eq!(ledger.delete_state("ghost").unwrap(), None);
        assert!(!path.exists());

        ledger.put_state("k", b"{}").unwrap();
        let before = fs::read(&path).unwrap();
        assert_eq!(ledger.delete_state("ghost").unwrap(), None);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn failed_mutation_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("ledger.json")).unwrap();
        assert!(ledger.put_state("", b"x").is_err());
        assert!(ledger.is_empty());
        assert!(!ledger.path().exists());
    }
}
