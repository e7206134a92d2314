use std::collections::BTreeMap;
use std::sync::RwLock;

use att_types::{Timestamp, TxId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::codec::hex_map;
use crate::entry::{KeyModification, KeyValueEntry};
use crate::error::{LedgerError, LedgerResult};
use crate::iterator::{BoxedIterator, SnapshotIterator};
use crate::selector::Selector;
use crate::traits::StateStore;

/// World state plus per-key history, shared by the in-memory and file backends.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    #[serde(with = "hex_map")]
    state: BTreeMap<String, Vec<u8>>,
    history: BTreeMap<String, Vec<KeyModification>>,
    #[serde(default)]
    clock: Option<Timestamp>,
}

impl LedgerState {
    pub(crate) fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.state.get(key).cloned()
    }

    pub(crate) fn put(&mut self, key: &str, value: &[u8]) -> LedgerResult<TxId> {
        ensure_key(key)?;
        let (tx_id, timestamp) = self.stamp();
        self.state.insert(key.to_string(), value.to_vec());
        self.history
            .entry(key.to_string())
            .or_default()
            .push(KeyModification::write(tx_id, timestamp, value.to_vec()));
        Ok(tx_id)
    }

    pub(crate) fn delete(&mut self, key: &str) -> LedgerResult<Option<TxId>> {
        ensure_key(key)?;
        if !self.state.contains_key(key) {
            return Ok(None);
        }
        let (tx_id, timestamp) = self.stamp();
        self.state.remove(key);
        self.history
            .entry(key.to_string())
            .or_default()
            .push(KeyModification::delete(tx_id, timestamp));
        Ok(Some(tx_id))
    }

    pub(crate) fn query(&self, selector: &Selector) -> Vec<KeyValueEntry> {
        self.state
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<Value>(value)
                    .map(|document| selector.matches(&document))
                    .unwrap_or(false)
            })
            .map(|(key, value)| KeyValueEntry::new(key.clone(), value.clone()))
            .collect()
    }

    pub(crate) fn history(&self, key: &str) -> Vec<KeyModification> {
        self.history.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.len()
    }

    fn stamp(&mut self) -> (TxId, Timestamp) {
        let timestamp = Timestamp::now_after(self.clock.as_ref());
        self.clock = Some(timestamp);
        (TxId::new(), timestamp)
    }
}

/// In-memory world state for tests, local demos, and embedding.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.inner.read().map(|state| state.len()).unwrap_or(0)
    }

    /// Returns `true` if no key is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryLedger {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.get(key))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<TxId> {
        let mut state = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;
        let tx_id = state.put(key, value)?;
        debug!(key, tx = %tx_id, len = value.len(), "state written");
        Ok(tx_id)
    }

    fn delete_state(&self, key: &str) -> LedgerResult<Option<TxId>> {
        let mut state = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;
        let tx_id = state.delete(key)?;
        if let Some(tx_id) = tx_id {
            debug!(key, tx = %tx_id, "state deleted");
        }
        Ok(tx_id)
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

fn ensure_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::EmptyKey);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::ResultIterator;

    fn drain<T>(mut it: BoxedIterator<T>) -> Vec<T> {
        let mut out = Vec::new();
        loop {
            let step = it.advance().unwrap();
            out.extend(step.value);
            if step.done {
                it.close().unwrap();
                return out;
            }
        }
    }

    #[test]
    fn get_missing_key_is_none() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.get_state("1003").unwrap(), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn put_then_get() {
        let ledger = InMemoryLedger::new();
        ledger.put_state("1001", br#"{"value":"a"}"#).unwrap();
        assert_eq!(
            ledger.get_state("1001").unwrap(),
            Some(br#"{"value":"a"}"#.to_vec())
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn empty_key_is_rejected() {
        let ledger = InMemoryLedger::new();
        assert!(matches!(ledger.put_state("", b"x"), Err(LedgerError::EmptyKey)));
        assert!(matches!(ledger.delete_state(""), Err(LedgerError::EmptyKey)));
    }

    #[test]
    fn history_records_writes_and_deletes_in_order() {
        let ledger = InMemoryLedger::new();
        let t1 = ledger.put_state("k", b"1").unwrap();
        let t2 = ledger.put_state("k", b"2").unwrap();
        let t3 = ledger.delete_state("k").unwrap().unwrap();

        let history = drain(ledger.history_for_key("k").unwrap());
        let ids: Vec<_> = history.iter().map(|m| m.tx_id).collect();
        assert_eq!(ids, vec![t1, t2, t3]);
        assert!(history[0].timestamp < history[1].timestamp);
        assert!(history[1].timestamp < history[2].timestamp);
        assert!(history[2].is_delete);
        assert!(history[2].value.is_empty());
        assert_eq!(ledger.get_state("k").unwrap(), None);
    }

    #[test]
    fn deleting_absent_key_records_nothing() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.delete_state("ghost").unwrap(), None);
        assert!(drain(ledger.history_for_key("ghost").unwrap()).is_empty());

        ledger.put_state("k", b"1").unwrap();
        assert!(ledger.delete_state("k").unwrap().is_some());
        assert_eq!(ledger.delete_state("k").unwrap(), None);
        assert_eq!(drain(ledger.history_for_key("k").unwrap()).len(), 2);
    }

    #[test]
    fn query_filters_by_selector_in_key_order() {
        let ledger = InMemoryLedger::new();
        ledger
            .put_state("b", br#"{"docType":"eucRequest","isApproved":false}"#)
            .unwrap();
        ledger
            .put_state("a", br#"{"docType":"eucRequest","isApproved":false}"#)
            .unwrap();
        ledger
            .put_state("c", br#"{"docType":"eucRequest","isApproved":true}"#)
            .unwrap();
        ledger.put_state("d", b"not-json").unwrap();

        let rows = drain(
            ledger
                .query_selector(&Selector::open_compliance_requests())
                .unwrap(),
        );
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn query_rejects_bad_selector() {
        let ledger = InMemoryLedger::new();
        assert!(matches!(
            ledger.query("{}"),
            Err(LedgerError::InvalidSelector(_))
        ));
    }

    #[test]
    fn query_results_are_a_snapshot() {
        let ledger = InMemoryLedger::new();
        ledger.put_state("a", br#"{"n":1}"#).unwrap();
        let it = ledger.query(r#"{"selector":{"n":1}}"#).unwrap();
        ledger.put_state("b", br#"{"n":1}"#).unwrap();
        assert_eq!(drain(it).len(), 1);
    }
}
