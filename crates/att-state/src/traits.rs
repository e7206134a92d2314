use att_types::TxId;

use crate::entry::{KeyModification, KeyValueEntry};
use crate::error::LedgerResult;
use crate::iterator::BoxedIterator;
use crate::selector::Selector;

/// What a ledger peer exposes to a contract.
///
/// All implementations must satisfy these invariants:
/// - A key maps to at most one live value. An absent key reads as `None`.
/// - Every successful `put_state` or `delete_state` of a live key appends
///   exactly one [`KeyModification`] to that key's history.
/// - Conflicting writes to the same key are serialized by the store.
/// - All I/O errors are propagated, never silently ignored.
pub trait StateStore: Send + Sync {
    /// Read the current value of a key.
    ///
    /// Returns `Ok(None)` if the key has no live value.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write (create or replace) the value of a key.
    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<TxId>;

    /// Remove a key.
    ///
    /// Returns `Ok(None)` if the key had no live value; no transaction is
    /// stamped and nothing is recorded.
    fn delete_state(&self, key: &str) -> LedgerResult<Option<TxId>>;

    /// Run a `{"selector": {...}}` rich query over current state.
    ///
    /// Results are yielded in key order.
    fn query(&self, query: &str) -> LedgerResult<BoxedIterator<KeyValueEntry>>;

    /// Every recorded mutation of `key`, oldest first.
    fn history_for_key(&self, key: &str) -> LedgerResult<BoxedIterator<KeyModification>>;

    /// Run a typed selector. Default implementation encodes it as a query string.
    fn query_selector(&self, selector: &Selector) -> LedgerResult<BoxedIterator<KeyValueEntry>> {
        self.query(&selector.to_query_string())
    }
}
