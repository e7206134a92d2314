//! Draining ledger iterators into ordered result records.
//!
//! Both query modes share one loop: advance until the iterator reports
//! completion, shape every entry that carries a value, then close. The
//! iterator is held by a guard that closes it exactly once on every exit
//! path, including an error from `advance`.
//!
//! A value that is not JSON does not fail the drain. The record carries the
//! raw text instead and a warning is logged.

use att_state::{KeyModification, KeyValueEntry, LedgerResult, ResultIterator, Step};
use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::record::{HistoryRecord, RecordValue, ResultRecord};

/// How entries of one iterator kind become records.
pub trait AggregationMode {
    type Entry;
    type Record;

    /// Name used in log events.
    fn name(&self) -> &'static str;

    /// Whether the entry produces a record at all.
    fn keep(&self, entry: &Self::Entry) -> bool;

    fn shape(&self, entry: Self::Entry) -> Self::Record;
}

/// Current-state query results: `{key, record}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentState;

/// Per-key change history: `{txId, timestamp, isDelete, value}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct History;

/// Shape one current-state row.
pub fn shape_current_state_record(entry: KeyValueEntry) -> ResultRecord {
    ResultRecord {
        record: RecordValue::parse(&entry.value),
        key: entry.key,
    }
}

/// Shape one key modification.
pub fn shape_history_record(entry: KeyModification) -> HistoryRecord {
    HistoryRecord {
        tx_id: entry.tx_id,
        timestamp: entry.timestamp,
        is_delete: entry.is_delete,
        value: RecordValue::parse(&entry.value),
    }
}

impl AggregationMode for CurrentState {
    type Entry = KeyValueEntry;
    type Record = ResultRecord;

    fn name(&self) -> &'static str {
        "current-state"
    }

    fn keep(&self, entry: &KeyValueEntry) -> bool {
        !entry.value.is_empty()
    }

    fn shape(&self, entry: KeyValueEntry) -> ResultRecord {
        let record = shape_current_state_record(entry);
        if record.record.is_raw() {
            warn!(key = %record.key, "stored value is not JSON; keeping raw text");
        }
        record
    }
}

impl AggregationMode for History {
    type Entry = KeyModification;
    type Record = HistoryRecord;

    fn name(&self) -> &'static str {
        "history"
    }

    // Deletions are recorded with an empty value and must still be reported.
    fn keep(&self, entry: &KeyModification) -> bool {
        entry.is_delete || !entry.value.is_empty()
    }

    fn shape(&self, entry: KeyModification) -> HistoryRecord {
        let record = shape_history_record(entry);
        if record.value.is_raw() && !record.is_delete {
            warn!(tx = %record.tx_id, "stored value is not JSON; keeping raw text");
        }
        record
    }
}

/// Drain `iterator` into records, preserving iteration order.
pub fn drain<M, I>(iterator: I, mode: M) -> CoreResult<Vec<M::Record>>
where
    M: AggregationMode,
    I: ResultIterator<Item = M::Entry>,
{
    let mut scoped = ScopedIterator::new(iterator);
    let mut records = Vec::new();

    loop {
        let step = scoped.advance()?;
        if let Some(entry) = step.value {
            if mode.keep(&entry) {
                records.push(mode.shape(entry));
            }
        }
        if step.done {
            break;
        }
    }

    scoped.close()?;
    debug!(mode = mode.name(), count = records.len(), "results drained");
    Ok(records)
}

/// Closes the wrapped iterator exactly once.
struct ScopedIterator<I: ResultIterator> {
    inner: I,
    closed: bool,
}

impl<I: ResultIterator> ScopedIterator<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    fn advance(&mut self) -> LedgerResult<Step<I::Item>> {
        self.inner.advance()
    }

    fn close(mut self) -> LedgerResult<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl<I: ResultIterator> Drop for ScopedIterator<I> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.inner.close() {
                warn!(error = %e, "failed to close result iterator");
            }
        }
    }
}
