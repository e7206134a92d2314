use std::collections::VecDeque;

use crate::error::{LedgerError, LedgerResult};

/// Outcome of advancing a [`ResultIterator`].
///
/// A step may carry a value and report completion at the same time;
/// consumers must handle `value` before checking `done`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step<T> {
    pub value: Option<T>,
    pub done: bool,
}

impl<T> Step<T> {
    /// A value with more to follow.
    pub fn item(value: T) -> Self {
        Self {
            value: Some(value),
            done: false,
        }
    }

    /// The final value.
    pub fn last(value: T) -> Self {
        Self {
            value: Some(value),
            done: true,
        }
    }

    /// Exhausted, no value.
    pub fn done() -> Self {
        Self {
            value: None,
            done: true,
        }
    }
}

/// Cursor over query or history results held open by the ledger.
///
/// Implementations may hold server-side resources, so every iterator must
/// be closed exactly once, whether or not it was drained.
pub trait ResultIterator {
    type Item;

    /// Fetch the next result.
    fn advance(&mut self) -> LedgerResult<Step<Self::Item>>;

    /// Release the iterator. Further calls to `advance` fail.
    fn close(&mut self) -> LedgerResult<()>;
}

impl<I: ResultIterator + ?Sized> ResultIterator for Box<I> {
    type Item = I::Item;

    fn advance(&mut self) -> LedgerResult<Step<Self::Item>> {
        (**self).advance()
    }

    fn close(&mut self) -> LedgerResult<()> {
        (**self).close()
    }
}

/// Type-erased iterator returned by [`crate::StateStore`] methods.
pub type BoxedIterator<T> = Box<dyn ResultIterator<Item = T> + Send>;

/// Iterator over results materialized when the query ran.
#[derive(Debug)]
pub struct SnapshotIterator<T> {
    results: VecDeque<T>,
    closed: bool,
}

impl<T> SnapshotIterator<T> {
    pub fn new(results: impl IntoIterator<Item = T>) -> Self {
        Self {
            results: results.into_iter().collect(),
            closed: false,
        }
    }

    /// Results not yet yielded.
    pub fn remaining(&self) -> usize {
        self.results.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> ResultIterator for SnapshotIterator<T> {
    type Item = T;

    fn advance(&mut self) -> LedgerResult<Step<T>> {
        if self.closed {
            return Err(LedgerError::IteratorClosed);
        }
        Ok(match self.results.pop_front() {
            Some(value) => Step::item(value),
            None => Step::done(),
        })
    }

    fn close(&mut self) -> LedgerResult<()> {
        if self.closed {
            return Err(LedgerError::IteratorClosed);
        }
        self.closed = true;
        self.results.clear();
        Ok(())
    }
}
