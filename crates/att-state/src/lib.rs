//! World-state boundary for the ATT ledger.
//!
//! The document core never talks to a ledger directly. It consumes the
//! [`StateStore`] trait, which models what a ledger peer exposes to a
//! contract: point reads and writes, rich queries over current state, and
//! the change history of a single key.
//!
//! # Backends
//!
//! - [`InMemoryLedger`] -- `BTreeMap`-based state for tests and embedding
//! - [`FileLedger`] -- the same state persisted as one JSON document
//!
//! # Design Rules
//!
//! 1. Every put or delete is stamped with a fresh [`att_types::TxId`] and a
//!    strictly increasing [`att_types::Timestamp`], and appended to the key's history.
//! 2. Query and history results are snapshots taken when the iterator is opened.
//! 3. Iterators must be closed; reading a closed iterator is an error.
//! 4. The store never interprets values except to evaluate a [`Selector`].

pub mod codec;
pub mod entry;
pub mod error;
pub mod file;
pub mod iterator;
pub mod memory;
pub mod selector;
pub mod traits;

pub use entry::{KeyModification, KeyValueEntry};
pub use error::{LedgerError, LedgerResult};
pub use file::FileLedger;
pub use iterator::{BoxedIterator, ResultIterator, SnapshotIterator, Step};
pub use memory::InMemoryLedger;
pub use selector::Selector;
pub use traits::StateStore;
