//! Document core for the ATT ledger.
//!
//! Provides a unified API over any [`att_state::StateStore`]:
//! - [`AssetRepository`] -- existence-gated create/read/update/delete
//! - [`QueryService`] -- selector queries over current state
//! - [`HistoryService`] -- the change history of one key
//! - [`aggregator`] -- drains ledger iterators into [`ResultRecord`]s and
//!   [`HistoryRecord`]s
//! - [`ReportContract`] / [`ComplianceContract`] -- the ATT report and
//!   end-user-certificate workflows built on the three services
//!
//! Nothing here holds state between calls. Every operation reads and writes
//! through the injected store and surfaces store failures unchanged.

pub mod aggregator;
pub mod contract;
pub mod error;
pub mod history;
pub mod query;
pub mod record;
pub mod repository;

pub use aggregator::{drain, AggregationMode, CurrentState, History};
pub use contract::{ComplianceContract, ReportContract};
pub use error::{CoreError, CoreResult};
pub use history::HistoryService;
pub use query::QueryService;
pub use record::{HistoryRecord, RecordValue, ResultRecord};
pub use repository::AssetRepository;

// Re-export key types
pub use att_state::{Selector, StateStore};
pub use att_types::{ComplianceRequestPayload, Payload, ReportPayload, Timestamp, TxId};
