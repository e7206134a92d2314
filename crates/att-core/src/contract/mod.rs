//! ATT document workflows built on the core services.
//!
//! - [`ReportContract`] -- arms-trade-treaty reports stored as `{value}`
//! - [`ComplianceContract`] -- end-user-certificate verification requests

pub mod compliance;
pub mod report;

pub use compliance::ComplianceContract;
pub use report::ReportContract;
