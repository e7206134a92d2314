//! Foundation types for the ATT ledger.
//!
//! This crate provides the value types shared by the ledger boundary
//! (`att-state`) and the document core (`att-core`).
//!
//! # Key Types
//!
//! - [`Timestamp`] -- seconds/nanos since the UNIX epoch, as stamped by the ledger
//! - [`TxId`] -- UUID v7 transaction identifier assigned to every mutation
//! - [`Payload`] -- tagged union of the known document shapes plus a raw fallback
//! - [`ReportPayload`] -- the `{value}` wrapper used by ATT reports
//! - [`ComplianceRequestPayload`] -- an end-user-certificate verification request

pub mod error;
pub mod payload;
pub mod temporal;
pub mod transaction;

pub use error::TypeError;
pub use payload::{ComplianceRequestPayload, DocType, Payload, ReportPayload};
pub use temporal::Timestamp;
pub use transaction::TxId;
