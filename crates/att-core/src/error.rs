use att_state::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("the {kind} {key} already exists")]
    AlreadyExists { kind: &'static str, key: String },

    #[error("the {kind} {key} does not exist")]
    NotFound { kind: &'static str, key: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("the {kind} {key} holds malformed data: {source}")]
    MalformedData {
        kind: &'static str,
        key: String,
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger call failed: {0}")]
    Upstream(#[from] LedgerError),
}

pub type CoreResult<T> = Result<T, CoreError>;
