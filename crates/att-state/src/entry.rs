use att_types::{Timestamp, TxId};
use serde::{Deserialize, Serialize};

use crate::codec::hex_bytes;

/// One row of a current-state query: a key and its stored bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One past mutation of a key.
///
/// Deletions carry an empty `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyModification {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    pub is_delete: bool,
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl KeyModification {
    pub fn write(tx_id: TxId, timestamp: Timestamp, value: Vec<u8>) -> Self {
        Self {
            tx_id,
            timestamp,
            is_delete: false,
            value,
        }
    }

    pub fn delete(tx_id: TxId, timestamp: Timestamp) -> Self {
        Self {
            tx_id,
            timestamp,
            is_delete: true,
            value: Vec::new(),
        }
    }
}
