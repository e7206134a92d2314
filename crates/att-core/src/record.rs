use att_types::{Timestamp, TxId};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A stored value as surfaced by queries and history.
///
/// Parsed JSON when the bytes parse, otherwise the bytes as (lossy) UTF-8
/// text. Serializes without a tag, so callers see either the document or
/// a plain string.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    Json(Value),
    Raw(String),
}

impl RecordValue {
    /// Parse stored bytes, keeping the raw text on failure.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice(raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// One current-state query result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRecord {
    pub key: String,
    pub record: RecordValue,
}

/// One past mutation of a key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    #[serde(serialize_with = "bool_as_string")]
    pub is_delete: bool,
    pub value: RecordValue,
}

fn bool_as_string<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "true" } else { "false" })
}
