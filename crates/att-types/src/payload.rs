//! Document shapes stored under a ledger key.
//!
//! A stored value is resolved into a [`Payload`] at the deserialization
//! boundary. The compliance-request shape is tried first, then the report
//! wrapper; anything else that is still valid JSON is kept verbatim as
//! [`Payload::Document`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document type tag carried in the `docType` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// End-user-certificate verification request.
    #[serde(rename = "eucRequest")]
    EucRequest,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EucRequest => "eucRequest",
        }
    }
}

/// ATT report: a bare `{value}` wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportPayload {
    pub value: String,
}

impl ReportPayload {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// End-user-certificate verification request filed by a requestor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComplianceRequestPayload {
    pub doc_type: DocType,
    pub requestor: String,
    pub details: String,
    pub is_approved: bool,
}

impl ComplianceRequestPayload {
    /// A new, not yet approved, request.
    pub fn new(requestor: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            doc_type: DocType::EucRequest,
            requestor: requestor.into(),
            details: details.into(),
            is_approved: false,
        }
    }

    /// Same request, marked approved.
    pub fn approved(mut self) -> Self {
        self.is_approved = true;
        self
    }
}

/// Value stored under a key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    ComplianceRequest(ComplianceRequestPayload),
    Report(ReportPayload),
    /// Any other JSON document.
    Document(Value),
}

impl Payload {
    /// Decode stored bytes. Fails only if the bytes are not JSON at all.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode as compact JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// JSON value view of the payload.
    pub fn to_value(&self) -> Value {
        // Infallible: every shape has string keys only.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn as_compliance_request(&self) -> Option<&ComplianceRequestPayload> {
        match self {
            Self::ComplianceRequest(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_report(&self) -> Option<&ReportPayload> {
        match self {
            Self::Report(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ReportPayload> for Payload {
    fn from(report: ReportPayload) -> Self {
        Self::Report(report)
    }
}

impl From<ComplianceRequestPayload> for Payload {
    fn from(request: ComplianceRequestPayload) -> Self {
        Self::ComplianceRequest(request)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        // Route through the untagged resolver so a known shape never ends
        // up as a raw document.
        serde_json::from_value(value.clone()).unwrap_or(Self::Document(value))
    }
}
