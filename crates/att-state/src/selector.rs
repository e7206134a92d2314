use std::fmt;

use att_types::DocType;
use serde_json::{Map, Value};

use crate::error::{LedgerError, LedgerResult};

/// Equality predicate over top-level document fields.
///
/// The wire form is the rich-query envelope `{"selector": {...}}`. Each
/// constraint is either a JSON scalar or `{"$eq": scalar}`; a document
/// matches when every named field is present and equal. Numbers compare
/// by value, so `1` matches `1.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selector {
    constraints: Map<String, Value>,
}

impl Selector {
    /// An empty selector. Add constraints with [`Selector::field_eq`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality constraint.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(field.into(), value.into());
        self
    }

    /// Compliance requests with the given approval state.
    pub fn compliance_requests_with_state(approved: bool) -> Self {
        Self::new()
            .field_eq("docType", DocType::EucRequest.as_str())
            .field_eq("isApproved", approved)
    }

    /// Compliance requests still awaiting approval.
    pub fn open_compliance_requests() -> Self {
        Self::compliance_requests_with_state(false)
    }

    /// Parse a `{"selector": {...}}` query string.
    pub fn parse(query: &str) -> LedgerResult<Self> {
        if query.trim().is_empty() {
            return Err(invalid("query string must not be empty"));
        }
        let document: Value = serde_json::from_str(query)
            .map_err(|e| invalid(format!("query string is not valid JSON: {e}")))?;
        let Value::Object(mut envelope) = document else {
            return Err(invalid("query string must be a JSON object"));
        };
        let Some(Value::Object(raw)) = envelope.remove("selector") else {
            return Err(invalid("query string must contain a `selector` object"));
        };
        if let Some(extra) = envelope.keys().next() {
            return Err(invalid(format!("unsupported query field `{extra}`")));
        }

        let mut constraints = Map::new();
        for (field, constraint) in raw {
            let value = normalize_constraint(&field, constraint)?;
            constraints.insert(field, value);
        }
        let selector = Self { constraints };
        selector.validate()?;
        Ok(selector)
    }

    /// Reject selectors the ledger cannot evaluate.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.constraints.is_empty() {
            return Err(invalid("selector must not be empty"));
        }
        for (field, value) in &self.constraints {
            if field.is_empty() || field.starts_with('$') {
                return Err(invalid(format!("unsupported selector field `{field}`")));
            }
            if !is_scalar(value) {
                return Err(invalid(format!(
                    "constraint on `{field}` must be a scalar"
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.constraints.iter()
    }

    /// Whether a parsed document satisfies every constraint.
    pub fn matches(&self, document: &Value) -> bool {
        let Value::Object(fields) = document else {
            return false;
        };
        self.constraints
            .iter()
            .all(|(field, expected)| fields.get(field).is_some_and(|v| scalar_eq(v, expected)))
    }

    /// Encode as the `{"selector": {...}}` query string.
    pub fn to_query_string(&self) -> String {
        let mut envelope = Map::new();
        envelope.insert("selector".into(), Value::Object(self.constraints.clone()));
        Value::Object(envelope).to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn normalize_constraint(field: &str, constraint: Value) -> LedgerResult<Value> {
    match constraint {
        Value::Object(mut operator) => {
            let operand = operator.remove("$eq");
            match operand {
                Some(value) if operator.is_empty() => Ok(value),
                _ => Err(invalid(format!(
                    "unsupported operator in constraint on `{field}`"
                ))),
            }
        }
        other => Ok(other),
    }
}

fn scalar_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn invalid(reason: impl Into<String>) -> LedgerError {
    LedgerError::InvalidSelector(reason.into())
}
