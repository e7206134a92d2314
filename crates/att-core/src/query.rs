use att_state::{LedgerError, Selector, StateStore};
use tracing::debug;

use crate::aggregator::{drain, CurrentState};
use crate::error::{CoreError, CoreResult};
use crate::record::ResultRecord;

/// Selector queries over current state.
///
/// The iterator is drained completely before returning; results come back
/// in the order the store yields them.
pub struct QueryService<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: StateStore + ?Sized> QueryService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn find_by_predicate(&self, selector: &Selector) -> CoreResult<Vec<ResultRecord>> {
        selector
            .validate()
            .map_err(|e| invalid_selector(&selector.to_query_string(), e))?;

        debug!(%selector, "running selector query");
        let iterator = self
            .store
            .query_selector(selector)
            .map_err(|e| invalid_selector(&selector.to_query_string(), e))?;
        drain(iterator, CurrentState)
    }

    /// Parse and run a raw `{"selector": {...}}` query string.
    pub fn find_by_query_string(&self, query: &str) -> CoreResult<Vec<ResultRecord>> {
        let selector = Selector::parse(query).map_err(|e| invalid_selector(query, e))?;
        self.find_by_predicate(&selector)
    }

    /// Compliance requests still awaiting approval.
    pub fn open_compliance_requests(&self) -> CoreResult<Vec<ResultRecord>> {
        self.find_by_predicate(&Selector::open_compliance_requests())
    }
}

fn invalid_selector(query: &str, error: LedgerError) -> CoreError {
    match error {
        LedgerError::InvalidSelector(reason) => {
            CoreError::InvalidArgument(format!("selector `{query}` rejected: {reason}"))
        }
        other => CoreError::Upstream(other),
    }
}

#[cfg(test)]
mod tests {
    use att_state::InMemoryLedger;
    use serde_json::json;

    use super::*;
    use crate::record::RecordValue;

    fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        ledger
            .put_state(
                "1001",
                br#"{"docType":"eucRequest","requestor":"za","details":"1 tank to de","isApproved":false}"#,
            )
            .unwrap();
        ledger
            .put_state(
                "1002",
                br#"{"docType":"eucRequest","requestor":"de","details":"1 gun to za","isApproved":true}"#,
            )
            .unwrap();
        ledger.put_state("1003", br#"{"value":"att report"}"#).unwrap();
        ledger
    }

    #[test]
    fn returns_matching_subset_wrapped_as_key_and_record() {
        let ledger = seeded();
        let records = QueryService::new(&ledger)
            .find_by_predicate(&Selector::new().field_eq("requestor", "de"))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "1002");
        assert_eq!(
            records[0].record,
            RecordValue::Json(json!({
                "docType": "eucRequest", "requestor": "de", "details": "1 gun to za", "isApproved": true
            }))
        );
    }

    #[test]
    fn open_requests_exclude_approved_and_other_documents() {
        let ledger = seeded();
        let records = QueryService::new(&ledger).open_compliance_requests().unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1001"]);
    }

    #[test]
    fn empty_selector_is_invalid_argument() {
        let ledger = seeded();
        let err = QueryService::new(&ledger)
            .find_by_predicate(&Selector::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref m) if m.contains("must not be empty")));
    }

    #[test]
    fn malformed_query_string_names_the_input() {
        let ledger = seeded();
        let err = QueryService::new(&ledger)
            .find_by_query_string("{\"docType\":1}")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref m) if m.contains("{\"docType\":1}")));
    }

    #[test]
    fn blank_query_string_is_invalid_argument() {
        let ledger = seeded();
        let err = QueryService::new(&ledger).find_by_query_string("").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn query_string_and_builder_agree() {
        let ledger = seeded();
        let service = QueryService::new(&ledger);
        let from_string = service
            .find_by_query_string(r#"{"selector":{"docType":"eucRequest","isApproved":false}}"#)
            .unwrap();
        assert_eq!(from_string, service.open_compliance_requests().unwrap());
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let ledger = seeded();
        let records = QueryService::new(&ledger)
            .find_by_predicate(&Selector::new().field_eq("requestor", "nobody"))
            .unwrap();
        assert!(records.is_empty());
    }
}
