use att_state::{Selector, StateStore};
use att_types::{ComplianceRequestPayload, Payload, ReportPayload, TxId};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::history::HistoryService;
use crate::query::QueryService;
use crate::record::{HistoryRecord, ResultRecord};
use crate::repository::AssetRepository;

const REQUEST: &str = "att EUC request";
const VERIFICATION_REQUEST: &str = "att EUC verification request";
const ORDINALS: [&str; 3] = ["1st", "2nd", "3rd"];

/// End-user-certificate verification requests and compliance artifacts.
pub struct ComplianceContract<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: StateStore + ?Sized> ComplianceContract<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn requests(&self) -> AssetRepository<'s, S> {
        AssetRepository::new(self.store).with_kind(REQUEST)
    }

    pub fn artifact_exists(&self, artifact_id: &str) -> CoreResult<bool> {
        self.requests().exists(artifact_id)
    }

    /// File a request from `[id, requestor, details]`.
    ///
    /// Every argument must be non-empty. Requestor and details are stored
    /// lower-cased; the request starts unapproved.
    pub fn create_euc_request<A: AsRef<str>>(&self, args: &[A]) -> CoreResult<TxId> {
        let [id, requestor, details] = args else {
            return Err(CoreError::InvalidArgument(
                "incorrect number of arguments, expecting 3".into(),
            ));
        };
        for (arg, ordinal) in args.iter().zip(ORDINALS) {
            if arg.as_ref().is_empty() {
                return Err(CoreError::InvalidArgument(format!(
                    "{ordinal} argument must be a non-empty string"
                )));
            }
        }

        let id = id.as_ref();
        let request = ComplianceRequestPayload::new(
            requestor.as_ref().to_lowercase(),
            details.as_ref().to_lowercase(),
        );
        let tx_id = self
            .requests()
            .with_kind(VERIFICATION_REQUEST)
            .create(id, &request.into())?;
        info!(id, tx = %tx_id, "EUC verification request filed");
        Ok(tx_id)
    }

    pub fn read_euc_request(&self, request_id: &str) -> CoreResult<Payload> {
        self.requests().read(request_id)
    }

    /// Overwrite the request with a `{value}` document.
    pub fn update_euc_request(&self, request_id: &str, new_value: &str) -> CoreResult<TxId> {
        self.requests()
            .update(request_id, &ReportPayload::new(new_value).into())
    }

    /// Mark a filed request approved.
    pub fn approve_euc_request(&self, request_id: &str) -> CoreResult<TxId> {
        let repo = self.requests();
        let request = match repo.read(request_id)? {
            Payload::ComplianceRequest(request) => request,
            _ => {
                return Err(CoreError::InvalidArgument(format!(
                    "the {REQUEST} {request_id} is not a verification request"
                )))
            }
        };
        let tx_id = repo.update(request_id, &request.approved().into())?;
        info!(id = request_id, tx = %tx_id, "EUC verification request approved");
        Ok(tx_id)
    }

    pub fn delete_euc_request(&self, request_id: &str) -> CoreResult<TxId> {
        self.requests().delete(request_id)
    }

    /// Requests with the given approval state.
    pub fn euc_requests_with_state(&self, approved: bool) -> CoreResult<Vec<ResultRecord>> {
        QueryService::new(self.store)
            .find_by_predicate(&Selector::compliance_requests_with_state(approved))
    }

    /// Requests still awaiting approval.
    pub fn open_euc_requests(&self) -> CoreResult<Vec<ResultRecord>> {
        QueryService::new(self.store).open_compliance_requests()
    }

    /// Run a raw `{"selector": {...}}` query over all artifacts.
    pub fn query_artifacts(&self, query: &str) -> CoreResult<Vec<ResultRecord>> {
        QueryService::new(self.store).find_by_query_string(query)
    }

    pub fn history_for_artifact(&self, artifact_id: &str) -> CoreResult<Vec<HistoryRecord>> {
        HistoryService::new(self.store).history_of(artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use att_state::InMemoryLedger;
    use serde_json::json;

    use super::*;

    fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        ledger
            .put_state(
                "1001",
                br#"{"docType":"eucRequest", "requestor":"za", "details":"1 tank to de", "isApproved": false}"#,
            )
            .unwrap();
        ledger
            .put_state(
                "1002",
                br#"{"docType":"eucRequest", "requestor":"de", "details":"1 gun to za", "isApproved": false}"#,
            )
            .unwrap();
        ledger
    }

    #[test]
    fn artifact_exists() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        assert!(contract.artifact_exists("1001").unwrap());
        assert!(!contract.artifact_exists("1003").unwrap());
    }

    #[test]
    fn create_euc_request_stores_exact_document() {
        let ledger = seeded();
        ComplianceContract::new(&ledger)
            .create_euc_request(&["1003", "za", "3 jets to jm"])
            .unwrap();
        assert_eq!(
            ledger.get_state("1003").unwrap(),
            Some(
                br#"{"docType":"eucRequest","requestor":"za","details":"3 jets to jm","isApproved":false}"#
                    .to_vec()
            )
        );
    }

    #[test]
    fn create_lower_cases_requestor_and_details() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract
            .create_euc_request(&["1003", "ZA", "3 Jets To JM"])
            .unwrap();
        assert_eq!(
            contract.read_euc_request("1003").unwrap(),
            Payload::from(ComplianceRequestPayload::new("za", "3 jets to jm"))
        );
    }

    #[test]
    fn create_existing_request_fails() {
        let ledger = seeded();
        let err = ComplianceContract::new(&ledger)
            .create_euc_request(&["1001", "za", "3 jets to jm"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "the att EUC verification request 1001 already exists"
        );
    }

    #[test]
    fn create_requires_three_arguments() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        for args in [vec!["1003"], vec!["1003", "za"], vec!["1003", "za", "d", "x"]] {
            let err = contract.create_euc_request(args.as_slice()).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(ref m) if m.contains("expecting 3")));
        }
        assert!(!contract.artifact_exists("1003").unwrap());
    }

    #[test]
    fn create_rejects_empty_arguments() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        let cases = [
            (["", "za", "d"], "1st"),
            (["1003", "", "d"], "2nd"),
            (["1003", "za", ""], "3rd"),
        ];
        for (args, ordinal) in cases {
            let err = contract.create_euc_request(&args).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid argument: {ordinal} argument must be a non-empty string")
            );
        }
        assert!(!contract.artifact_exists("1003").unwrap());
    }

    #[test]
    fn read_euc_request() {
        let ledger = seeded();
        let payload = ComplianceContract::new(&ledger)
            .read_euc_request("1001")
            .unwrap();
        assert_eq!(
            payload.to_value(),
            json!({"docType": "eucRequest", "requestor": "za", "details": "1 tank to de", "isApproved": false})
        );
    }

    #[test]
    fn read_missing_request_fails() {
        let ledger = seeded();
        let err = ComplianceContract::new(&ledger)
            .read_euc_request("1003")
            .unwrap_err();
        assert_eq!(err.to_string(), "the att EUC request 1003 does not exist");
    }

    #[test]
    fn update_replaces_with_value_wrapper() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract.update_euc_request("1001", "withdrawn").unwrap();
        assert_eq!(
            contract.read_euc_request("1001").unwrap(),
            Payload::from(ReportPayload::new("withdrawn"))
        );
    }

    #[test]
    fn approve_moves_request_out_of_open_set() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract.approve_euc_request("1001").unwrap();

        let open: Vec<_> = contract
            .open_euc_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(open, vec!["1002"]);

        let approved = contract.euc_requests_with_state(true).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].key, "1001");
    }

    #[test]
    fn approve_rejects_non_request_documents() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract.update_euc_request("1001", "withdrawn").unwrap();
        assert!(matches!(
            contract.approve_euc_request("1001"),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            contract.approve_euc_request("1003"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_euc_request() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract.delete_euc_request("1001").unwrap();
        assert!(!contract.artifact_exists("1001").unwrap());
        assert!(matches!(
            contract.delete_euc_request("1001"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn query_artifacts_by_requestor() {
        let ledger = seeded();
        let records = ComplianceContract::new(&ledger)
            .query_artifacts(r#"{"selector":{"requestor":"de"}}"#)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "1002");
    }

    #[test]
    fn history_for_artifact_tracks_approval() {
        let ledger = seeded();
        let contract = ComplianceContract::new(&ledger);
        contract.approve_euc_request("1002").unwrap();
        let history = contract.history_for_artifact("1002").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            history[1].value.as_json().unwrap()["isApproved"],
            json!(true)
        );
    }
}
