use att_state::StateStore;
use att_types::{Payload, ReportPayload, TxId};

use crate::error::CoreResult;
use crate::repository::AssetRepository;

const KIND: &str = "att report";

/// ATT reports keyed by report id.
pub struct ReportContract<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: StateStore + ?Sized> ReportContract<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn reports(&self) -> AssetRepository<'s, S> {
        AssetRepository::new(self.store).with_kind(KIND)
    }

    pub fn report_exists(&self, report_id: &str) -> CoreResult<bool> {
        self.reports().exists(report_id)
    }

    pub fn create_report(&self, report_id: &str, value: &str) -> CoreResult<TxId> {
        self.reports()
            .create(report_id, &ReportPayload::new(value).into())
    }

    pub fn read_report(&self, report_id: &str) -> CoreResult<Payload> {
        self.reports().read(report_id)
    }

    pub fn update_report(&self, report_id: &str, new_value: &str) -> CoreResult<TxId> {
        self.reports()
            .update(report_id, &ReportPayload::new(new_value).into())
    }

    pub fn delete_report(&self, report_id: &str) -> CoreResult<TxId> {
        self.reports().delete(report_id)
    }
}
