use att_state::StateStore;
use tracing::debug;

use crate::aggregator::{drain, History};
use crate::error::{CoreError, CoreResult};
use crate::record::HistoryRecord;

/// Change history of a single key, in the order the store delivers it.
pub struct HistoryService<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: StateStore + ?Sized> HistoryService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn history_of(&self, key: &str) -> CoreResult<Vec<HistoryRecord>> {
        if key.is_empty() {
            return Err(CoreError::InvalidArgument(
                "history key must not be empty".into(),
            ));
        }
        debug!(key, "fetching key history");
        let iterator = self.store.history_for_key(key)?;
        drain(iterator, History)
    }
}
