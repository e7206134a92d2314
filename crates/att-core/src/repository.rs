use att_state::StateStore;
use att_types::{Payload, TxId};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Existence-gated CRUD over a single-key JSON document store.
///
/// Mutations read the key once to check existence and then write at most
/// once. Nothing is retried; the store serializes concurrent writers.
pub struct AssetRepository<'s, S: ?Sized> {
    store: &'s S,
    kind: &'static str,
}

impl<'s, S: StateStore + ?Sized> AssetRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            kind: "asset",
        }
    }

    /// Name used for the asset in error messages, e.g. `"att report"`.
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// `true` iff the store holds a non-empty value for `key`.
    pub fn exists(&self, key: &str) -> CoreResult<bool> {
        Ok(self.load(key)?.is_some())
    }

    pub fn create(&self, key: &str, payload: &Payload) -> CoreResult<TxId> {
        if self.exists(key)? {
            return Err(CoreError::AlreadyExists {
                kind: self.kind,
                key: key.to_string(),
            });
        }
        let tx_id = self.store.put_state(key, &encode(payload)?)?;
        debug!(kind = self.kind, key, tx = %tx_id, "asset created");
        Ok(tx_id)
    }

    pub fn read(&self, key: &str) -> CoreResult<Payload> {
        let bytes = self.read_raw(key)?;
        Payload::from_slice(&bytes).map_err(|source| CoreError::MalformedData {
            kind: self.kind,
            key: key.to_string(),
            source,
        })
    }

    /// Stored bytes, undecoded.
    pub fn read_raw(&self, key: &str) -> CoreResult<Vec<u8>> {
        self.load(key)?.ok_or_else(|| self.not_found(key))
    }

    /// Replace the whole value. There is no merge.
    pub fn update(&self, key: &str, payload: &Payload) -> CoreResult<TxId> {
        if !self.exists(key)? {
            return Err(self.not_found(key));
        }
        let tx_id = self.store.put_state(key, &encode(payload)?)?;
        debug!(kind = self.kind, key, tx = %tx_id, "asset updated");
        Ok(tx_id)
    }

    pub fn delete(&self, key: &str) -> CoreResult<TxId> {
        if !self.exists(key)? {
            return Err(self.not_found(key));
        }
        let tx_id = self
            .store
            .delete_state(key)?
            .ok_or_else(|| self.not_found(key))?;
        debug!(kind = self.kind, key, tx = %tx_id, "asset deleted");
        Ok(tx_id)
    }

    fn load(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        Ok(self
            .store
            .get_state(key)?
            .filter(|bytes| !bytes.is_empty()))
    }

    fn not_found(&self, key: &str) -> CoreError {
        CoreError::NotFound {
            kind: self.kind,
            key: key.to_string(),
        }
    }
}

fn encode(payload: &Payload) -> CoreResult<Vec<u8>> {
    payload
        .to_vec()
        .map_err(|e| CoreError::Serialization(e.to_string()))
}
