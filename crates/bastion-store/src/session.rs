//! In-memory implementation of [`SessionStore`].

use std::collections::HashMap;
use std::sync::Arc;

use bastion_core::error::BastionResult;
use bastion_core::repository::SessionStore;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

type Record = HashMap<String, Value>;

/// Shared storage for every session record, keyed by session id.
#[derive(Clone, Default)]
pub struct MemorySessionBackend {
    records: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a handle on the session `id`.
    ///
    /// An unknown or absent id starts a fresh session under a new id, so
    /// a client cannot pick its own identifier.
    pub fn open(&self, id: Option<&str>) -> MemorySessionStore {
        let id = match id {
            Some(id) if self.records.read().contains_key(id) => id.to_string(),
            _ => new_session_id(),
        };
        MemorySessionStore {
            backend: self.clone(),
            id: RwLock::new(id),
        }
    }

    /// Number of stored session records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Request-scoped handle onto one record of a [`MemorySessionBackend`].
pub struct MemorySessionStore {
    backend: MemorySessionBackend,
    id: RwLock<String>,
}

impl SessionStore for MemorySessionStore {
    async fn session_id(&self) -> BastionResult<String> {
        Ok(self.id.read().clone())
    }

    async fn get(&self, key: &str) -> BastionResult<Option<Value>> {
        let id = self.id.read();
        let records = self.backend.records.read();
        Ok(records.get(id.as_str()).and_then(|r| r.get(key)).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> BastionResult<()> {
        let id = self.id.read();
        self.backend
            .records
            .write()
            .entry(id.clone())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn take(&self, key: &str) -> BastionResult<Option<Value>> {
        let id = self.id.read();
        let mut records = self.backend.records.write();
        Ok(records.get_mut(id.as_str()).and_then(|r| r.remove(key)))
    }

    async fn regenerate_id(&self) -> BastionResult<()> {
        let mut id = self.id.write();
        let new_id = new_session_id();
        let mut records = self.backend.records.write();
        if let Some(record) = records.remove(id.as_str()) {
            records.insert(new_id.clone(), record);
        }
        debug!(old_id = %id, new_id = %new_id, "Regenerated session id");
        *id = new_id;
        Ok(())
    }

    /// Remove the record and retire its id; later writes start a new one.
    async fn destroy(&self) -> BastionResult<()> {
        let mut id = self.id.write();
        self.backend.records.write().remove(id.as_str());
        let new_id = new_session_id();
        debug!(old_id = %id, new_id = %new_id, "Destroyed session");
        *id = new_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_id_starts_fresh_session() {
        let backend = MemorySessionBackend::new();
        let store = backend.open(Some("attacker-chosen"));
        assert_ne!(store.session_id().await.unwrap(), "attacker-chosen");
    }

    #[tokio::test]
    async fn record_is_created_on_first_write() {
        let backend = MemorySessionBackend::new();
        let store = backend.open(None);
        assert!(backend.is_empty());
        store.set("k", json!(1)).await.unwrap();
        assert_eq!(backend.len(), 1);
        assert!(backend.contains(&store.session_id().await.unwrap()));
    }
}
