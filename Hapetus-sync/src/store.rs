use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::SyncError;
use crate::record::{LocalId, SyncRecord};
use crate::session::Session;

/// Device-local storage for one record type
#[async_trait]
pub trait LocalStore<R: SyncRecord>: Send + Sync {
    /// Store a new record and return the id the store assigned
    async fn insert(&self, record: R) -> Result<LocalId, SyncError>;

    /// Replace the record with the same local id
    async fn update(&self, record: &R) -> Result<(), SyncError>;

    async fn delete(&self, local_id: LocalId) -> Result<(), SyncError>;

    async fn get_by_id(&self, local_id: LocalId) -> Result<Option<R>, SyncError>;

    async fn get_all(&self) -> Result<Vec<R>, SyncError>;

    async fn get_by_server_id(&self, server_id: &str) -> Result<Option<R>, SyncError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|record| record.server_id() == Some(server_id)))
    }
}

/// The server side of a record type, always called on behalf of a session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore<R: SyncRecord>: Send + Sync {
    async fn list(&self, session: &Session) -> Result<Vec<R>, SyncError>;

    /// Create the record remotely and return the server's copy
    async fn create(&self, session: &Session, record: &R) -> Result<R, SyncError>;

    async fn update(&self, session: &Session, record: &R) -> Result<(), SyncError>;

    async fn delete(&self, session: &Session, server_id: &str) -> Result<(), SyncError>;
}

/// Local store kept in process memory
pub struct InMemoryLocalStore<R> {
    inner: Mutex<Inner<R>>,
}

struct Inner<R> {
    records: BTreeMap<LocalId, R>,
    next_id: LocalId,
}

impl<R> Default for InMemoryLocalStore<R> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<R> InMemoryLocalStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<R: SyncRecord> LocalStore<R> for InMemoryLocalStore<R> {
    async fn insert(&self, mut record: R) -> Result<LocalId, SyncError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        record.set_local_id(id);
        inner.records.insert(id, record);
        Ok(id)
    }

    async fn update(&self, record: &R) -> Result<(), SyncError> {
        let id = record
            .local_id()
            .ok_or_else(|| SyncError::Local("record has no local id".to_string()))?;

        let mut inner = self.inner.lock().await;
        match inner.records.get_mut(&id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(SyncError::Local(format!("no local record {}", id))),
        }
    }

    async fn delete(&self, local_id: LocalId) -> Result<(), SyncError> {
        self.inner.lock().await.records.remove(&local_id);
        Ok(())
    }

    async fn get_by_id(&self, local_id: LocalId) -> Result<Option<R>, SyncError> {
        Ok(self.inner.lock().await.records.get(&local_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<R>, SyncError> {
        Ok(self.inner.lock().await.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LocalDailyMeasurement;

    fn reading() -> LocalDailyMeasurement {
        LocalDailyMeasurement::new(Some(97), Some(70), None, None, 1_700_000_000)
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = InMemoryLocalStore::new();
        let first = store.insert(reading()).await.unwrap();
        let second = store.insert(reading()).await.unwrap();
        store.delete(second).await.unwrap();
        let third = store.insert(reading()).await.unwrap();

        assert!(first < second && second < third);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_and_lookup_by_server_id() {
        let store = InMemoryLocalStore::new();
        let id = store.insert(reading()).await.unwrap();

        let mut record = store.get_by_id(id).await.unwrap().unwrap();
        record.mark_synced("srv-9".to_string());
        store.update(&record).await.unwrap();

        let found = store.get_by_server_id("srv-9").await.unwrap().unwrap();
        assert_eq!(found.local_id(), Some(id));
        assert!(store.get_by_server_id("srv-0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_of_unknown_record_fails() {
        let store = InMemoryLocalStore::<LocalDailyMeasurement>::new();
        assert!(matches!(store.update(&reading()).await, Err(SyncError::Local(_))));

        let mut ghost = reading();
        ghost.set_local_id(42);
        assert!(matches!(store.update(&ghost).await, Err(SyncError::Local(_))));
    }
}
