use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::error::SyncError;
use crate::record::{LocalDailyMeasurement, LocalExerciseMeasurement, LocalId, SyncRecord};
use crate::retry::RetryPolicy;
use crate::session::{Session, SessionProvider};
use crate::status::SyncStatus;
use crate::store::{LocalStore, RemoteStore};

pub type DailyReconciler = SyncReconciler<LocalDailyMeasurement>;
pub type ExerciseReconciler = SyncReconciler<LocalExerciseMeasurement>;

/// Counts from one [`SyncReconciler::push_pending`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Keeps the local store of one record type converged with the server.
///
/// Every local mutation made here goes through a single write lane, so a
/// pull can never interleave with an insert, edit or delete. The lane is not
/// held across network calls; results are applied to the stored record once
/// they arrive. Server ids of
/// records deleted locally stay tombstoned until the remote delete lands and
/// are skipped by pulls in the meantime.
pub struct SyncReconciler<R: SyncRecord> {
    local: Arc<dyn LocalStore<R>>,
    remote: Arc<dyn RemoteStore<R>>,
    sessions: Arc<dyn SessionProvider>,
    write_lane: Mutex<()>,
    tombstones: Mutex<HashSet<String>>,
    in_flight: Mutex<HashSet<LocalId>>,
    pending: AtomicUsize,
    status: watch::Sender<SyncStatus>,
}

impl<R: SyncRecord> SyncReconciler<R> {
    pub fn new(
        local: Arc<dyn LocalStore<R>>,
        remote: Arc<dyn RemoteStore<R>>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            local,
            remote,
            sessions,
            write_lane: Mutex::new(()),
            tombstones: Mutex::new(HashSet::new()),
            in_flight: Mutex::new(HashSet::new()),
            pending: AtomicUsize::new(0),
            status,
        }
    }

    /// Subscribe to pull status changes
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn current_status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Remote pushes that failed since the last [`Self::push_pending`]
    pub fn pending_pushes(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    /// Server ids deleted locally whose remote delete has not landed yet
    pub async fn tombstones(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tombstones.lock().await.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn set_status(&self, status: SyncStatus) {
        self.status.send_replace(status);
    }

    fn defer(&self, operation: &str, err: &SyncError) {
        warn!("{} {} deferred: {}", R::resource(), operation, err);
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Save a new record locally, then try once to create it on the server.
    ///
    /// Remote failures never reach the caller; the record stays unsynced and
    /// is picked up by [`Self::push_pending`]. Only invalid input and local
    /// store errors are returned. The write lane is released while the
    /// request is in flight.
    #[instrument(skip(self, record), fields(resource = R::resource()))]
    pub async fn insert_and_push(&self, mut record: R) -> Result<LocalId, SyncError> {
        record.validate()?;

        let local_id = {
            let _lane = self.write_lane.lock().await;
            let local_id = self.local.insert(record.clone()).await?;
            record.set_local_id(local_id);
            local_id
        };
        debug!("Stored {} locally as {}", R::resource(), local_id);

        let Some(session) = self.sessions.current_session().await else {
            self.defer("create", &SyncError::NotAuthenticated);
            return Ok(local_id);
        };

        if let Err(err) = self.create_remote(&session, &record).await {
            self.defer("create", &err);
        }
        Ok(local_id)
    }

    /// POST `sent` and attach the returned server id to the stored record.
    /// Concurrent creates of the same local record are refused.
    async fn create_remote(&self, session: &Session, sent: &R) -> Result<(), SyncError> {
        let local_id = sent
            .local_id()
            .ok_or_else(|| SyncError::Local("record has no local id".to_string()))?;
        if !self.in_flight.lock().await.insert(local_id) {
            return Err(SyncError::Local(format!("create of {} already in flight", local_id)));
        }

        let result = match self.remote.create(session, sent).await {
            Ok(created) => match created.server_id() {
                Some(server_id) => {
                    let _lane = self.write_lane.lock().await;
                    self.confirm_synced(sent, server_id.to_string()).await
                }
                None => Err(SyncError::Decode("server returned no id".to_string())),
            },
            Err(err) => Err(err),
        };

        self.in_flight.lock().await.remove(&local_id);
        result
    }

    /// Record that the server now holds `sent` under `server_id`. A stored
    /// record edited while the request was in flight keeps its server id but
    /// stays unsynced. Caller must hold the write lane.
    async fn confirm_synced(&self, sent: &R, server_id: String) -> Result<(), SyncError> {
        let local_id = sent
            .local_id()
            .ok_or_else(|| SyncError::Local("record has no local id".to_string()))?;

        let Some(mut stored) = self.local.get_by_id(local_id).await? else {
            // Deleted locally in the meantime; the remote copy must go too
            self.tombstones.lock().await.insert(server_id);
            return Err(SyncError::Local(format!("record {} was deleted while syncing", local_id)));
        };

        let unchanged = stored == *sent;
        stored.mark_synced(server_id);
        if !unchanged {
            stored.mark_dirty();
        }
        self.local.update(&stored).await
    }

    /// Apply a correction locally, then try once to send it to the server.
    ///
    /// The stored record's identity wins over the caller's copy, so a copy
    /// taken before the server id was attached still updates the server row.
    #[instrument(skip(self, record), fields(resource = R::resource()))]
    pub async fn update_and_push(&self, mut record: R) -> Result<(), SyncError> {
        if !R::supports_remote_update() {
            return Err(SyncError::Unsupported("editing"));
        }
        record.validate()?;
        let local_id = record
            .local_id()
            .ok_or_else(|| SyncError::Local("record has no local id".to_string()))?;

        {
            let _lane = self.write_lane.lock().await;
            let stored = self
                .local
                .get_by_id(local_id)
                .await?
                .ok_or_else(|| SyncError::Local(format!("no local record {}", local_id)))?;
            if let Some(server_id) = stored.server_id() {
                record.mark_synced(server_id.to_string());
            }
            record.mark_dirty();
            self.local.update(&record).await?;
        }

        let Some(server_id) = record.server_id().map(str::to_owned) else {
            // Never reached the server; push_pending will create it
            self.pending.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };
        let Some(session) = self.sessions.current_session().await else {
            self.defer("update", &SyncError::NotAuthenticated);
            return Ok(());
        };

        let result = match self.remote.update(&session, &record).await {
            Ok(()) => {
                let _lane = self.write_lane.lock().await;
                self.confirm_synced(&record, server_id).await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.defer("update", &err);
        }
        Ok(())
    }

    /// Delete locally, then try once to delete on the server.
    ///
    /// A local failure is returned and nothing else happens. A remote failure
    /// leaves a tombstone so that pulls do not bring the record back. The
    /// server id is taken from the stored record when it has one.
    #[instrument(skip(self, record), fields(resource = R::resource()))]
    pub async fn delete(&self, record: &R) -> Result<(), SyncError> {
        let local_id = record
            .local_id()
            .ok_or_else(|| SyncError::Local("record has no local id".to_string()))?;

        let server_id = {
            let _lane = self.write_lane.lock().await;
            let server_id = self
                .local
                .get_by_id(local_id)
                .await?
                .and_then(|stored| stored.server_id().map(str::to_owned))
                .or_else(|| record.server_id().map(str::to_owned));

            self.local.delete(local_id).await?;
            if let Some(id) = &server_id {
                self.tombstones.lock().await.insert(id.clone());
            }
            server_id
        };
        debug!("Deleted {} {} locally", R::resource(), local_id);

        let Some(server_id) = server_id else {
            return Ok(());
        };
        let Some(session) = self.sessions.current_session().await else {
            self.defer("delete", &SyncError::NotAuthenticated);
            return Ok(());
        };

        match self.remote.delete(&session, &server_id).await {
            Ok(()) => {
                self.tombstones.lock().await.remove(&server_id);
            }
            Err(err) if err.is_not_found() => {
                self.tombstones.lock().await.remove(&server_id);
            }
            Err(err) => self.defer("delete", &err),
        }
        Ok(())
    }

    /// Fetch the server's records and merge them into the local store.
    ///
    /// Matching records are overwritten by the server copy unless they carry
    /// local changes that have not been pushed yet. Unknown records are
    /// inserted. A failing record is logged and skipped; only a failed list
    /// fetch fails the pull.
    #[instrument(skip(self), fields(resource = R::resource()))]
    pub async fn pull_and_merge(&self) -> Result<(), SyncError> {
        let Some(session) = self.sessions.current_session().await else {
            self.set_status(SyncStatus::failed(SyncError::NotAuthenticated.to_string()));
            return Err(SyncError::NotAuthenticated);
        };

        self.set_status(SyncStatus::Syncing);

        let remote_records = match self.remote.list(&session).await {
            Ok(records) => records,
            Err(err) => {
                warn!("Pulling {} failed: {}", R::resource(), err);
                self.set_status(SyncStatus::failed(err.to_string()));
                return Err(err);
            }
        };

        let total = remote_records.len();
        let mut merged = 0;
        for record in remote_records {
            match self.merge_one(record).await {
                Ok(true) => merged += 1,
                Ok(false) => {}
                Err(err) => warn!("Skipping {} record during merge: {}", R::resource(), err),
            }
        }

        info!("Merged {} of {} {} records", merged, total, R::resource());
        self.set_status(SyncStatus::succeeded(merged));
        Ok(())
    }

    /// Returns whether the local store changed
    async fn merge_one(&self, mut incoming: R) -> Result<bool, SyncError> {
        let server_id = incoming
            .server_id()
            .map(str::to_owned)
            .ok_or_else(|| SyncError::Decode("remote record has no id".to_string()))?;

        let _lane = self.write_lane.lock().await;
        if self.tombstones.lock().await.contains(&server_id) {
            debug!("{} {} was deleted locally, not restoring it", R::resource(), server_id);
            return Ok(false);
        }

        match self.local.get_by_server_id(&server_id).await? {
            Some(existing) => {
                if !existing.synced_to_server() {
                    debug!("{} {} has unpushed local changes, keeping them", R::resource(), server_id);
                    return Ok(false);
                }
                let local_id = existing
                    .local_id()
                    .ok_or_else(|| SyncError::Local("stored record has no local id".to_string()))?;
                incoming.set_local_id(local_id);
                self.local.update(&incoming).await?;
            }
            None => {
                self.local.insert(incoming).await?;
            }
        }
        Ok(true)
    }

    /// [`Self::pull_and_merge`], retrying failed list fetches with backoff
    pub async fn pull_and_merge_with_retry(&self, policy: &RetryPolicy) -> Result<(), SyncError> {
        let mut attempt = 1;
        loop {
            match self.pull_and_merge().await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.backoff(attempt);
                    warn!("Pull attempt {} failed ({}), retrying in {:?}", attempt, err, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Retry every remote change that has not landed yet: creations of
    /// records without a server id, corrections not yet sent, and deletions
    /// still tombstoned.
    #[instrument(skip(self), fields(resource = R::resource()))]
    pub async fn push_pending(&self) -> Result<PushReport, SyncError> {
        let session = self
            .sessions
            .current_session()
            .await
            .ok_or(SyncError::NotAuthenticated)?;

        let mut report = PushReport::default();

        let unsynced: Vec<LocalId> = self
            .local
            .get_all()
            .await?
            .into_iter()
            .filter(|record| !record.synced_to_server())
            .filter_map(|record| record.local_id())
            .collect();

        for local_id in unsynced {
            self.push_one(&session, local_id, &mut report).await;
        }

        let tombstoned: Vec<String> = self.tombstones.lock().await.iter().cloned().collect();
        for server_id in tombstoned {
            match self.remote.delete(&session, &server_id).await {
                Ok(()) => {
                    self.tombstones.lock().await.remove(&server_id);
                    report.deleted += 1;
                }
                Err(err) if err.is_not_found() => {
                    self.tombstones.lock().await.remove(&server_id);
                    report.deleted += 1;
                }
                Err(err) => {
                    warn!("Remote delete of {} still failing: {}", server_id, err);
                    report.failed += 1;
                }
            }
        }

        self.pending.store(report.failed, Ordering::Relaxed);
        info!(
            "Pushed pending {} changes: {} created, {} updated, {} deleted, {} failed",
            R::resource(),
            report.created,
            report.updated,
            report.deleted,
            report.failed
        );
        Ok(report)
    }

    async fn push_one(&self, session: &Session, local_id: LocalId, report: &mut PushReport) {
        // Re-read under the lane; the record may have changed or gone
        let loaded = {
            let _lane = self.write_lane.lock().await;
            self.local.get_by_id(local_id).await
        };
        let record = match loaded {
            Ok(Some(record)) if !record.synced_to_server() => record,
            Ok(_) => return,
            Err(err) => {
                warn!("Could not load {} {}: {}", R::resource(), local_id, err);
                report.failed += 1;
                return;
            }
        };

        match record.server_id().map(str::to_owned) {
            None => match self.create_remote(session, &record).await {
                Ok(()) => report.created += 1,
                Err(err) => {
                    debug!("Create of {} {} still failing: {}", R::resource(), local_id, err);
                    report.failed += 1;
                }
            },
            Some(server_id) if R::supports_remote_update() => {
                let result = match self.remote.update(session, &record).await {
                    Ok(()) => {
                        let _lane = self.write_lane.lock().await;
                        self.confirm_synced(&record, server_id).await
                    }
                    Err(err) => Err(err),
                };
                match result {
                    Ok(()) => report.updated += 1,
                    Err(err) => {
                        debug!("Update of {} {} still failing: {}", R::resource(), local_id, err);
                        report.failed += 1;
                    }
                }
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::record::ExerciseReading;
    use crate::session::SharedSession;
    use crate::store::{InMemoryLocalStore, MockRemoteStore};

    const MEASURED_AT: i64 = 1_700_000_000;

    fn reading(spo2: i32, heart_rate: i32) -> LocalDailyMeasurement {
        LocalDailyMeasurement::new(Some(spo2), Some(heart_rate), None, None, MEASURED_AT)
    }

    fn from_server(id: &str, spo2: i32, heart_rate: i32) -> LocalDailyMeasurement {
        let mut record = reading(spo2, heart_rate);
        record.mark_synced(id.to_string());
        record
    }

    fn signed_in() -> Arc<SharedSession> {
        Arc::new(SharedSession::signed_in(Session::new("user-1", "token")))
    }

    fn reconciler(
        local: Arc<InMemoryLocalStore<LocalDailyMeasurement>>,
        remote: MockRemoteStore<LocalDailyMeasurement>,
        sessions: Arc<SharedSession>,
    ) -> DailyReconciler {
        SyncReconciler::new(local, Arc::new(remote), sessions)
    }

    fn offline() -> SyncError {
        SyncError::Transport("network unreachable".to_string())
    }

    #[tokio::test]
    async fn test_insert_returns_local_id_when_remote_create_fails() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::new();
        remote.expect_create().times(1).returning(|_, _| Err(offline()));

        let sync = reconciler(local.clone(), remote, signed_in());
        let id = sync.insert_and_push(reading(97, 70)).await.unwrap();

        let stored = local.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.local_id, Some(id));
        assert!(!stored.synced_to_server);
        assert_eq!(sync.pending_pushes(), 1);
    }

    #[tokio::test]
    async fn test_insert_attaches_server_id() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::new();
        remote.expect_create().times(1).returning(|_, record: &LocalDailyMeasurement| {
            assert_eq!(record.to_wire().local_id, Some(1));
            let mut created = record.clone();
            created.local_id = None;
            created.mark_synced("srv-1".to_string());
            Ok(created)
        });

        let sync = reconciler(local.clone(), remote, signed_in());
        let id = sync.insert_and_push(reading(97, 70)).await.unwrap();

        let stored = local.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.server_id.as_deref(), Some("srv-1"));
        assert!(stored.synced_to_server);
        assert_eq!(sync.pending_pushes(), 0);
    }

    #[tokio::test]
    async fn test_insert_without_session_stays_local() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::new();
        remote.expect_create().never();

        let sync = reconciler(local.clone(), remote, Arc::new(SharedSession::signed_out()));
        sync.insert_and_push(reading(97, 70)).await.unwrap();

        assert_eq!(local.len().await, 1);
        assert_eq!(sync.pending_pushes(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_record_before_storing() {
        let local = Arc::new(InMemoryLocalStore::new());
        let sync = reconciler(local.clone(), MockRemoteStore::new(), signed_in());

        let empty = LocalDailyMeasurement::new(None, None, None, None, MEASURED_AT);
        assert!(matches!(sync.insert_and_push(empty).await, Err(SyncError::Invalid(_))));
        assert!(local.is_empty().await);
    }

    #[tokio::test]
    async fn test_pull_overwrites_matching_record() {
        let local = Arc::new(InMemoryLocalStore::new());
        let id = local.insert(from_server("srv-1", 97, 70)).await.unwrap();

        let mut remote = MockRemoteStore::new();
        remote
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![from_server("srv-1", 93, 88).with_notes("edited on web")]));

        let sync = reconciler(local.clone(), remote, signed_in());
        sync.pull_and_merge().await.unwrap();

        assert_eq!(local.len().await, 1);
        let stored = local.get_by_id(id).await.unwrap().unwrap();
        let mut expected = from_server("srv-1", 93, 88).with_notes("edited on web");
        expected.set_local_id(id);
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_pull_inserts_absent_record() {
        let local = Arc::new(InMemoryLocalStore::new());
        local.insert(from_server("srv-1", 97, 70)).await.unwrap();

        let mut remote = MockRemoteStore::new();
        remote
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![from_server("srv-1", 97, 70), from_server("srv-2", 95, 64)]));

        let sync = reconciler(local.clone(), remote, signed_in());
        sync.pull_and_merge().await.unwrap();

        assert_eq!(local.len().await, 2);
        assert!(local.get_by_server_id("srv-2").await.unwrap().is_some());
        assert!(matches!(sync.current_status(), SyncStatus::Succeeded { merged: 2, .. }));
    }

    #[tokio::test]
    async fn test_pull_without_user_makes_no_remote_call() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::new();
        remote.expect_list().never();

        let sync = reconciler(local, remote, Arc::new(SharedSession::signed_out()));
        let result = sync.pull_and_merge().await;

        assert!(matches!(result, Err(SyncError::NotAuthenticated)));
        assert!(matches!(sync.current_status(), SyncStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_pull_skips_bad_records_and_reports_list_failures() {
        let local = Arc::new(InMemoryLocalStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut remote = MockRemoteStore::new();
        remote.expect_list().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![reading(97, 70), from_server("srv-3", 96, 61)])
            } else {
                Err(SyncError::Http {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        });

        let sync = reconciler(local.clone(), remote, signed_in());
        let mut status = sync.status();

        // The record without a server id is skipped, the other one lands
        sync.pull_and_merge().await.unwrap();
        assert_eq!(local.len().await, 1);
        assert!(matches!(*status.borrow_and_update(), SyncStatus::Succeeded { merged: 1, .. }));

        assert!(sync.pull_and_merge().await.is_err());
        assert!(status.has_changed().unwrap());
        assert!(matches!(*status.borrow_and_update(), SyncStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_local_even_when_remote_fails() {
        let local = Arc::new(InMemoryLocalStore::new());
        let id = local.insert(from_server("srv-1", 97, 70)).await.unwrap();
        let record = local.get_by_id(id).await.unwrap().unwrap();

        let mut remote = MockRemoteStore::new();
        remote.expect_delete().times(1).returning(|_, _| Err(offline()));

        let sync = reconciler(local.clone(), remote, signed_in());
        sync.delete(&record).await.unwrap();

        assert!(local.get_by_id(id).await.unwrap().is_none());
        assert_eq!(sync.tombstones().await, vec!["srv-1".to_string()]);
        assert_eq!(sync.pending_pushes(), 1);
    }

    #[tokio::test]
    async fn test_tombstoned_record_is_not_resurrected() {
        let local = Arc::new(InMemoryLocalStore::new());
        let id = local.insert(from_server("srv-1", 97, 70)).await.unwrap();
        let record = local.get_by_id(id).await.unwrap().unwrap();

        let mut remote = MockRemoteStore::new();
        remote.expect_delete().times(1).returning(|_, _| Err(offline()));
        remote
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![from_server("srv-1", 97, 70)]));

        let sync = reconciler(local.clone(), remote, signed_in());
        sync.delete(&record).await.unwrap();
        sync.pull_and_merge().await.unwrap();

        assert!(local.is_empty().await);
    }

    #[tokio::test]
    async fn test_push_pending_retries_creates_and_deletes() {
        let local = Arc::new(InMemoryLocalStore::new());
        let deleted = local.insert(from_server("srv-old", 97, 70)).await.unwrap();
        let deleted = local.get_by_id(deleted).await.unwrap().unwrap();

        let online = Arc::new(AtomicUsize::new(0));
        let mut remote = MockRemoteStore::new();
        let flag = online.clone();
        remote.expect_create().returning(move |_, record: &LocalDailyMeasurement| {
            if flag.load(Ordering::SeqCst) == 0 {
                return Err(offline());
            }
            let mut created = record.clone();
            created.mark_synced("srv-new".to_string());
            Ok(created)
        });
        let flag = online.clone();
        remote.expect_delete().returning(move |_, _| {
            if flag.load(Ordering::SeqCst) == 0 {
                Err(offline())
            } else {
                Err(SyncError::Http {
                    status: 404,
                    message: "gone".to_string(),
                })
            }
        });

        let sync = reconciler(local.clone(), remote, signed_in());
        let id = sync.insert_and_push(reading(98, 66)).await.unwrap();
        sync.delete(&deleted).await.unwrap();
        assert_eq!(sync.pending_pushes(), 2);

        online.store(1, Ordering::SeqCst);
        let report = sync.push_pending().await.unwrap();

        assert_eq!(
            report,
            PushReport {
                created: 1,
                updated: 0,
                deleted: 1,
                failed: 0
            }
        );
        assert_eq!(sync.pending_pushes(), 0);
        assert!(sync.tombstones().await.is_empty());
        let stored = local.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.server_id.as_deref(), Some("srv-new"));
    }

    /// A remote whose creates succeed once `online` is set, counting calls
    fn flaky_remote(
        online: Arc<AtomicUsize>,
        creates: Arc<AtomicUsize>,
        deletes: Arc<AtomicUsize>,
    ) -> MockRemoteStore<LocalDailyMeasurement> {
        let mut remote = MockRemoteStore::new();
        remote.expect_create().returning(move |_, record: &LocalDailyMeasurement| {
            if online.load(Ordering::SeqCst) == 0 {
                return Err(offline());
            }
            let n = creates.fetch_add(1, Ordering::SeqCst) + 1;
            let mut created = record.clone();
            created.mark_synced(format!("srv-{}", n));
            Ok(created)
        });
        remote.expect_update().returning(|_, _| Ok(()));
        remote.expect_delete().returning(move |_, _| {
            deletes.fetch_add(1, Ordering::SeqCst);
            Err(offline())
        });
        remote
            .expect_list()
            .returning(|_| Ok(vec![from_server("srv-1", 97, 70)]));
        remote
    }

    #[tokio::test]
    async fn test_delete_of_stale_copy_uses_stored_server_id() {
        let local = Arc::new(InMemoryLocalStore::new());
        let online = Arc::new(AtomicUsize::new(0));
        let deletes = Arc::new(AtomicUsize::new(0));
        let remote = flaky_remote(online.clone(), Arc::new(AtomicUsize::new(0)), deletes.clone());
        let sync = reconciler(local.clone(), remote, signed_in());

        let id = sync.insert_and_push(reading(97, 70)).await.unwrap();
        let screen_copy = local.get_by_id(id).await.unwrap().unwrap();
        assert!(screen_copy.server_id.is_none());

        online.store(1, Ordering::SeqCst);
        sync.push_pending().await.unwrap();

        sync.delete(&screen_copy).await.unwrap();
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
        assert_eq!(sync.tombstones().await, vec!["srv-1".to_string()]);

        sync.pull_and_merge().await.unwrap();
        assert!(local.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_of_stale_copy_keeps_server_id() {
        let local = Arc::new(InMemoryLocalStore::new());
        let online = Arc::new(AtomicUsize::new(0));
        let creates = Arc::new(AtomicUsize::new(0));
        let remote = flaky_remote(online.clone(), creates.clone(), Arc::new(AtomicUsize::new(0)));
        let sync = reconciler(local.clone(), remote, signed_in());

        let id = sync.insert_and_push(reading(97, 70)).await.unwrap();
        let mut screen_copy = local.get_by_id(id).await.unwrap().unwrap();

        online.store(1, Ordering::SeqCst);
        sync.push_pending().await.unwrap();

        screen_copy.heart_rate = Some(64);
        sync.update_and_push(screen_copy).await.unwrap();
        let report = sync.push_pending().await.unwrap();

        assert_eq!(creates.load(Ordering::SeqCst), 1);
        assert_eq!(report, PushReport::default());
        let stored = local.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.server_id.as_deref(), Some("srv-1"));
        assert_eq!(stored.heart_rate, Some(64));
        assert!(stored.synced_to_server);
    }

    #[tokio::test]
    async fn test_update_of_deleted_record_fails_locally() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::new();
        remote.expect_update().never();
        let sync = reconciler(local, remote, signed_in());

        let mut ghost = reading(97, 70);
        ghost.set_local_id(7);
        assert!(matches!(sync.update_and_push(ghost).await, Err(SyncError::Local(_))));
    }

    /// Holds every create until released
    #[derive(Default)]
    struct GatedRemote {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RemoteStore<LocalDailyMeasurement> for GatedRemote {
        async fn list(&self, _: &Session) -> Result<Vec<LocalDailyMeasurement>, SyncError> {
            Ok(Vec::new())
        }

        async fn create(&self, _: &Session, record: &LocalDailyMeasurement) -> Result<LocalDailyMeasurement, SyncError> {
            self.entered.notify_one();
            self.release.notified().await;
            let mut created = record.clone();
            created.mark_synced("srv-1".to_string());
            Ok(created)
        }

        async fn update(&self, _: &Session, _: &LocalDailyMeasurement) -> Result<(), SyncError> {
            Ok(())
        }

        async fn delete(&self, _: &Session, _: &str) -> Result<(), SyncError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lane_is_free_while_create_is_in_flight() {
        let local: Arc<InMemoryLocalStore<LocalDailyMeasurement>> = Arc::new(InMemoryLocalStore::new());
        let remote = Arc::new(GatedRemote::default());
        let sync: Arc<DailyReconciler> = Arc::new(SyncReconciler::new(local.clone(), remote.clone(), signed_in()));

        let inserting = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.insert_and_push(reading(97, 70)).await })
        };
        remote.entered.notified().await;

        // Deleting while the create is blocked must not wait for it
        let record = local.get_by_id(1).await.unwrap().unwrap();
        tokio::time::timeout(Duration::from_secs(1), sync.delete(&record))
            .await
            .expect("delete waited for the in-flight create")
            .unwrap();

        remote.release.notify_one();
        assert_eq!(inserting.await.unwrap().unwrap(), 1);

        // The late server id is tombstoned instead of reviving the record
        assert!(local.is_empty().await);
        assert_eq!(sync.tombstones().await, vec!["srv-1".to_string()]);
        assert_eq!(sync.pending_pushes(), 1);
    }

    #[tokio::test]
    async fn test_edit_during_create_stays_unsynced() {
        let local: Arc<InMemoryLocalStore<LocalDailyMeasurement>> = Arc::new(InMemoryLocalStore::new());
        let remote = Arc::new(GatedRemote::default());
        let sync: Arc<DailyReconciler> = Arc::new(SyncReconciler::new(local.clone(), remote.clone(), signed_in()));

        let inserting = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.insert_and_push(reading(97, 70)).await })
        };
        remote.entered.notified().await;

        let mut record = local.get_by_id(1).await.unwrap().unwrap();
        record.heart_rate = Some(64);
        sync.update_and_push(record).await.unwrap();

        remote.release.notify_one();
        inserting.await.unwrap().unwrap();

        let stored = local.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.server_id.as_deref(), Some("srv-1"));
        assert_eq!(stored.heart_rate, Some(64));
        assert!(!stored.synced_to_server);
    }

    #[tokio::test]
    async fn test_unpushed_edit_survives_pull() {
        let local = Arc::new(InMemoryLocalStore::new());
        let id = local.insert(from_server("srv-1", 97, 70)).await.unwrap();

        let mut remote = MockRemoteStore::new();
        remote.expect_update().times(1).returning(|_, _| Err(offline()));
        remote
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![from_server("srv-1", 97, 70)]));

        let sync = reconciler(local.clone(), remote, signed_in());
        let mut edited = local.get_by_id(id).await.unwrap().unwrap();
        edited.heart_rate = Some(64);
        sync.update_and_push(edited).await.unwrap();
        sync.pull_and_merge().await.unwrap();

        let stored = local.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.heart_rate, Some(64));
        assert!(!stored.synced_to_server);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let local = Arc::new(InMemoryLocalStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut remote = MockRemoteStore::new();
        remote.expect_list().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(offline())
            } else {
                Ok(vec![from_server("srv-1", 97, 70)])
            }
        });

        let sync = reconciler(local.clone(), remote, signed_in());
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            multiplier: 2.0,
            max_backoff: Duration::from_millis(5),
        };
        sync.pull_and_merge_with_retry(&policy).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(local.len().await, 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_and_skips_auth_failures() {
        let mut remote = MockRemoteStore::new();
        remote.expect_list().times(2).returning(|_| Err(offline()));

        let sync = reconciler(Arc::new(InMemoryLocalStore::new()), remote, signed_in());
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
            ..RetryPolicy::default()
        };
        assert!(matches!(
            sync.pull_and_merge_with_retry(&policy).await,
            Err(SyncError::Transport(_))
        ));

        let mut remote = MockRemoteStore::new();
        remote.expect_list().never();
        let sync = reconciler(
            Arc::new(InMemoryLocalStore::new()),
            remote,
            Arc::new(SharedSession::signed_out()),
        );
        assert!(matches!(
            sync.pull_and_merge_with_retry(&policy).await,
            Err(SyncError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_exercise_records_cannot_be_edited() {
        let local: Arc<InMemoryLocalStore<LocalExerciseMeasurement>> = Arc::new(InMemoryLocalStore::new());
        let mut remote = MockRemoteStore::<LocalExerciseMeasurement>::new();
        remote.expect_update().never();
        let sync: ExerciseReconciler = SyncReconciler::new(local, Arc::new(remote), signed_in());

        let sample = ExerciseReading {
            spo2: 98,
            heart_rate: 70,
            systolic: None,
            diastolic: None,
        };
        let mut record = LocalExerciseMeasurement::new(sample, sample, "Swim", MEASURED_AT);
        record.set_local_id(1);
        assert!(matches!(
            sync.update_and_push(record).await,
            Err(SyncError::Unsupported(_))
        ));
    }
}
