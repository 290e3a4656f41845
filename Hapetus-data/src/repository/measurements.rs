use async_trait::async_trait;
use rusqlite::Connection;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{DailyMeasurementRecord, ExerciseMeasurementRecord, UserSettingsRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for daily measurements
#[async_trait]
pub trait DailyMeasurementRepositoryTrait: Send + Sync {
    /// Persist a new measurement
    async fn create(&self, record: DailyMeasurementRecord) -> Result<DailyMeasurementRecord, RepositoryError>;

    /// Get a measurement by id
    async fn get_by_id(&self, id: &str) -> Result<Option<DailyMeasurementRecord>, RepositoryError>;

    /// All measurements of a user, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<DailyMeasurementRecord>, RepositoryError>;

    /// Measurements of a user taken in `[start, end]` (Unix seconds), oldest first
    async fn list_for_user_between(
        &self,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<DailyMeasurementRecord>, RepositoryError>;

    /// Overwrite an existing measurement
    async fn update(&self, record: DailyMeasurementRecord) -> Result<(), RepositoryError>;

    /// Delete a measurement, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository trait for exercise measurements
#[async_trait]
pub trait ExerciseMeasurementRepositoryTrait: Send + Sync {
    async fn create(&self, record: ExerciseMeasurementRecord) -> Result<ExerciseMeasurementRecord, RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<ExerciseMeasurementRecord>, RepositoryError>;

    /// All exercise measurements of a user, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExerciseMeasurementRecord>, RepositoryError>;

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository trait for user settings
#[async_trait]
pub trait UserSettingsRepositoryTrait: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserSettingsRecord>, RepositoryError>;

    async fn upsert(&self, record: UserSettingsRecord) -> Result<UserSettingsRecord, RepositoryError>;
}

#[derive(Debug, Clone)]
enum Backend {
    Database(DatabasePool),
    InMemory(InMemoryStorage),
}

/// Repository for measurements and settings.
///
/// Backed by SQLite when constructed with a pool, otherwise by process memory.
#[derive(Debug, Clone)]
pub struct MeasurementRepository {
    backend: Backend,
}

impl MeasurementRepository {
    /// Repository backed by the given SQLite pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            backend: Backend::Database(pool),
        }
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::InMemory(InMemoryStorage::new()),
        }
    }

    /// Name of the active backend, for logging and health reports
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Database(_) => "sqlite",
            Backend::InMemory(_) => "memory",
        }
    }

    /// The SQLite pool, if this repository uses one
    pub fn pool(&self) -> Option<&DatabasePool> {
        match &self.backend {
            Backend::Database(pool) => Some(pool),
            Backend::InMemory(_) => None,
        }
    }
}

/// Run a blocking SQLite operation off the async executor
async fn with_connection<T, F>(pool: &DatabasePool, op: F) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        op(&conn)
    })
    .await?
}

#[async_trait]
impl DailyMeasurementRepositoryTrait for MeasurementRepository {
    async fn create(&self, record: DailyMeasurementRecord) -> Result<DailyMeasurementRecord, RepositoryError> {
        debug!("Creating daily measurement {} for user {}", record.id, record.user_id);
        match &self.backend {
            Backend::Database(pool) => {
                let stored = record.clone();
                with_connection(pool, move |conn| DatabaseStorage::insert_daily(conn, &stored)).await?;
            }
            Backend::InMemory(storage) => storage.insert_daily(&record)?,
        }
        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<DailyMeasurementRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let id = id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::get_daily(conn, &id)).await
            }
            Backend::InMemory(storage) => storage.get_daily(id),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let user_id = user_id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::list_daily(conn, &user_id)).await
            }
            Backend::InMemory(storage) => storage.list_daily(user_id),
        }
    }

    async fn list_for_user_between(
        &self,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let user_id = user_id.to_string();
                with_connection(pool, move |conn| {
                    DatabaseStorage::list_daily_between(conn, &user_id, start, end)
                })
                .await
            }
            Backend::InMemory(storage) => storage.list_daily_between(user_id, start, end),
        }
    }

    async fn update(&self, record: DailyMeasurementRecord) -> Result<(), RepositoryError> {
        let id = record.id.clone();
        let found = match &self.backend {
            Backend::Database(pool) => {
                with_connection(pool, move |conn| DatabaseStorage::update_daily(conn, &record)).await?
            }
            Backend::InMemory(storage) => storage.update_daily(&record)?,
        };

        if found {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(id))
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let id = id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::delete_daily(conn, &id)).await
            }
            Backend::InMemory(storage) => storage.delete_daily(id),
        }
    }
}

#[async_trait]
impl ExerciseMeasurementRepositoryTrait for MeasurementRepository {
    async fn create(&self, record: ExerciseMeasurementRecord) -> Result<ExerciseMeasurementRecord, RepositoryError> {
        debug!("Creating exercise measurement {} for user {}", record.id, record.user_id);
        match &self.backend {
            Backend::Database(pool) => {
                let stored = record.clone();
                with_connection(pool, move |conn| DatabaseStorage::insert_exercise(conn, &stored)).await?;
            }
            Backend::InMemory(storage) => storage.insert_exercise(&record)?,
        }
        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ExerciseMeasurementRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let id = id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::get_exercise(conn, &id)).await
            }
            Backend::InMemory(storage) => storage.get_exercise(id),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExerciseMeasurementRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let user_id = user_id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::list_exercise(conn, &user_id)).await
            }
            Backend::InMemory(storage) => storage.list_exercise(user_id),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let id = id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::delete_exercise(conn, &id)).await
            }
            Backend::InMemory(storage) => storage.delete_exercise(id),
        }
    }
}

#[async_trait]
impl UserSettingsRepositoryTrait for MeasurementRepository {
    async fn get(&self, user_id: &str) -> Result<Option<UserSettingsRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let user_id = user_id.to_string();
                with_connection(pool, move |conn| DatabaseStorage::get_settings(conn, &user_id)).await
            }
            Backend::InMemory(storage) => storage.get_settings(user_id),
        }
    }

    async fn upsert(&self, record: UserSettingsRecord) -> Result<UserSettingsRecord, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let stored = record.clone();
                with_connection(pool, move |conn| DatabaseStorage::upsert_settings(conn, &stored)).await?;
            }
            Backend::InMemory(storage) => storage.upsert_settings(&record)?,
        }
        Ok(record)
    }
}
