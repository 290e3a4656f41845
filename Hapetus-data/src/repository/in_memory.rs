use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{DailyMeasurementRecord, ExerciseMeasurementRecord, UserSettingsRecord};
use super::errors::RepositoryError;

/// In-memory storage used when no database is configured and by tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    daily: Arc<Mutex<HashMap<String, DailyMeasurementRecord>>>,
    exercise: Arc<Mutex<HashMap<String, ExerciseMeasurementRecord>>>,
    settings: Arc<Mutex<HashMap<String, UserSettingsRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_daily(&self, record: &DailyMeasurementRecord) -> Result<(), RepositoryError> {
        let mut store = self.daily.lock()?;
        if store.contains_key(&record.id) {
            return Err(RepositoryError::Validation(format!(
                "duplicate measurement id {}",
                record.id
            )));
        }
        store.insert(record.id.clone(), record.clone());
        Ok(())
    }

    pub fn get_daily(&self, id: &str) -> Result<Option<DailyMeasurementRecord>, RepositoryError> {
        let store = self.daily.lock()?;
        Ok(store.get(id).cloned())
    }

    pub fn list_daily(&self, user_id: &str) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        let store = self.daily.lock()?;
        let mut records: Vec<DailyMeasurementRecord> = store
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
        Ok(records)
    }

    pub fn list_daily_between(
        &self,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        let store = self.daily.lock()?;
        let mut records: Vec<DailyMeasurementRecord> = store
            .values()
            .filter(|r| r.user_id == user_id && r.measured_at >= start && r.measured_at <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.measured_at);
        Ok(records)
    }

    pub fn update_daily(&self, record: &DailyMeasurementRecord) -> Result<bool, RepositoryError> {
        let mut store = self.daily.lock()?;
        match store.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete_daily(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.daily.lock()?;
        Ok(store.remove(id).is_some())
    }

    pub fn insert_exercise(&self, record: &ExerciseMeasurementRecord) -> Result<(), RepositoryError> {
        let mut store = self.exercise.lock()?;
        if store.contains_key(&record.id) {
            return Err(RepositoryError::Validation(format!(
                "duplicate exercise measurement id {}",
                record.id
            )));
        }
        store.insert(record.id.clone(), record.clone());
        Ok(())
    }

    pub fn get_exercise(&self, id: &str) -> Result<Option<ExerciseMeasurementRecord>, RepositoryError> {
        let store = self.exercise.lock()?;
        Ok(store.get(id).cloned())
    }

    pub fn list_exercise(&self, user_id: &str) -> Result<Vec<ExerciseMeasurementRecord>, RepositoryError> {
        let store = self.exercise.lock()?;
        let mut records: Vec<ExerciseMeasurementRecord> = store
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
        Ok(records)
    }

    pub fn delete_exercise(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.exercise.lock()?;
        Ok(store.remove(id).is_some())
    }

    pub fn get_settings(&self, user_id: &str) -> Result<Option<UserSettingsRecord>, RepositoryError> {
        let store = self.settings.lock()?;
        Ok(store.get(user_id).cloned())
    }

    pub fn upsert_settings(&self, record: &UserSettingsRecord) -> Result<(), RepositoryError> {
        let mut store = self.settings.lock()?;
        store.insert(record.user_id.clone(), record.clone());
        Ok(())
    }
}
