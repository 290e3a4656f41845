use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use hapetus_domain::entities::dto::{DailyMeasurementDto, ExerciseMeasurementDto};
use hapetus_domain::services::validation::{validate_daily, validate_exercise};

use crate::error::SyncError;

/// Identifier assigned by the local store, monotonic per store
pub type LocalId = i64;

/// A record that can live both in the local store and on the server
pub trait SyncRecord: Clone + PartialEq + Send + Sync + 'static {
    /// Shape exchanged with the server
    type Wire: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Path segment under `/api/`
    fn resource() -> &'static str;

    /// Whether the server accepts corrections to existing records
    fn supports_remote_update() -> bool {
        false
    }

    fn local_id(&self) -> Option<LocalId>;

    fn set_local_id(&mut self, id: LocalId);

    fn server_id(&self) -> Option<&str>;

    fn synced_to_server(&self) -> bool;

    /// Record that the server holds this exact version under `server_id`
    fn mark_synced(&mut self, server_id: String);

    /// Record that the local version has changes the server has not seen
    fn mark_dirty(&mut self);

    /// Check the record against the server's validation rules
    fn validate(&self) -> Result<(), SyncError>;

    fn to_wire(&self) -> Self::Wire;

    /// Build a synced record from a server response. The local id is unset.
    fn from_wire(wire: Self::Wire) -> Self;
}

fn non_empty(id: String) -> Option<String> {
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// A daily measurement as kept on the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDailyMeasurement {
    pub local_id: Option<LocalId>,
    pub server_id: Option<String>,
    pub synced_to_server: bool,
    pub spo2: Option<i32>,
    pub heart_rate: Option<i32>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub notes: Option<String>,
    pub measured_at: i64,
}

impl LocalDailyMeasurement {
    /// A new, unsynced measurement
    pub fn new(
        spo2: Option<i32>,
        heart_rate: Option<i32>,
        systolic: Option<i32>,
        diastolic: Option<i32>,
        measured_at: i64,
    ) -> Self {
        Self {
            local_id: None,
            server_id: None,
            synced_to_server: false,
            spo2,
            heart_rate,
            systolic,
            diastolic,
            notes: None,
            measured_at,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl SyncRecord for LocalDailyMeasurement {
    type Wire = DailyMeasurementDto;

    fn resource() -> &'static str {
        "daily"
    }

    fn supports_remote_update() -> bool {
        true
    }

    fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }

    fn set_local_id(&mut self, id: LocalId) {
        self.local_id = Some(id);
    }

    fn server_id(&self) -> Option<&str> {
        self.server_id.as_deref()
    }

    fn synced_to_server(&self) -> bool {
        self.synced_to_server
    }

    fn mark_synced(&mut self, server_id: String) {
        self.server_id = Some(server_id);
        self.synced_to_server = true;
    }

    fn mark_dirty(&mut self) {
        self.synced_to_server = false;
    }

    fn validate(&self) -> Result<(), SyncError> {
        validate_daily(&self.to_wire())?;
        Ok(())
    }

    fn to_wire(&self) -> DailyMeasurementDto {
        DailyMeasurementDto {
            id: self.server_id.clone().unwrap_or_default(),
            user_id: String::new(),
            spo2: self.spo2,
            heart_rate: self.heart_rate,
            systolic: self.systolic,
            diastolic: self.diastolic,
            notes: self.notes.clone(),
            measured_at: self.measured_at,
            created_at: 0,
            updated_at: 0,
            local_id: self.local_id,
        }
    }

    fn from_wire(wire: DailyMeasurementDto) -> Self {
        let server_id = non_empty(wire.id);
        Self {
            local_id: None,
            synced_to_server: server_id.is_some(),
            server_id,
            spo2: wire.spo2,
            heart_rate: wire.heart_rate,
            systolic: wire.systolic,
            diastolic: wire.diastolic,
            notes: wire.notes,
            measured_at: wire.measured_at,
        }
    }
}

/// Readings taken before or after exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseReading {
    pub spo2: i32,
    pub heart_rate: i32,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
}

/// An exercise measurement as kept on the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExerciseMeasurement {
    pub local_id: Option<LocalId>,
    pub server_id: Option<String>,
    pub synced_to_server: bool,
    pub before: ExerciseReading,
    pub after: ExerciseReading,
    pub exercise_details: String,
    pub notes: Option<String>,
    pub measured_at: i64,
}

impl LocalExerciseMeasurement {
    pub fn new(before: ExerciseReading, after: ExerciseReading, exercise_details: impl Into<String>, measured_at: i64) -> Self {
        Self {
            local_id: None,
            server_id: None,
            synced_to_server: false,
            before,
            after,
            exercise_details: exercise_details.into(),
            notes: None,
            measured_at,
        }
    }
}

impl SyncRecord for LocalExerciseMeasurement {
    type Wire = ExerciseMeasurementDto;

    fn resource() -> &'static str {
        "exercise"
    }

    fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }

    fn set_local_id(&mut self, id: LocalId) {
        self.local_id = Some(id);
    }

    fn server_id(&self) -> Option<&str> {
        self.server_id.as_deref()
    }

    fn synced_to_server(&self) -> bool {
        self.synced_to_server
    }

    fn mark_synced(&mut self, server_id: String) {
        self.server_id = Some(server_id);
        self.synced_to_server = true;
    }

    fn mark_dirty(&mut self) {
        self.synced_to_server = false;
    }

    fn validate(&self) -> Result<(), SyncError> {
        validate_exercise(&self.to_wire())?;
        Ok(())
    }

    fn to_wire(&self) -> ExerciseMeasurementDto {
        ExerciseMeasurementDto {
            id: self.server_id.clone().unwrap_or_default(),
            user_id: String::new(),
            before_spo2: self.before.spo2,
            before_heart_rate: self.before.heart_rate,
            before_systolic: self.before.systolic,
            before_diastolic: self.before.diastolic,
            after_spo2: self.after.spo2,
            after_heart_rate: self.after.heart_rate,
            after_systolic: self.after.systolic,
            after_diastolic: self.after.diastolic,
            exercise_details: self.exercise_details.clone(),
            notes: self.notes.clone(),
            measured_at: self.measured_at,
            created_at: 0,
            updated_at: 0,
            local_id: self.local_id,
        }
    }

    fn from_wire(wire: ExerciseMeasurementDto) -> Self {
        let server_id = non_empty(wire.id);
        Self {
            local_id: None,
            synced_to_server: server_id.is_some(),
            server_id,
            before: ExerciseReading {
                spo2: wire.before_spo2,
                heart_rate: wire.before_heart_rate,
                systolic: wire.before_systolic,
                diastolic: wire.before_diastolic,
            },
            after: ExerciseReading {
                spo2: wire.after_spo2,
                heart_rate: wire.after_heart_rate,
                systolic: wire.after_systolic,
                diastolic: wire.after_diastolic,
            },
            exercise_details: wire.exercise_details,
            notes: wire.notes,
            measured_at: wire.measured_at,
        }
    }
}
