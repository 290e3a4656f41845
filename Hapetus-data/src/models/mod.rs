// Storage models
pub mod measurement;

pub use measurement::{DailyMeasurementRecord, ExerciseMeasurementRecord, UserSettingsRecord};
