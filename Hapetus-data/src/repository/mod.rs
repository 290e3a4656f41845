// Repository module structure
pub mod errors;
mod in_memory;
mod measurements;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use measurements::{
    DailyMeasurementRepositoryTrait, ExerciseMeasurementRepositoryTrait, MeasurementRepository,
    UserSettingsRepositoryTrait,
};
