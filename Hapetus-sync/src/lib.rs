//! # Hapetus Sync
//!
//! Offline-first synchronisation between a device-local measurement store and
//! the Hapetus API.
//!
//! Local writes are authoritative and immediate. Remote pushes are best
//! effort: failures are logged, counted and retried later with
//! [`SyncReconciler::push_pending`]. Pulls merge the server's records into
//! the local store by server id and report their outcome through
//! [`SyncStatus`].

pub mod config;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod remote;
pub mod retry;
pub mod session;
pub mod status;
pub mod store;

pub use config::SyncConfig;
pub use error::SyncError;
pub use reconciler::{DailyReconciler, ExerciseReconciler, PushReport, SyncReconciler};
pub use record::{LocalDailyMeasurement, LocalExerciseMeasurement, LocalId, SyncRecord};
pub use remote::HttpRemoteStore;
pub use retry::RetryPolicy;
pub use session::{Session, SessionProvider, SharedSession};
pub use status::SyncStatus;
pub use store::{InMemoryLocalStore, LocalStore, RemoteStore};

/// Heart rate range clients may use as an input hint
pub use hapetus_domain::services::validation::HEART_RATE_HINT;
