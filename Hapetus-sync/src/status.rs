use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of the most recent pull, published on a watch channel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Succeeded { merged: usize, at: DateTime<Utc> },
    Failed { reason: String, at: DateTime<Utc> },
}

impl SyncStatus {
    pub fn succeeded(merged: usize) -> Self {
        SyncStatus::Succeeded { merged, at: Utc::now() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        SyncStatus::Failed {
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    /// True once a pull has finished, whatever the result
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Succeeded { .. } | SyncStatus::Failed { .. })
    }
}
