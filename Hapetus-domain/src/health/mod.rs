//! Domain layer health check functionality

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use hapetus_data::database::DatabasePool;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Health of a single component or of the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Functional with reduced guarantees (e.g. data not persisted)
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthComponent {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    async fn get_system_health(&self) -> SystemHealth;
}

/// Health service that probes the storage backend
#[derive(Debug, Clone)]
pub struct DatabaseHealthService {
    pool: Option<DatabasePool>,
}

impl DatabaseHealthService {
    /// `None` means the server runs on in-memory storage
    pub fn new(pool: Option<DatabasePool>) -> Self {
        Self { pool }
    }

    async fn check_database(&self) -> HealthComponent {
        let Some(pool) = self.pool.clone() else {
            return HealthComponent {
                status: HealthStatus::Degraded,
                details: Some("Using in-memory storage; data is not persisted".to_string()),
            };
        };

        let probe = tokio::task::spawn_blocking(move || {
            pool.connection_info()
                .map(|info| (info, pool.is_in_memory()))
                .map_err(|e| e.to_string())
        })
        .await;

        match probe {
            Ok(Ok((info, in_memory))) => HealthComponent {
                status: if in_memory {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                },
                details: Some(info),
            },
            Ok(Err(e)) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: HealthStatus::Unhealthy,
                    details: Some(e),
                }
            }
            Err(e) => HealthComponent {
                status: HealthStatus::Unhealthy,
                details: Some(format!("Health probe task failed: {}", e)),
            },
        }
    }
}

#[async_trait]
impl HealthServiceTrait for DatabaseHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = self.check_database().await;

        // Storage is the only component, so it decides the overall status
        SystemHealth {
            status: database.status,
            components: [("database".to_string(), database)].into_iter().collect(),
        }
    }
}
