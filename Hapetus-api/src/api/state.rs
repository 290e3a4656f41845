use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use hapetus_data::repository::MeasurementRepository;
use hapetus_domain::auth::TokenVerifier;
use hapetus_domain::health::{DatabaseHealthService, HealthServiceTrait};
use hapetus_domain::services::measurements::{MeasurementService, MeasurementServiceTrait};
use hapetus_domain::services::settings::{SettingsService, SettingsServiceTrait};
use hapetus_domain::services::stats::{StatsService, StatsServiceTrait};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub measurements: Arc<dyn MeasurementServiceTrait>,
    pub settings: Arc<dyn SettingsServiceTrait>,
    pub stats: Arc<dyn StatsServiceTrait>,
    pub health: Arc<dyn HealthServiceTrait>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub started_at: Instant,
    pub environment: String,
}

impl AppState {
    /// Wire all services onto one repository
    pub fn new(repository: MeasurementRepository, verifier: Arc<dyn TokenVerifier>, environment: impl Into<String>) -> Self {
        info!("Building services on the {} backend", repository.backend_name());

        Self {
            health: Arc::new(DatabaseHealthService::new(repository.pool().cloned())),
            measurements: Arc::new(MeasurementService::new(repository.clone())),
            settings: Arc::new(SettingsService::new(repository.clone())),
            stats: Arc::new(StatsService::new(repository)),
            verifier,
            started_at: Instant::now(),
            environment: environment.into(),
        }
    }
}
