use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Daily measurement endpoints
        crate::api::handlers::daily::list_daily,
        crate::api::handlers::daily::create_daily,
        crate::api::handlers::daily::update_daily,
        crate::api::handlers::daily::delete_daily,

        // Exercise measurement endpoints
        crate::api::handlers::exercise::list_exercise,
        crate::api::handlers::exercise::create_exercise,
        crate::api::handlers::exercise::delete_exercise,

        // Settings endpoints
        crate::api::handlers::settings::get_settings,
        crate::api::handlers::settings::update_settings,

        // Statistics endpoints
        crate::api::handlers::stats::week_stats,
        crate::api::handlers::stats::daily_stats,
        crate::api::handlers::stats::range_stats,

        // Classification endpoints
        crate::api::handlers::classify::classify_reading,
        crate::api::handlers::classify::list_guidelines
    ),
    components(
        schemas(
            // Measurements
            hapetus_domain::entities::dto::DailyMeasurementDto,
            hapetus_domain::entities::dto::UpdateDailyMeasurementDto,
            hapetus_domain::entities::dto::ExerciseMeasurementDto,
            hapetus_domain::entities::dto::MessageEnvelope,

            // Settings
            hapetus_domain::entities::dto::UserSettingsDto,
            hapetus_domain::entities::dto::UpdateUserSettingsDto,
            hapetus_domain::entities::settings::Gender,

            // Statistics
            hapetus_domain::entities::stats::DailyStatsRow,
            hapetus_domain::entities::stats::RangeStats,

            // Classification
            hapetus_domain::entities::dto::ClassifyRequest,
            hapetus_domain::entities::dto::ClassificationResponse,
            hapetus_domain::entities::classification::Classification,
            hapetus_domain::entities::classification::BpCategory,
            hapetus_domain::entities::classification::Severity,
            hapetus_domain::guidelines::AgeBracket,

            // Errors and health
            crate::entities::common::ErrorResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "daily", description = "Daily SpO2, heart rate and blood pressure measurements"),
        (name = "exercise", description = "Before/after exercise measurements"),
        (name = "settings", description = "Per-user profile used for classification"),
        (name = "stats", description = "Aggregated statistics"),
        (name = "guidelines", description = "Blood pressure classification and guideline tables")
    ),
    info(
        title = "Hapetus API",
        version = "0.1.0",
        description = "API for recording vital signs and classifying blood pressure",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
