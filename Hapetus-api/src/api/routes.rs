use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use hapetus_domain::auth::{auth_middleware, configure_auth};

use crate::api::handlers::{classify, daily, exercise, health, settings, stats};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Everything here acts on the caller's own records
    let protected_routes = Router::new()
        .route("/daily", get(daily::list_daily).post(daily::create_daily))
        .route("/daily/:id", put(daily::update_daily).delete(daily::delete_daily))
        .route("/exercise", get(exercise::list_exercise).post(exercise::create_exercise))
        .route("/exercise/:id", delete(exercise::delete_exercise))
        .route("/user/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/stats/week", get(stats::week_stats))
        .route("/stats/daily", get(stats::daily_stats))
        .route("/stats/range", get(stats::range_stats))
        .layer(middleware::from_fn_with_state(state.verifier.clone(), auth_middleware));

    debug!("Protected routes configured");

    let public_api_routes = Router::new()
        .route("/classify", post(classify::classify_reading))
        .route("/guidelines", get(classify::list_guidelines));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", protected_routes.merge(public_api_routes))
        .with_state(state);

    debug!("API routes nested");

    let app = app.merge(configure_swagger_routes());

    let app = configure_auth(app).layer(TraceLayer::new_for_http());
    debug!("Security configuration applied");

    app
}
