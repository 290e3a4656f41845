use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error};

use super::logging::{log_auth_event, AuthEvent, AuthEventType};
use super::{AuthError, TokenVerifier};

/// Pull the token out of an `Authorization: Bearer ...` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Authorization header does not contain a Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

fn reject(err: &AuthError) -> Response {
    let (status, code) = match err {
        AuthError::Provider(_) => (StatusCode::SERVICE_UNAVAILABLE, "auth_unavailable"),
        AuthError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        AuthError::MissingToken | AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
    };

    let message = match err {
        AuthError::MissingToken | AuthError::InvalidToken(_) => err.to_string(),
        _ => "Authentication is temporarily unavailable".to_string(),
    };

    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Authentication middleware for protected routes.
///
/// On success the [`super::AuthenticatedUser`] is stored in the request
/// extensions for handlers to pick up with `Extension`.
pub async fn auth_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let start_time = Instant::now();

    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.to_string(),
        Err(err) => {
            debug!("Rejecting request to {}: {}", request_path, err);
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, None, false)
                    .with_details(err.to_string())
                    .with_resource(request_path)
                    .with_auth_method(verifier.method()),
            );
            return reject(&err);
        }
    };

    match verifier.verify(&token).await {
        Ok(user) => {
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, Some(&user.user_id), true)
                    .with_resource(request_path)
                    .with_duration(start_time.elapsed().as_millis() as u64)
                    .with_auth_method(verifier.method()),
            );
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => {
            let event_type = match err {
                AuthError::Provider(_) | AuthError::Config(_) => {
                    error!("Token verification could not complete: {}", err);
                    AuthEventType::ProviderUnavailable
                }
                _ => AuthEventType::TokenValidation,
            };
            log_auth_event(
                AuthEvent::new(event_type, None, false)
                    .with_details(err.to_string())
                    .with_resource(request_path)
                    .with_duration(start_time.elapsed().as_millis() as u64)
                    .with_auth_method(verifier.method()),
            );
            reject(&err)
        }
    }
}

/// Apply CORS and security headers to the whole application
pub fn configure_auth(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    app.layer(cors).layer(security_headers)
}
