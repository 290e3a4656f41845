use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use hapetus_api::api::{create_app, AppState};
use hapetus_data::repository::MeasurementRepository;
use hapetus_domain::auth::{LocalJwtVerifier, TokenVerifier};

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

struct TestApp {
    app: Router,
    verifier: Arc<LocalJwtVerifier>,
}

impl TestApp {
    fn new() -> Self {
        initialize();
        let verifier = Arc::new(LocalJwtVerifier::new("integration-test-secret").unwrap());
        let dyn_verifier: Arc<dyn TokenVerifier> = verifier.clone();
        let state = AppState::new(MeasurementRepository::in_memory(), dyn_verifier, "test");

        Self {
            app: create_app(state),
            verifier,
        }
    }

    fn token(&self, user_id: &str) -> String {
        self.verifier.issue(user_id, Duration::hours(1)).unwrap()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

fn daily_body(spo2: i64, heart_rate: i64, systolic: i64, diastolic: i64) -> Value {
    json!({
        "spo2": spo2,
        "heart_rate": heart_rate,
        "systolic": systolic,
        "diastolic": diastolic,
        "measured_at": Utc::now().timestamp() - 10,
        "local_id": 7
    })
}

#[tokio::test]
async fn test_health_reports_in_memory_storage_as_degraded() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["components"]["database"]["status"], "degraded");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/daily", None, Some(daily_body(97, 70, 120, 80)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.send(Method::GET, "/api/stats/week", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_daily() {
    let app = TestApp::new();
    let token = app.token("user-1");

    let (status, body) = app
        .send(Method::POST, "/api/daily", Some(&token), Some(daily_body(97, 70, 120, 80)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].is_string());
    assert_eq!(body["data"]["user_id"], "user-1");
    assert_eq!(body["data"]["local_id"], 7);
    assert!(!body["data"]["id"].as_str().unwrap().is_empty());

    let (status, body) = app.send(Method::GET, "/api/daily", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Another user sees nothing
    let other = app.token("user-2");
    let (_, body) = app.send(Method::GET, "/api/daily", Some(&other), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_ownership() {
    let app = TestApp::new();
    let owner = app.token("user-1");
    let intruder = app.token("user-2");

    let (_, body) = app
        .send(Method::POST, "/api/daily", Some(&owner), Some(daily_body(97, 70, 120, 80)))
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/daily/{}", id);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&intruder), Some(json!({ "heart_rate": 90 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.send(Method::DELETE, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({ "heart_rate": 64 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, body) = app.send(Method::GET, "/api/daily", Some(&owner), None).await;
    assert_eq!(body["data"][0]["heart_rate"], 64);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token("user-1");

    let (status, body) = app
        .send(Method::PUT, "/api/daily/missing", Some(&token), Some(json!({ "notes": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = app.send(Method::DELETE, "/api/exercise/missing", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_measurements_are_bad_requests() {
    let app = TestApp::new();
    let token = app.token("user-1");

    let (status, body) = app
        .send(Method::POST, "/api/daily", Some(&token), Some(daily_body(30, 70, 120, 80)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("spo2"));

    let (status, _) = app
        .send(
            Method::POST,
            "/api/daily",
            Some(&token),
            Some(json!({ "measured_at": Utc::now().timestamp() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::POST, "/api/daily", Some(&token), Some(json!({ "spo2": "high" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_exercise_round_trip() {
    let app = TestApp::new();
    let token = app.token("user-1");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/exercise",
            Some(&token),
            Some(json!({
                "before_spo2": 98,
                "before_heart_rate": 66,
                "after_spo2": 95,
                "after_heart_rate": 148,
                "exercise_details": "Interval run",
                "measured_at": Utc::now().timestamp()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.send(Method::GET, "/api/exercise", Some(&token), None).await;
    assert_eq!(body["data"][0]["exercise_details"], "Interval run");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/exercise/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = TestApp::new();
    let token = app.token("user-1");

    let (status, body) = app.send(Method::GET, "/api/user/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["birth_year"].is_null());

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/user/settings",
            Some(&token),
            Some(json!({ "birth_year": 1960, "gender": "male" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send(Method::GET, "/api/user/settings", Some(&token), None).await;
    assert_eq!(body["data"]["birth_year"], 1960);
    assert_eq!(body["data"]["gender"], "male");

    let (status, _) = app
        .send(Method::PUT, "/api/user/settings", Some(&token), Some(json!({ "birth_year": 1700 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_over_seeded_measurements() {
    let app = TestApp::new();
    let token = app.token("user-1");

    for body in [daily_body(96, 70, 120, 80), daily_body(98, 80, 130, 90)] {
        let (status, _) = app.send(Method::POST, "/api/daily", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.send(Method::GET, "/api/stats/week", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["count"], 2);
    assert_eq!(rows[0]["avg_systolic"].as_f64(), Some(125.0));
    assert_eq!(rows[0]["avg_spo2"].as_f64(), Some(97.0));

    let now = Utc::now().timestamp();
    let uri = format!("/api/stats/range?start={}&end={}", now - 3600, now + 60);
    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["max_systolic"], 130);
    assert!(body["data"]["category"].is_string());

    let uri = format!("/api/stats/range?start={}&end={}", now, now - 3600);
    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/api/stats/daily?days=400", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::GET, "/api/stats/daily", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_classify_is_public() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/classify",
            None,
            Some(json!({ "systolic": 145, "diastolic": 95, "age": 45, "gender": "other" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], "HYPERTENSION_GRADE1");
    assert_eq!(body["data"]["guidelines_bracket"], "middle_age");
    assert!(!body["data"]["recommendations"].as_array().unwrap().is_empty());

    let (status, _) = app
        .send(Method::POST, "/api/classify", None, Some(json!({ "systolic": 500, "diastolic": 95 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guidelines_export() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/guidelines", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let tables = body["data"].as_array().unwrap();
    assert_eq!(tables.len(), 6);
    assert!(tables.iter().all(|t| t["optimal"]["systolic_min"].is_number()));
}

#[tokio::test]
async fn test_openapi_document_and_security_headers() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/daily"].is_object());

    let response = app
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
}
