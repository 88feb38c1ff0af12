//! HTTP route handlers for the validation server.
//!
//! This module provides the HTTP API endpoints:
//!
//! - `GET /validation/{name}` - Lint one event type fetched from the broker
//! - `GET /validation` - Lint every event type the broker returns
//! - `POST /validation` - Lint the event type in the request body
//! - `GET /health` - Health check endpoint
//!
//! # Architecture
//!
//! All routes share application state through [`AppState`], which contains:
//! - Configuration
//! - Broker client for fetching event types
//! - The rule table
//! - Server start time for uptime reporting
//!
//! Every error leaves the handlers as a [`ServerError`] and is rendered as a
//! JSON string body, the shape the UI displays verbatim.
//!
//! # Example
//!
//! ```rust,no_run
//! use eventtype_linter_server::routes::{create_router, AppState};
//! use eventtype_linter_server::config::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("failed to load config");
//!     let state = AppState::new(config).expect("failed to create state");
//!     let app = create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use eventtype_linter::{Linter, ValidationResult};

use crate::broker::BrokerClient;
use crate::config::Config;
use crate::error::{BrokerError, Result, ServerError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request body size (1 MB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Body returned when a POST does not carry an event type.
const WRONG_INPUT_MESSAGE: &str = "Wrong input. No event type found in the request body.";

/// Body returned when the linter fails on a definition.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error during validation of the event type.";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Client for the broker's event type endpoints.
    pub broker: BrokerClient,

    /// Rule table applied to every event type.
    pub linter: Arc<Linter>,

    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Creates a new application state with the standard rule table.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> std::result::Result<Self, BrokerError> {
        let broker = BrokerClient::new(config.broker_url.clone(), config.broker_timeout)?;
        Ok(Self::with_components(config, broker, Linter::standard()))
    }

    /// Creates application state from pre-built components.
    #[must_use]
    pub fn with_components(config: Config, broker: BrokerClient, linter: Linter) -> Self {
        Self {
            config: Arc::new(config),
            broker,
            linter: Arc::new(linter),
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("broker", &self.broker.base_url())
            .field("rules", &self.linter.rules().count())
            .field("start_time", &self.start_time)
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/validation", get(get_validations).post(post_validation))
        .route("/validation/", get(get_validations).post(post_validation))
        .route("/validation/{name}", get(get_validation))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Error Responses
// ============================================================================

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let message = match self {
            Self::Validation(message) => message,
            Self::Broker { subject, source } => format!("Error fetching {subject}. {source}."),
            Self::Config(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        };

        (status, Json(message)).into_response()
    }
}

/// Returns the caller's Authorization header for forwarding, if any.
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

// ============================================================================
// GET /validation/{name}
// ============================================================================

/// GET /validation/{name} - Lint one event type by name.
///
/// # Responses
///
/// - `200 OK` - A [`ValidationResult`]
/// - `4xx` - The broker rejected the lookup (e.g. unknown event type)
/// - `502 Bad Gateway` - The broker failed or could not be reached
/// - `500 Internal Server Error` - The definition could not be linted
async fn get_validation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ValidationResult>> {
    let event_type = state
        .broker
        .fetch_event_type(&name, authorization(&headers))
        .await
        .map_err(|e| ServerError::broker("event type", e))?;

    let result = state.linter.lint_value(&event_type)?;
    debug!(event_type = %name, issues = result.issues.len(), "Event type validated");

    Ok(Json(result))
}

// ============================================================================
// GET /validation
// ============================================================================

/// GET /validation - Lint every event type the broker returns.
///
/// Results keep the broker's order.
async fn get_validations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ValidationResult>>> {
    let event_types = state
        .broker
        .fetch_event_types(authorization(&headers))
        .await
        .map_err(|e| ServerError::broker("event types", e))?;

    let results = state.linter.lint_values(&event_types)?;
    info!(event_types = results.len(), "Event types validated");

    Ok(Json(results))
}

// ============================================================================
// POST /validation
// ============================================================================

/// POST /validation - Lint the event type carried in the request body.
///
/// The body must be a JSON object with a non-empty `name`.
///
/// # Responses
///
/// - `200 OK` - A [`ValidationResult`]
/// - `400 Bad Request` - No event type in the body
/// - `413 Payload Too Large` - Body exceeds 1 MB
/// - `500 Internal Server Error` - The definition could not be linted
async fn post_validation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ValidationResult>> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Request body is not JSON");
        ServerError::validation(WRONG_INPUT_MESSAGE)
    })?;

    let has_name = value
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    if !has_name {
        warn!("Request body has no event type name");
        return Err(ServerError::validation(WRONG_INPUT_MESSAGE));
    }

    let result = state.linter.lint_value(&value)?;
    debug!(event_type = %result.name, issues = result.issues.len(), "Event type validated");

    Ok(Json(result))
}

// ============================================================================
// GET /health
// ============================================================================

/// Health check response body.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
}

/// GET /health - Health check endpoint.
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "uptime_seconds": 3600
/// }
/// ```
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Creates an app whose broker is the given mock server.
    fn test_app(broker_url: &str) -> Router {
        let state = AppState::new(Config::new(broker_url)).expect("failed to create state");
        create_router(state)
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // ========================================================================
    // Health endpoint tests
    // ========================================================================

    #[tokio::test]
    async fn health_returns_ok_status() {
        let app = test_app("http://127.0.0.1:1");

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_seconds"].is_u64());
    }

    // ========================================================================
    // POST /validation tests
    // ========================================================================

    #[tokio::test]
    async fn post_validation_lints_body() {
        let app = test_app("http://127.0.0.1:1");
        let body = json!({"name": "shop.order-placed", "authorization": null}).to_string();

        let response = app.oneshot(post("/validation", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "shop.order-placed");
        assert_eq!(json["issues"][0]["id"], 100);
    }

    #[tokio::test]
    async fn post_validation_accepts_trailing_slash() {
        let app = test_app("http://127.0.0.1:1");
        let body = json!({"name": "shop.order-placed"}).to_string();

        let response = app.oneshot(post("/validation/", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn post_validation_rejects_body_without_name() {
        for body in [
            json!({}).to_string(),
            json!({"name": ""}).to_string(),
            json!({"category": "data"}).to_string(),
            json!([{"name": "a.b"}]).to_string(),
            json!("shop.order-placed").to_string(),
        ] {
            let app = test_app("http://127.0.0.1:1");
            let response = app.oneshot(post("/validation", body.clone())).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(body_json(response).await, json!(WRONG_INPUT_MESSAGE));
        }
    }

    #[tokio::test]
    async fn post_validation_rejects_invalid_json() {
        let app = test_app("http://127.0.0.1:1");

        let response = app.oneshot(post("/validation", "{ not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!(WRONG_INPUT_MESSAGE));
    }

    #[tokio::test]
    async fn post_validation_hides_lint_errors() {
        let app = test_app("http://127.0.0.1:1");
        let body = json!({"name": "shop.order-placed", "category": 7}).to_string();

        let response = app.oneshot(post("/validation", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!(INTERNAL_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn post_validation_rejects_oversized_body() {
        let app = test_app("http://127.0.0.1:1");
        let padding = "x".repeat(MAX_BODY_SIZE + 1);
        let body = json!({"name": "a.b", "padding": padding}).to_string();

        let response = app.oneshot(post("/validation", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    // ========================================================================
    // GET /validation/{name} tests
    // ========================================================================

    #[tokio::test]
    async fn get_validation_fetches_and_lints() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types/shop.order-placed"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "shop.order-placed",
                "category": "undefined"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let request = Request::builder()
            .uri("/validation/shop.order-placed")
            .header("Authorization", "Bearer token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "shop.order-placed");
        let ids: Vec<u64> = json["issues"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|i| i["id"].as_u64())
            .collect();
        assert!(ids.contains(&300));
    }

    #[tokio::test]
    async fn get_validation_passes_through_broker_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"title":"Not Found"}"#))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let response = app.oneshot(get("/validation/missing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!(r#"Error fetching event type. Status:404, Not Found. Nakadi: {"title":"Not Found"}."#)
        );
    }

    #[tokio::test]
    async fn get_validation_keeps_name_inside_event_types_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types/a%3Fx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "a?x"})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/event-types/..%2Fsubscriptions"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such event type"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let response = app.clone().oneshot(get("/validation/a%3Fx")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "a?x");

        let response = app
            .oneshot(get("/validation/..%2Fsubscriptions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_validation_maps_broker_failure_to_bad_gateway() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types/shop.order-placed"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let response = app
            .oneshot(get("/validation/shop.order-placed"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let message = body_json(response).await;
        assert!(message
            .as_str()
            .is_some_and(|m| m.starts_with("Error fetching event type. Status:500")));
    }

    #[tokio::test]
    async fn get_validation_maps_unreachable_broker_to_bad_gateway() {
        let app = test_app("http://127.0.0.1:1");

        let response = app.oneshot(get("/validation/a.b")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    // ========================================================================
    // GET /validation tests
    // ========================================================================

    #[tokio::test]
    async fn get_validations_lints_every_event_type_in_order() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "b.second"},
                {"name": "a.first"}
            ])))
            .mount(&mock_server)
            .await;

        for uri in ["/validation", "/validation/"] {
            let app = test_app(&mock_server.uri());
            let response = app.oneshot(get(uri)).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "uri {uri}");
            let json = body_json(response).await;
            assert_eq!(json[0]["name"], "b.second");
            assert_eq!(json[1]["name"], "a.first");
        }
    }

    #[tokio::test]
    async fn get_validations_rejects_non_array_from_broker() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "a.b"})))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let response = app.oneshot(get("/validation")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!(INTERNAL_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn get_validations_reports_forbidden_from_broker() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event-types"))
            .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let response = app.oneshot(get("/validation")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!("Error fetching event types. Status:403, Forbidden. Nakadi: nope.")
        );
    }
}
