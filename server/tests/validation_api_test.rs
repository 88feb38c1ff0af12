//! Integration tests for the validation API over a real socket.
//!
//! A wiremock server stands in for the broker; the validation server is
//! bound to a random port and exercised with reqwest, the way the UI
//! talks to it.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventtype_linter_server::config::Config;
use eventtype_linter_server::routes::{create_router, AppState};

// ============================================================================
// Test Helpers
// ============================================================================

/// Spawns the validation server against the given broker URL.
/// Returns the socket address and a handle to abort the server.
async fn spawn_test_server(broker_url: &str) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let mut config = Config::new(broker_url);
    config.broker_timeout = Duration::from_secs(2);
    let state = AppState::new(config).expect("failed to create state");
    let app = create_router(state);

    // Bind to port 0 to get a random available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, handle)
}

/// The definition the UI team used to demonstrate every misconfiguration.
fn misconfigured_event_type() -> Value {
    json!({
        "name": "WRONG-example-company.example-team.example-event_type.v5",
        "owning_application": "search-log-enricher",
        "category": "undefined",
        "enrichment_strategies": [],
        "partition_strategy": "random",
        "partition_key_fields": [],
        "schema": {
            "type": "json_schema",
            "schema": "{ \"additionalProperties\": true }",
            "version": "1.0.0",
            "created_at": "2017-02-02T11:12:33.230Z"
        },
        "default_statistic": {
            "messages_per_minute": 5000,
            "message_size": 20000,
            "read_parallelism": 8,
            "write_parallelism": 8
        },
        "options": {"retention_time": 345600000},
        "authorization": null,
        "compatibility_mode": "forward",
        "updated_at": "2017-02-02T11:12:33.230Z",
        "created_at": "2017-02-02T11:12:33.230Z"
    })
}

fn issue_ids(result: &Value) -> Vec<u64> {
    result["issues"]
        .as_array()
        .expect("issues should be an array")
        .iter()
        .filter_map(|issue| issue["id"].as_u64())
        .collect()
}

// ============================================================================
// POST /validation
// ============================================================================

#[tokio::test]
async fn post_rejects_empty_object() {
    let (addr, handle) = spawn_test_server("http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/validation"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!("Wrong input. No event type found in the request body.")
    );

    handle.abort();
}

#[tokio::test]
async fn post_returns_full_report_for_misconfigured_event_type() {
    let (addr, handle) = spawn_test_server("http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/validation"))
        .json(&misconfigured_event_type())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(
        body["name"],
        json!("WRONG-example-company.example-team.example-event_type.v5")
    );
    assert_eq!(&issue_ids(&body)[..6], &[100, 200, 300, 302, 303, 304]);
    assert_eq!(
        body["issues"][1],
        json!({
            "id": 200,
            "title": "No schema or empty schema configured",
            "message": "Please create a proper schema with a list of properties.",
            "link": "http://zalando.github.io/restful-api-guidelines/#210",
            "group": "schema",
            "severity": 100
        })
    );
    assert_eq!(body["issues"][3]["severity"], json!(10));

    handle.abort();
}

// ============================================================================
// GET /validation/{name}
// ============================================================================

#[tokio::test]
async fn get_by_name_forwards_credentials_to_broker() {
    let broker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/event-types/WRONG-example-company.example-team.example-event_type.v5",
        ))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(misconfigured_event_type()))
        .expect(1)
        .mount(&broker)
        .await;

    let (addr, handle) = spawn_test_server(&broker.uri()).await;

    let response = reqwest::Client::new()
        .get(format!(
            "http://{addr}/validation/WRONG-example-company.example-team.example-event_type.v5"
        ))
        .header("Authorization", "Bearer user-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(issue_ids(&body)[0], 100);

    handle.abort();
}

#[tokio::test]
async fn get_by_name_reports_unknown_event_type() {
    let broker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event-types/does-not-exist"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"title":"Not Found","status":404}"#),
        )
        .mount(&broker)
        .await;

    let (addr, handle) = spawn_test_server(&broker.uri()).await;

    let response = reqwest::get(format!("http://{addr}/validation/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    let message = body.as_str().expect("error body should be a JSON string");
    assert!(message.starts_with("Error fetching event type. Status:404, Not Found. Nakadi: "));
    assert!(message.ends_with('.'));

    handle.abort();
}

// ============================================================================
// GET /validation
// ============================================================================

#[tokio::test]
async fn get_all_validates_every_event_type() {
    let mut clean = misconfigured_event_type();
    clean["name"] = json!("example-company.example-team.order-placed");
    clean["category"] = json!("business");
    clean["compatibility_mode"] = json!("compatible");
    clean["audience"] = json!("company-internal");
    clean["ordering_key_fields"] = json!(["order_number"]);
    clean["schema"]["schema"] =
        json!("{\"properties\": {\"order_number\": {\"type\": \"string\"}}}");
    clean["authorization"] = json!({
        "admins": [{"data_type": "user", "value": "jdoe"}],
        "writers": [{"data_type": "user", "value": "jdoe"}],
        "readers": [{"data_type": "user", "value": "jdoe"}]
    });

    let broker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event-types"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([misconfigured_event_type(), clean])),
        )
        .mount(&broker)
        .await;

    let (addr, handle) = spawn_test_server(&broker.uri()).await;

    let response = reqwest::get(format!("http://{addr}/validation"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let results = body.as_array().expect("results should be an array");
    assert_eq!(results.len(), 2);
    assert!(!issue_ids(&results[0]).is_empty());
    assert_eq!(results[1]["issues"], json!([]));

    handle.abort();
}

#[tokio::test]
async fn get_all_reports_unreachable_broker() {
    let (addr, handle) = spawn_test_server("http://127.0.0.1:1").await;

    let response = reqwest::get(format!("http://{addr}/validation"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body
        .as_str()
        .is_some_and(|m| m.starts_with("Error fetching event types. ")));

    handle.abort();
}

// ============================================================================
// GET /health
// ============================================================================

#[tokio::test]
async fn health_is_available() {
    let (addr, handle) = spawn_test_server("http://127.0.0.1:1").await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));

    handle.abort();
}
