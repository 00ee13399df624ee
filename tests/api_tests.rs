//! Integration tests for the web API: request/response envelopes, status
//! codes and the full login, rate and account flows over HTTP.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use polypack::config::{Config, SecurityConfig};
use polypack::db::Store;
use polypack::state::SharedState;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 16,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };

    let shared = Arc::new(SharedState::with_store(config, Store::in_memory()));
    let state = polypack::api::create_app_state(shared);
    polypack::api::router(state).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_login_flow() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "user_id": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid credentials");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "user_id": "admin", "password": "admin" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "admin");
    assert_eq!(body["data"]["role"], "admin");

    // Employees have no password path.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "user_id": "employee", "password": "anything" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "user_id": "ghost", "password": "anything" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_otp_flow() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/otp/request",
            serde_json::json!({ "user_id": "employee" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let otp = body["data"]["otp"].as_str().unwrap().to_string();
    assert_eq!(otp.len(), 6);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/otp/verify",
            serde_json::json!({ "user_id": "employee", "otp": otp }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "employee");
    assert_eq!(body["data"]["role"], "employee");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/otp/verify",
            serde_json::json!({ "user_id": "employee", "otp": "000000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Without an issued code, verification is refused up front.
    let revoke = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/employee/otp/revoke",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(revoke.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/otp/verify",
            serde_json::json!({ "user_id": "employee", "otp": "123456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rates_round_trip() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/rates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let rates = body["data"].as_array().unwrap();
    assert_eq!(rates.len(), 16);
    assert!(rates.iter().any(|r| r["key"] == "ldpe" && r["value"] == 105.0));

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/rates",
            serde_json::json!({
                "rates": [
                    { "key": "ldpe", "value": 110.0 },
                    { "key": "handling", "value": 2.0 }
                ],
                "changed_by_id": "admin",
                "changed_by_name": "Administrator"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rates = body["data"].as_array().unwrap();
    assert_eq!(rates.len(), 17);
    assert!(rates.iter().any(|r| r["key"] == "ldpe" && r["value"] == 110.0));
    assert!(rates.iter().any(|r| r["key"] == "handling" && r["id"] == 17));

    let response = app
        .clone()
        .oneshot(get("/api/rates/history?limit=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["changed_by_id"], "admin");
    // The stored snapshot is the table before this update.
    assert!(
        history[0]["rates_snapshot"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["key"] == "ldpe" && r["value"] == 105.0)
    );
}

#[tokio::test]
async fn test_rate_update_validation() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/rates",
            serde_json::json!({
                "rates": [],
                "changed_by_id": "admin",
                "changed_by_name": "Administrator"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/rates",
            serde_json::json!({
                "rates": [{ "key": "ldpe", "value": 110.0 }],
                "changed_by_id": "",
                "changed_by_name": "Administrator"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_users_crud() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "id": "worker1",
                "name": "Worker One",
                "role": "employee"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "id": "WORKER1",
                "name": "Impostor",
                "role": "employee"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(get("/api/users/worker1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Worker One");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/worker1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/users/worker1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_admin_endpoint() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/users/admin",
            serde_json::json!({ "name": "Head Office" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Head Office");

    // An empty update is rejected before it reaches the store.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/users/admin",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/users/employee",
            serde_json::json!({ "name": "Renamed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/system/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["success"].as_bool().unwrap());

    let data = body["data"].as_object().unwrap();
    assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
    assert!(data.contains_key("uptime"));
    assert_eq!(data["rate_count"], 16);
    assert_eq!(data["history_entries"], 0);
    assert_eq!(data["user_count"], 2);
}
