//! Integration tests for the hub's REST endpoints
//!
//! These tests verify that:
//! - Pushed snapshots round-trip byte-for-byte through the store
//! - The API key gate rejects before any state change
//! - Upserts converge to the last write per machine
//! - Unknown machines 404

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use fleetwatch::{
    api::{ApiConfig, ApiState, spawn_api_server},
    notifier::ViewerRegistry,
    storage::MemoryStore,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const TEST_KEY: &str = "test-key";

async fn spawn_test_hub() -> SocketAddr {
    let state = ApiState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ViewerRegistry::new()),
        TEST_KEY.to_string(),
    );

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        enable_cors: true,
    };

    spawn_api_server(config, state).await.unwrap()
}

fn sample_payload() -> Value {
    json!({
        "timestamp": "2026-08-06T12:00:00Z",
        "services": [
            {"name": "nginx.service", "status": "active", "description": "web server", "logs": []}
        ],
        "storage": {"filesystems": [], "disks": []},
        "nginx": {"isRunning": true, "domains": ["example.com"], "errorLogs": [], "accessLogs": []},
        "heartbeat": true,
    })
}

async fn push(
    client: &reqwest::Client,
    addr: SocketAddr,
    name: &str,
    key: &str,
    payload: &Value,
) -> reqwest::Response {
    client
        .post(format!("http://{addr}/api/servers/{name}/data"))
        .header("x-api-key", key)
        .json(payload)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_push_then_get_round_trips_payload() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    let payload = sample_payload();
    let response = push(&client, addr, "web1", TEST_KEY, &payload).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true}));

    let response = client
        .get(format!("http://{addr}/api/servers/web1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record: Value = response.json().await.unwrap();
    assert_eq!(record["name"], json!("web1"));
    assert_eq!(record["data"], payload);
    assert_eq!(record["data"]["heartbeat"], json!(true));
    assert!(record["last_seen"].is_string());
    assert!(record["ip"].is_string());
}

#[tokio::test]
async fn test_push_with_wrong_key_rejected_and_store_unchanged() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    // Seed a record with the real key
    let original = json!({"heartbeat": true, "rev": 1});
    push(&client, addr, "web1", TEST_KEY, &original).await;

    // A bad credential is rejected...
    let response = push(&client, addr, "web1", "wrong", &json!({"rev": 2})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid API key"}));

    // ...and the stored record is untouched
    let record: Value = client
        .get(format!("http://{addr}/api/servers/web1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["data"], original);
}

#[tokio::test]
async fn test_push_without_key_rejected() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/servers/web1/data"))
        .json(&json!({"heartbeat": true}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Nothing was created
    let response = client
        .get(format!("http://{addr}/api/servers/web1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_server_is_404() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/api/servers/doesnotexist"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Server not found"}));
}

#[tokio::test]
async fn test_list_servers_returns_all_machines() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    push(&client, addr, "web1", TEST_KEY, &json!({"heartbeat": true})).await;
    push(&client, addr, "db1", TEST_KEY, &json!({"heartbeat": true})).await;

    let records: Vec<Value> = client
        .get(format!("http://{addr}/api/servers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    let mut names: Vec<&str> = records
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["db1", "web1"]);

    // Payload arrives decoded, not as an escaped string
    assert!(records[0]["data"].is_object());
}

#[tokio::test]
async fn test_repeated_pushes_keep_one_record_per_machine() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    for rev in 1..=5 {
        let response = push(&client, addr, "web1", TEST_KEY, &json!({"rev": rev})).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let records: Vec<Value> = client
        .get(format!("http://{addr}/api/servers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["data"], json!({"rev": 5}));
}

#[tokio::test]
async fn test_malformed_push_body_is_rejected() {
    let addr = spawn_test_hub().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/servers/web1/data"))
        .header("x-api-key", TEST_KEY)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());

    // The broken push created nothing
    let response = client
        .get(format!("http://{addr}/api/servers/web1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
