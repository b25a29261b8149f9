// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end gate flow: a real server on a local port, driven by the
//! HTTP validator and the gate client.

use reqwest::StatusCode;
use serde_json::{json, Value};
use url::Url;

use site_gate::{
    api::router,
    client::{GateClient, GateState, HttpTokenValidator, MemoryTokenStore, TokenStore},
    config::{Environment, Settings},
    contact::ContactDelivery,
    state::AppState,
};

async fn spawn_server(environment: Environment, secret: Option<&str>) -> Url {
    let state = AppState::with_delivery(
        Settings::for_environment(environment, secret),
        ContactDelivery::Log,
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn post_token(base: &Url, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(base.join("api/validate-token").unwrap())
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn development_scenario_over_http() {
    let base = spawn_server(Environment::Development, Some("abc123")).await;

    let (status, body) = post_token(&base, json!({ "token": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Token is required");

    let (status, body) = post_token(&base, json!({ "token": "wrong" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let (status, body) = post_token(&base, json!({ "token": "abc123" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn production_scenario_over_http() {
    let base = spawn_server(Environment::Production, None).await;

    for body in [json!({}), json!({ "token": "anything" })] {
        let (status, body) = post_token(&base, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Production environment - no token required");
        assert_eq!(body["environment"], "production");
    }
}

#[tokio::test]
async fn test_scenario_without_secret_over_http() {
    let base = spawn_server(Environment::Test, None).await;

    let (status, body) = post_token(&base, json!({ "token": "abc123" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error");
}

#[tokio::test]
async fn client_logs_in_and_reauthenticates_after_reload() {
    let base = spawn_server(Environment::Development, Some("abc123")).await;
    let store = MemoryTokenStore::new();

    let mut gate = GateClient::new(
        Environment::Development,
        store.clone(),
        HttpTokenValidator::new(&base).unwrap(),
    );
    assert_eq!(
        gate.initialize().await,
        &GateState::Unauthenticated { error: None }
    );

    gate.submit("wrong").await;
    assert!(!gate.is_authenticated());
    assert_eq!(gate.view().error.as_deref(), Some("Invalid token"));
    assert_eq!(store.get().unwrap(), None);

    assert_eq!(gate.submit("abc123").await, &GateState::Authenticated);
    assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));

    let mut reloaded = GateClient::new(
        Environment::Development,
        store.clone(),
        HttpTokenValidator::new(&base).unwrap(),
    );
    assert_eq!(reloaded.initialize().await, &GateState::Authenticated);

    reloaded.logout();
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn client_reports_server_misconfiguration() {
    let base = spawn_server(Environment::Test, None).await;
    let store = MemoryTokenStore::new();

    let mut gate = GateClient::new(
        Environment::Test,
        store.clone(),
        HttpTokenValidator::new(&base).unwrap(),
    );
    gate.submit("abc123").await;

    let view = gate.view();
    assert!(view.show_form);
    assert_eq!(view.error.as_deref(), Some("Server configuration error"));
    assert_eq!(store.get().unwrap(), None);
}
