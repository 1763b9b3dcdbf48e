// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared helpers for the integration tests: a mock API, signed credentials
//! and profile fixtures.
#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use turbo_badges::config::Config;
use turbo_badges::SessionManager;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Serialize)]
struct Claims {
    exp: i64,
    id: String,
    role: Value,
}

pub fn setup() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// HS256 credential for `user_id` expiring `ttl_secs` from now
pub fn credential(user_id: &str, ttl_secs: i64) -> String {
    let claims = Claims {
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        id: user_id.to_string(),
        role: json!({ "id": "r3", "name": "user" }),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-test-secret"),
    )
    .expect("Failed to sign test credential")
}

pub fn profile_json(id: &str, first_name: &str, last_name: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "firstName": first_name,
        "lastName": last_name,
        "role": { "id": format!("role-{}", role), "name": role },
        "createdAt": "2025-03-01T10:00:00Z",
        "updatedAt": "2025-03-01T10:00:00Z"
    })
}

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.request_timeout_secs = 5;
    config
}

pub fn session_for(server: &MockServer) -> SessionManager {
    SessionManager::new(&config_for(server)).expect("Failed to build session manager")
}

/// `POST /auth/refresh` answering `credential`
pub async fn mount_refresh(server: &MockServer, credential: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": credential })),
        )
        .mount(server)
        .await;
}

/// `GET /auth/profile` answering `profile`
pub async fn mount_profile(server: &MockServer, profile: &Value) {
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile.clone()))
        .mount(server)
        .await;
}

/// A session bootstrapped against `server` as the given user
pub async fn signed_in_session(server: &MockServer, profile: &Value) -> SessionManager {
    mount_refresh(server, &credential("u1", 3600)).await;
    mount_profile(server, profile).await;
    let session = session_for(server);
    session.bootstrap().await;
    session
}

/// Number of requests the mock API received on `path`
pub async fn requests_to(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == endpoint)
        .count()
}
