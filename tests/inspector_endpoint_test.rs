// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests of the unauthenticated server surface: the inspector's minimal
//! snapshot, the authentication gate on the exchange endpoints and the JSON
//! error catchers. None of these touch an upstream provider, so no stub
//! server is needed.

use std::sync::Arc;

use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use cross_app_access::config::Config;
use cross_app_access::server::{build_rocket, figment_from_config};
use cross_app_access::session::SESSION_COOKIE;

async fn test_client() -> Client {
    let config = Config::default();
    let rocket = build_rocket(figment_from_config(&config), Arc::new(config));
    Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}

#[rocket::async_test]
async fn unauthenticated_snapshot_is_minimal() {
    let client = test_client().await;

    let response = client.get("/api/inspector-debug").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    // Exactly one field, nothing about configuration or tokens
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body, json!({"isAuthenticated": false}));
}

#[rocket::async_test]
async fn forged_session_cookie_is_unauthenticated() {
    let client = test_client().await;

    // An unencrypted cookie never matches a private cookie, whatever its value
    let response = client
        .get("/api/inspector-debug")
        .cookie(Cookie::new(SESSION_COOKIE, "not-a-session"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body, json!({"isAuthenticated": false}));
}

#[rocket::async_test]
async fn exchange_endpoints_require_authentication() {
    let client = test_client().await;

    for endpoint in ["/api/okta-token-exchange", "/api/auth0-jwt-bearer"] {
        let response = client.post(endpoint).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!(body, json!({"error": "Authentication required"}));
    }
}

#[rocket::async_test]
async fn callback_without_pending_login_restarts() {
    let client = test_client().await;

    let response = client
        .get("/login/callback?code=whatever&state=whatever")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/login"));
}

#[rocket::async_test]
async fn unknown_api_route_is_json_404() {
    let client = test_client().await;

    let response = client.post("/api/does-not-exist").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body, json!({"error": "Not found"}));
}

#[rocket::async_test]
async fn embedded_client_is_served() {
    let client = test_client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("Cross App Access"));

    // Unknown paths fall back to the client entry point
    let response = client.get("/some/client/route").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("Cross App Access"));
}
