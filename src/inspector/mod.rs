// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Flow inspector endpoint
//!
//! Read-only projection of the session's flow state for the web client: the
//! raw tokens accumulated so far, their decoded headers and claims, and the
//! non-secret configuration the client needs to render illustrative
//! requests. Decoding happens on every read; nothing here mutates state.
//!
//! WARNING: for demonstration purposes only. The endpoint deliberately hands
//! the delegation assertion and the resource access token to the browser so
//! they can be inspected. A production application must never expose these
//! artifacts to a frontend; this boundary is the whole point of the demo and
//! must not be quietly removed. Client secrets are never part of the
//! projection.

use std::sync::Arc;

use rocket::get;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::config::Config;
use crate::jwt;
use crate::session::SessionUser;

fn decoded_or_null(token: Option<&str>, decode: fn(&str) -> Option<Value>) -> Value {
    token
        .and_then(decode)
        .unwrap_or(Value::Null)
}

/// Project the current session onto the flow snapshot read model.
///
/// An unauthenticated caller gets exactly `{"isAuthenticated": false}` and
/// nothing else, whatever stale cookies it may present. Token fields of an
/// authenticated snapshot are JSON null until the corresponding exchange
/// step has produced them.
#[get("/inspector-debug")]
pub fn inspector_debug(
    user: Option<SessionUser>,
    config: &State<Arc<Config>>,
) -> Json<Value> {
    let user = match user {
        Some(user) => user,
        None => return Json(json!({ "isAuthenticated": false })),
    };

    let state = &user.session.state;
    let identity = state.identity();
    let assertion = state.assertion();
    let access_token = state.access_token();

    let mut snapshot = json!({
        "isAuthenticated": true,
        "user": identity.profile,
        "idToken": identity.id_token,
        "idJagAssertion": assertion,
        "idJagAssertionClaims": decoded_or_null(assertion, jwt::decode_claims),
        "idJagAssertionHeader": decoded_or_null(assertion, jwt::decode_header),
        "accessToken": access_token,
        "accessTokenClaims": decoded_or_null(access_token, jwt::decode_claims),
        "accessTokenHeader": decoded_or_null(access_token, jwt::decode_header),
        "oktaClientId": config.okta.client_id,
        "oktaIssuer": config.okta.issuer,
        "auth0Domain": config.auth0.domain,
        "auth0ClientId": config.auth0.client_id,
    });

    // Optional configuration is omitted outright, not serialized as null
    if let Some(audience) = &config.auth0.audience {
        snapshot["auth0Audience"] = json!(audience);
    }
    if let Some(scope) = &config.auth0.scope {
        snapshot["auth0Scope"] = json!(scope);
    }

    Json(snapshot)
}
