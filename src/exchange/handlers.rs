// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Exchange operation endpoints
//!
//! The two caller-triggered steps of the delegation flow. Each one is an
//! authenticated POST with an empty body that performs exactly one upstream
//! call and, on success, advances the session's [`FlowState`]. The steps are
//! never chained automatically: the client invokes Operation A, observes the
//! result, then invokes Operation B.
//!
//! [`FlowState`]: crate::session::FlowState

use std::sync::Arc;

use log::info;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;

use super::client::TokenClient;
use super::error::ApiError;
use crate::config::Config;
use crate::session::{SessionStore, SessionUser};

/// Body of a successful exchange response.
#[derive(Debug, Serialize)]
pub struct ExchangeSuccess {
    pub success: bool,
}

/// Operation A: trade the session's id token for an ID-JAG delegation
/// assertion at the enterprise IDP.
///
/// Precondition: the authenticated session holds a non-empty id token.
/// On success the assertion is stored in the session (overwriting any
/// previous one); on failure the session is left untouched.
#[post("/okta-token-exchange")]
pub async fn okta_token_exchange(
    user: SessionUser,
    store: &State<SessionStore>,
    config: &State<Arc<Config>>,
    client: &State<TokenClient>,
) -> Result<Json<ExchangeSuccess>, ApiError> {
    let id_token = user.session.state.identity().id_token.clone();
    if id_token.is_empty() {
        return Err(ApiError::MissingArtifact("ID token not found in session"));
    }

    let assertion = client
        .token_exchange(&config.okta, &config.auth0, &id_token)
        .await?;

    info!("Session {}: obtained ID-JAG assertion", user.session_id);
    store.put_assertion(user.session_id, assertion);

    Ok(Json(ExchangeSuccess { success: true }))
}

/// Operation B: trade the session's ID-JAG assertion for a resource access
/// token at the Resource Application's authorization server.
///
/// Precondition: Operation A has succeeded for this session. On success the
/// access token is stored in the session; on failure the session is left
/// untouched.
#[post("/auth0-jwt-bearer")]
pub async fn auth0_jwt_bearer(
    user: SessionUser,
    store: &State<SessionStore>,
    config: &State<Arc<Config>>,
    client: &State<TokenClient>,
) -> Result<Json<ExchangeSuccess>, ApiError> {
    let assertion = match user.session.state.assertion() {
        Some(assertion) => assertion.to_string(),
        None => {
            return Err(ApiError::MissingArtifact(
                "ID-JAG assertion not found in session",
            ))
        }
    };

    let access_token = client.jwt_bearer(&config.auth0, &assertion).await?;

    info!("Session {}: obtained resource access token", user.session_id);
    store.put_access_token(user.session_id, access_token);

    Ok(Json(ExchangeSuccess { success: true }))
}
