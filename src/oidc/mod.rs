// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Enterprise IDP login handshake
//!
//! OpenID Connect authorization-code flow against the configured enterprise
//! IDP. `/login` redirects the browser to the IDP's authorization endpoint
//! with a fresh `state`/`nonce` pair held in a private cookie; the callback
//! verifies `state`, exchanges the code at the token endpoint and places the
//! resulting [`AuthenticatedIdentity`] into the session store. `/logout`
//! tears the session down in one step.
//!
//! The id token's claims are read with the inspection decoder: the token was
//! just received from the issuer's token endpoint over TLS, which is the
//! trust anchor of this demo. Any failure along the callback path logs the
//! detail and sends the browser back to `/login`.

use std::sync::Arc;

use log::{debug, info, warn};
use rand::distr::Alphanumeric;
use rand::Rng;
use rocket::get;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::response::Redirect;
use rocket::State;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::exchange::TokenClient;
use crate::jwt;
use crate::session::{AuthenticatedIdentity, SessionStore, UserProfile, SESSION_COOKIE};

/// Private cookie holding the state/nonce pair across the login redirect.
const LOGIN_COOKIE: &str = "oidc_login";

/// Scopes requested from the enterprise IDP.
const OIDC_SCOPE: &str = "openid profile email";

#[derive(Debug, Serialize, Deserialize)]
struct LoginRequest {
    state: String,
    nonce: String,
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the IDP authorization URL for the login redirect.
fn authorization_url(config: &Config, state: &str, nonce: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&config.okta.authorization_endpoint())?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.okta.client_id)
        .append_pair("response_type", "code")
        .append_pair("scope", OIDC_SCOPE)
        .append_pair("redirect_uri", &config.server.redirect_uri())
        .append_pair("state", state)
        .append_pair("nonce", nonce);
    Ok(url)
}

/// Initiate the OIDC login: remember state/nonce and redirect to the IDP.
#[get("/login")]
pub fn login(
    config: &State<Arc<Config>>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Status> {
    let request = LoginRequest {
        state: random_token(),
        nonce: random_token(),
    };

    let url = authorization_url(config, &request.state, &request.nonce).map_err(|err| {
        warn!("Cannot build authorization URL: {}", err);
        Status::InternalServerError
    })?;

    let value = serde_json::to_string(&request).map_err(|err| {
        warn!("Cannot encode login cookie: {}", err);
        Status::InternalServerError
    })?;
    cookies.add_private(Cookie::new(LOGIN_COOKIE, value));

    debug!("Redirecting to IDP authorization endpoint");
    Ok(Redirect::to(url.to_string()))
}

/// Handle the redirect back from the IDP.
///
/// Verifies the `state` parameter against the login cookie, exchanges the
/// authorization code, derives the user profile from the id token claims and
/// creates the session. Mirrors the original demo's behavior on failure:
/// back to `/login` to start over.
#[get("/login/callback?<code>&<state>")]
pub async fn login_callback(
    code: Option<String>,
    state: Option<String>,
    config: &State<Arc<Config>>,
    store: &State<SessionStore>,
    client: &State<TokenClient>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    let failure = Redirect::to("/login");

    let login_cookie = match cookies.get_private(LOGIN_COOKIE) {
        Some(cookie) => cookie,
        None => {
            warn!("Login callback without a pending login");
            return failure;
        }
    };
    cookies.remove_private(LOGIN_COOKIE);

    let request: LoginRequest = match serde_json::from_str(login_cookie.value()) {
        Ok(request) => request,
        Err(err) => {
            warn!("Malformed login cookie: {}", err);
            return failure;
        }
    };

    let (code, state) = match (code, state) {
        (Some(code), Some(state)) => (code, state),
        _ => {
            warn!("Login callback missing code or state parameter");
            return failure;
        }
    };

    if state != request.state {
        warn!("Login callback state mismatch");
        return failure;
    }

    let tokens = match client
        .authorization_code(&config.okta, &config.server.redirect_uri(), &code)
        .await
    {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!("Authorization code exchange failed: {:#}", err);
            return failure;
        }
    };

    let id_token = match tokens.id_token {
        Some(token) if !token.is_empty() => token,
        _ => {
            warn!("Token endpoint response carried no id token");
            return failure;
        }
    };

    let claims = match jwt::decode_claims(&id_token) {
        Some(claims) => claims,
        None => {
            warn!("Received an undecodable id token");
            return failure;
        }
    };

    // The nonce claim, when the issuer echoes one, must match what we sent.
    if let Some(nonce) = claims.get("nonce").and_then(|v| v.as_str()) {
        if nonce != request.nonce {
            warn!("Login callback nonce mismatch");
            return failure;
        }
    }

    let profile = UserProfile::from_claims(&claims);
    info!(
        "Enterprise login completed for {}",
        profile.email.as_deref().unwrap_or("<no email claim>")
    );

    // A re-login replaces any previous session outright.
    if let Some(previous) = cookies.get_private(SESSION_COOKIE) {
        if let Ok(previous_id) = Uuid::parse_str(previous.value()) {
            store.remove(previous_id);
        }
    }

    let session_id = store.create(AuthenticatedIdentity { profile, id_token });
    cookies.add_private(Cookie::new(SESSION_COOKIE, session_id.to_string()));

    Redirect::to("/")
}

/// Destroy the session and every flow artifact it holds.
#[get("/logout")]
pub fn logout(store: &State<SessionStore>, cookies: &CookieJar<'_>) -> Redirect {
    if let Some(cookie) = cookies.get_private(SESSION_COOKIE) {
        if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
            store.remove(session_id);
            info!("Logged out session {}", session_id);
        }
    }
    cookies.remove_private(SESSION_COOKIE);
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn authorization_url_carries_oidc_parameters() {
        let config = Config::default();
        let url = authorization_url(&config, "state-1", "nonce-1").unwrap();

        assert!(url
            .as_str()
            .starts_with(&config.okta.authorization_endpoint()));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("scope"), Some(OIDC_SCOPE));
        assert_eq!(get("state"), Some("state-1"));
        assert_eq!(get("nonce"), Some("nonce-1"));
        assert_eq!(
            get("redirect_uri"),
            Some("http://localhost:8080/login/callback")
        );
    }

    #[test]
    fn random_tokens_are_distinct() {
        assert_ne!(random_token(), random_token());
        assert_eq!(random_token().len(), 32);
    }
}
