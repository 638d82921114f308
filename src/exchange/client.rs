// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Outbound token-endpoint client
//!
//! All calls to external authorization servers go through one shared
//! [`TokenClient`]: the authorization-code exchange at login, the
//! token-exchange grant (Operation A) and the JWT-bearer grant (Operation B).
//! Every call is a single blocking form POST with a request timeout; there
//! are no retries, the caller decides whether to re-invoke.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use crate::config::{Auth0Config, OktaConfig};

/// OAuth 2.0 token exchange grant type (RFC 8693).
pub const GRANT_TYPE_TOKEN_EXCHANGE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
/// OAuth 2.0 JWT-bearer grant type (RFC 7523).
pub const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Subject token type presented in Operation A: an OIDC id token.
pub const TOKEN_TYPE_ID_TOKEN: &str = "urn:ietf:params:oauth:token-type:id_token";
/// Requested token type of Operation A: an identity assertion authorization
/// grant (ID-JAG).
pub const TOKEN_TYPE_ID_JAG: &str = "urn:ietf:params:oauth:token-type:id-jag";

/// Timeout applied to every upstream token-endpoint call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body of a successful token-endpoint response. Only the fields the
/// flow consumes are modeled.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Shared HTTP client for the token endpoints of both providers.
pub struct TokenClient {
    http: reqwest::Client,
}

impl TokenClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }

    /// Exchange an authorization code for tokens at the enterprise IDP
    /// (login callback leg, not one of the caller-triggered operations).
    pub async fn authorization_code(
        &self,
        okta: &OktaConfig,
        redirect_uri: &str,
        code: &str,
    ) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", okta.client_id.as_str()),
            ("client_secret", okta.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ];

        debug!("Exchanging authorization code at {}", okta.token_endpoint());
        let response = self
            .http
            .post(okta.token_endpoint())
            .form(&params)
            .send()
            .await
            .context("Authorization code exchange request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Authorization code exchange rejected with status {}: {}",
                status,
                body
            );
        }

        response
            .json::<TokenResponse>()
            .await
            .context("Authorization code exchange returned a malformed body")
    }

    /// Operation A: exchange the user's id token for an ID-JAG delegation
    /// assertion at the enterprise IDP's token endpoint.
    pub async fn token_exchange(
        &self,
        okta: &OktaConfig,
        auth0: &Auth0Config,
        id_token: &str,
    ) -> Result<String, ApiError> {
        let audience = auth0.assertion_audience();
        let mut params = vec![
            ("grant_type", GRANT_TYPE_TOKEN_EXCHANGE),
            ("client_id", okta.client_id.as_str()),
            ("client_secret", okta.client_secret.as_str()),
            ("subject_token", id_token),
            ("subject_token_type", TOKEN_TYPE_ID_TOKEN),
            ("requested_token_type", TOKEN_TYPE_ID_JAG),
            ("audience", audience.as_str()),
        ];
        if let Some(resource) = &auth0.audience {
            params.push(("resource", resource.as_str()));
        }

        debug!("Requesting ID-JAG assertion from {}", okta.token_endpoint());
        self.grant_request(&okta.token_endpoint(), &params).await
    }

    /// Operation B: exchange the ID-JAG assertion for a resource access
    /// token at the Resource Application's authorization server.
    pub async fn jwt_bearer(
        &self,
        auth0: &Auth0Config,
        assertion: &str,
    ) -> Result<String, ApiError> {
        let mut params = vec![
            ("grant_type", GRANT_TYPE_JWT_BEARER),
            ("client_id", auth0.client_id.as_str()),
            ("client_secret", auth0.client_secret.as_str()),
            ("assertion", assertion),
        ];
        if let Some(scope) = &auth0.scope {
            params.push(("scope", scope.as_str()));
        }

        debug!("Requesting access token from {}", auth0.token_endpoint());
        self.grant_request(&auth0.token_endpoint(), &params).await
    }

    /// Send a form-encoded grant request and extract the issued token.
    ///
    /// A non-2xx upstream answer becomes [`ApiError::UpstreamRejected`]
    /// carrying the upstream body verbatim (wrapped as `{"error": <text>}`
    /// when it is not JSON). Transport failures and malformed success bodies
    /// become [`ApiError::Internal`].
    async fn grant_request(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        let response = self.http.post(url).form(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<serde_json::Value>(&text)
                .unwrap_or_else(|_| json!({ "error": text }));
            warn!("Token endpoint {} answered {}: {}", url, status, body);
            return Err(ApiError::UpstreamRejected(body));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Internal(anyhow!(err).context("Malformed token response")))?;

        tokens
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::Internal(anyhow!(
                    "Token endpoint {} answered success without an access_token",
                    url
                ))
            })
    }
}
