// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Resource Application (Auth0) configuration
//!
//! The authorization server that accepts the ID-JAG delegation assertion in a
//! JWT-bearer grant (Operation B) and issues access tokens for the Resource
//! Application's API.

use serde::{Deserialize, Serialize};

/// Configuration for the Resource Application's authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth0Config {
    /// Tenant domain, e.g. `your-tenant.us.auth0.com`. A full `http(s)://`
    /// URL is also accepted, which lets the integration tests point at a
    /// local stub; a bare domain is addressed over https.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// OAuth2 client id of the Requesting Application at the resource's
    /// authorization server.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// OAuth2 client secret. Never exposed by the inspector endpoint.
    #[serde(default)]
    pub client_secret: String,

    /// Optional resource audience override. When set it is forwarded as the
    /// `resource` parameter of the token-exchange grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// Optional scopes requested in the JWT-bearer grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_domain() -> String {
    "your-tenant.us.auth0.com".to_string()
}

fn default_client_id() -> String {
    "your-auth0-client-id".to_string()
}

impl Auth0Config {
    /// Base URL of the authorization server, no trailing slash.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.contains("://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }

    /// Audience of the delegation assertion requested in Operation A: the
    /// authorization server's base URL with a trailing slash.
    pub fn assertion_audience(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// Token endpoint for the JWT-bearer grant of Operation B.
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            client_id: default_client_id(),
            client_secret: String::new(),
            audience: None,
            scope: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_is_https() {
        let config = Auth0Config::default();
        assert_eq!(config.base_url(), "https://your-tenant.us.auth0.com");
        assert_eq!(
            config.assertion_audience(),
            "https://your-tenant.us.auth0.com/"
        );
        assert_eq!(
            config.token_endpoint(),
            "https://your-tenant.us.auth0.com/oauth/token"
        );
    }

    #[test]
    fn explicit_scheme_is_preserved() {
        let config = Auth0Config {
            domain: "http://127.0.0.1:9099".to_string(),
            ..Auth0Config::default()
        };
        assert_eq!(config.token_endpoint(), "http://127.0.0.1:9099/oauth/token");
        assert_eq!(config.assertion_audience(), "http://127.0.0.1:9099/");
    }
}
