// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Enterprise identity provider (Okta) configuration
//!
//! The Requesting Application authenticates users against this provider and
//! later presents the resulting id token to its token endpoint in the
//! token-exchange grant (Operation A). The issuer is a full URL so the demo
//! can point at a local stub during tests.

use serde::{Deserialize, Serialize};

/// Configuration for the enterprise IDP the user signs in against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OktaConfig {
    /// Issuer base URL, e.g. `https://your-org.okta.com`, no trailing slash.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// OAuth2 client id of the Requesting Application at the IDP.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// OAuth2 client secret of the Requesting Application. Never exposed by
    /// the inspector endpoint.
    #[serde(default)]
    pub client_secret: String,
}

fn default_issuer() -> String {
    "https://your-org.okta.com".to_string()
}

fn default_client_id() -> String {
    "your-okta-client-id".to_string()
}

impl OktaConfig {
    /// Authorization endpoint for the OIDC login redirect.
    pub fn authorization_endpoint(&self) -> String {
        format!("{}/oauth2/v1/authorize", self.issuer.trim_end_matches('/'))
    }

    /// Token endpoint, used for both the authorization-code exchange at login
    /// and the token-exchange grant of Operation A.
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v1/token", self.issuer.trim_end_matches('/'))
    }
}

impl Default for OktaConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            client_id: default_client_id(),
            client_secret: String::new(),
        }
    }
}
