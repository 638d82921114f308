// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server configuration
//!
//! Network binding, the externally visible base URL (used to build the OIDC
//! redirect URI) and the secret protecting the private session cookie.

use serde::{Deserialize, Serialize};

/// Configuration for the demonstration web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The TCP port the server will listen on. Valid range is 1-65534.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or "localhost". Use "0.0.0.0" to bind to
    /// all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,

    /// The server name reported in logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Externally visible base URL of this application, without a trailing
    /// slash. The OIDC redirect URI is `{base_url}/login/callback` and must
    /// match what is registered at the enterprise IDP.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret protecting the private session cookie, a base64-encoded value
    /// of at least 32 bytes. The default is for development only.
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
}

fn default_port() -> u16 {
    8080
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_name() -> String {
    concat!("CrossAppAccessServer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_session_secret() -> String {
    // base64 of 32 development bytes; replace in any real deployment
    "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=".to_string()
}

impl ServerConfig {
    /// Redirect URI registered at the enterprise IDP for the login callback.
    pub fn redirect_uri(&self) -> String {
        format!("{}/login/callback", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            name: default_name(),
            base_url: default_base_url(),
            session_secret: default_session_secret(),
        }
    }
}
