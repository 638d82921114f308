// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use base64::Engine;
use log::debug;

use super::Config;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// ### Example
///
/// ```bash
/// ./cross_app_access --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered
/// by the JSON schema.
///
/// ### Validation Rules
///
/// - **Port Range**: The server port must be within 1-65534
/// - **Bind Address**: Must be a valid IP address or special value
/// - **Base URL / Issuer**: Must parse as absolute http(s) URLs
/// - **Session Secret**: Must be base64 decoding to at least 32 bytes, since
///   it seeds the key that encrypts the private session cookie
/// - **Client Identifiers**: Must be non-empty for both providers
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.server.port < 1 || config.server.port > 65534 {
        anyhow::bail!("Server port must be between 1 and 65534");
    }

    if !is_valid_ip_address(&config.server.address) {
        anyhow::bail!("Invalid server bind address: {}", config.server.address);
    }

    let base_url = url::Url::parse(&config.server.base_url)
        .with_context(|| format!("Invalid server base_url: {}", config.server.base_url))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        anyhow::bail!("Server base_url must be an http(s) URL");
    }

    let issuer = url::Url::parse(&config.okta.issuer)
        .with_context(|| format!("Invalid Okta issuer URL: {}", config.okta.issuer))?;
    if !matches!(issuer.scheme(), "http" | "https") {
        anyhow::bail!("Okta issuer must be an http(s) URL");
    }

    let secret = base64::engine::general_purpose::STANDARD
        .decode(&config.server.session_secret)
        .context("Session secret is not valid base64")?;
    if secret.len() < 32 {
        anyhow::bail!(
            "Session secret must decode to at least 32 bytes, got {}",
            secret.len()
        );
    }

    if config.okta.client_id.is_empty() {
        anyhow::bail!("Okta client_id must not be empty");
    }

    if config.auth0.client_id.is_empty() {
        anyhow::bail!("Auth0 client_id must not be empty");
    }

    if config.auth0.domain.is_empty() {
        anyhow::bail!("Auth0 domain must not be empty");
    }

    Ok(())
}
