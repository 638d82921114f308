// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the Cross App Access demonstration server
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The configuration is organized as a nested structure with sections:
//! - `server`: Network binding, base URL and session cookie secret
//! - `okta`: The enterprise identity provider the user signs in against
//! - `auth0`: The Resource Application's authorization server
//!
//! ## Usage
//!
//! ```no_run
//! use cross_app_access::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(Some(8081), Some("0.0.0.0".to_string()));
//!
//! // Access configuration values
//! println!("Server port: {}", config.server.port);
//! ```

pub mod auth0;
pub mod okta;
pub mod server;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use auth0::Auth0Config;
pub use okta::OktaConfig;
pub use server::ServerConfig;
pub use utils::{is_valid_ip_address, output_config_schema};

/// Root configuration structure for the demonstration server.
///
/// Designed to be deserialized from and serialized to YAML using the serde
/// framework and validated against a JSON schema before use. Each section
/// falls back to default values when not present in the configuration file,
/// allowing for minimal configuration files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the web server component.
    #[serde(default)]
    pub server: ServerConfig,

    /// Enterprise IDP settings (login handshake and Operation A).
    #[serde(default)]
    pub okta: OktaConfig,

    /// Resource Application authorization server settings (Operation B).
    #[serde(default)]
    pub auth0: Auth0Config,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file is not an error: a default configuration is written to
    /// the given path and returned, so a first run produces an editable
    /// template. An existing file is schema-validated before deserialization
    /// and then checked against the rules the schema cannot express.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        debug!("Validating {} configuration against schema", path.display());
        Self::validate_json(&json_value)?;

        // Now that YAML has been validated, deserialize to Config
        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = serde_yml::from_str(&contents).with_context(|| {
            format!("Failed to deserialize configuration from {}", path.display())
        })?;

        // Perform additional specific validations
        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            return Err(err);
        }

        Ok(config)
    }

    /// Validate this configuration (schema plus specific rules).
    pub fn validate(&self) -> Result<()> {
        let json_value =
            serde_json::to_value(self).context("Failed to serialize configuration")?;
        Self::validate_json(&json_value)?;
        utils::validate_specific_rules(self)
    }

    fn validate_json(json_value: &serde_json::Value) -> Result<()> {
        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        if let Err(error) = validator.validate(json_value) {
            anyhow::bail!("Configuration validation failed: {}", error);
        }
        Ok(())
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line overrides to the loaded configuration.
    pub fn apply_args(&mut self, port: Option<u16>, address: Option<String>) {
        if let Some(port) = port {
            debug!("Overriding server port from command line: {}", port);
            self.server.port = port;
        }
        if let Some(address) = address {
            debug!("Overriding server address from command line: {}", address);
            self.server.address = address;
        }
    }
}
