use anyhow::Result;
use cross_app_access::config::Config;
use tempfile::tempdir;

#[test]
fn test_config_load_and_save() -> Result<()> {
    // Create a temporary directory
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Create a custom config
    let mut config = Config::default();
    config.server.port = 8081;
    config.server.address = "0.0.0.0".to_string();
    config.server.name = "TestServer".to_string();
    config.okta.issuer = "https://login.example.com".to_string();
    config.okta.client_id = "demo-client".to_string();
    config.auth0.domain = "demo.eu.auth0.com".to_string();
    config.auth0.scope = Some("read:notes".to_string());

    // Save config to file
    config.save_to_file(&config_path)?;

    // Load config from file
    let loaded_config = Config::from_file(&config_path)?;

    // Verify loaded config matches original
    assert_eq!(loaded_config.server.port, 8081);
    assert_eq!(loaded_config.server.address, "0.0.0.0");
    assert_eq!(loaded_config.server.name, "TestServer");
    assert_eq!(loaded_config.okta.issuer, "https://login.example.com");
    assert_eq!(loaded_config.okta.client_id, "demo-client");
    assert_eq!(loaded_config.auth0.domain, "demo.eu.auth0.com");
    assert_eq!(loaded_config.auth0.scope.as_deref(), Some("read:notes"));

    // Test loading default config for non-existent file
    let non_existent_path = temp_dir.path().join("non_existent.yaml");
    let default_config = Config::from_file(&non_existent_path)?;

    // Verify default config was created
    assert!(non_existent_path.exists());
    assert_eq!(default_config.server.port, 8080);
    assert_eq!(default_config.server.address, "127.0.0.1");
    assert_eq!(default_config.server.base_url, "http://localhost:8080");

    // Test apply_args method
    let mut config = Config::default();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.address, "127.0.0.1");

    // Apply command-line arguments
    config.apply_args(Some(9000), Some("0.0.0.0".to_string()));

    // Verify values were overridden
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.address, "0.0.0.0");

    // Absent arguments leave the configured values alone
    config.apply_args(None, None);
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.address, "0.0.0.0");

    Ok(())
}

#[test]
fn test_schema_validation() -> Result<()> {
    let temp_dir = tempdir()?;

    // Port outside the allowed range (schema specifies minimum as 1)
    let config_path = temp_dir.path().join("bad_port.yaml");
    std::fs::write(&config_path, "server:\n  port: 0\n")?;
    assert!(Config::from_file(&config_path).is_err());

    // Unknown top-level sections are rejected
    let config_path = temp_dir.path().join("unknown_section.yaml");
    std::fs::write(&config_path, "resource_server:\n  enabled: true\n")?;
    assert!(Config::from_file(&config_path).is_err());

    Ok(())
}

#[test]
fn test_config_validation() -> Result<()> {
    // Default config is valid
    assert!(Config::default().validate().is_ok());

    // Session secret must be base64 of at least 32 bytes
    let mut config = Config::default();
    config.server.session_secret = "dG9vLXNob3J0".to_string(); // "too-short"
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.session_secret = "not base64 at all!!".to_string();
    assert!(config.validate().is_err());

    // Issuer must be an absolute http(s) URL
    let mut config = Config::default();
    config.okta.issuer = "your-org.okta.com".to_string();
    assert!(config.validate().is_err());

    // Bind address must be an IP address, not a hostname
    let mut config = Config::default();
    config.server.address = "not-an-address.example".to_string();
    assert!(config.validate().is_err());

    // Client ids must be non-empty
    let mut config = Config::default();
    config.auth0.client_id = String::new();
    assert!(config.validate().is_err());

    Ok(())
}
