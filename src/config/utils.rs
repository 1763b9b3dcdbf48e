// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use super::Config;

const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// # Example
///
/// ```bash
/// ./turbo_badges --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validate a JSON view of the configuration against the embedded schema.
pub fn validate_against_schema(json_value: &serde_json::Value) -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let validator = jsonschema::draft202012::options()
        .should_validate_formats(true)
        .build(&schema)?;

    if let Err(error) = validator.validate(json_value) {
        anyhow::bail!("Configuration validation failed: {}", error);
    }

    Ok(())
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **API base URL**: must parse as an absolute `http` or `https` URL
/// - **Request timeout**: must be at least one second
/// - **Renewal lead**: must not be negative
/// - **Upload limits**: the size limit must be positive and the media prefix not blank
///
/// # Returns
///
/// * `Ok(())` if all validations pass
/// * `Err(anyhow::Error)` with descriptive message if any validation fails
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let url = Url::parse(&config.api.base_url)
        .with_context(|| format!("Invalid API base URL: {}", config.api.base_url))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!(
            "API base URL must use http or https, got {}",
            url.scheme()
        );
    }
    if url.query().is_some() || url.fragment().is_some() {
        anyhow::bail!("API base URL must not carry a query or fragment");
    }

    if config.api.request_timeout_secs == 0 {
        anyhow::bail!("Request timeout must be at least one second");
    }

    if config.session.renewal_lead_secs < 0 {
        anyhow::bail!(
            "Invalid renewal lead: {}s",
            config.session.renewal_lead_secs
        );
    }

    if config.upload.max_photo_bytes == 0 {
        anyhow::bail!("Maximum photo size must be positive");
    }

    if config.upload.accepted_media_prefix.trim().is_empty() {
        anyhow::bail!("Accepted media prefix must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_rules() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://badges.example.com".to_string();
        assert!(validate_specific_rules(&config).is_err());

        config.api.base_url = "not a url".to_string();
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn test_rejects_negative_lead() {
        let mut config = Config::default();
        config.session.renewal_lead_secs = -5;
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn test_embedded_schema_is_valid_json() {
        let schema: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA).unwrap();
        assert!(schema.get("properties").is_some());
    }
}
