// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the Turbo Badges client
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the client. The configuration is backed by a
//! YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The configuration is organized as a nested structure with sections:
//! - `api`: Where the remote API lives and request timeouts
//! - `session`: Renewal scheduling of the access credential
//! - `upload`: Client-side limits for profile photo uploads
//!
//! ## Precedence
//!
//! Values from the file are overridden by the `TURBO_BADGES_API_URL`
//! environment variable, which is in turn overridden by command line
//! arguments.
//!
//! ## Usage
//!
//! ```no_run
//! use turbo_badges::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("turbo_badges.yaml")).unwrap();
//!
//! // Environment first, then command line overrides
//! config.apply_env();
//! config.apply_args(Some("https://badges.example.com/api".to_string()), None);
//!
//! println!("API base URL: {}", config.api.base_url);
//! ```

pub mod api;
pub mod session;
pub mod upload;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use api::ApiConfig;
pub use session::SessionConfig;
pub use upload::{UploadConfig, DEFAULT_MAX_PHOTO_BYTES};
pub use utils::{output_config_schema, validate_specific_rules};

/// Environment variable supplying the API base URL
pub const API_URL_ENV: &str = "TURBO_BADGES_API_URL";

/// Root configuration structure for the Turbo Badges client.
///
/// The configuration is designed to be deserialized from and serialized to
/// YAML using serde. Each section falls back to its defaults when absent, so
/// an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API location and timeouts.
    #[serde(default)]
    pub api: ApiConfig,

    /// Session manager settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Profile photo upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        // Create parent directories if they don't exist
        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with default values. A file that fails
    /// schema or rule validation leaves a `*.sample.yaml` next to it and
    /// returns an error.
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

        // An empty document means "all defaults"
        let json_value = match yaml_value {
            serde_yml::Value::Null => serde_json::Value::Object(Default::default()),
            other => serde_json::to_value(&other).with_context(|| {
                format!("Failed to convert YAML to JSON for validation: {:?}", path)
            })?,
        };

        debug!("Validating {} configuration against schema", path.display());
        if let Err(err) = utils::validate_against_schema(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            return Err(err);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_json::from_value(json_value) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        // Perform additional specific validations
        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
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

    /// Validate an in-memory configuration against the schema and the
    /// additional rules.
    pub fn validate(&self) -> Result<()> {
        let json_value =
            serde_json::to_value(self).context("Failed to convert configuration to JSON")?;
        utils::validate_against_schema(&json_value)?;
        validate_specific_rules(self)
    }

    /// Override the API base URL from the `TURBO_BADGES_API_URL` environment
    /// variable when it is set and not blank.
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var(API_URL_ENV) {
            if !base_url.trim().is_empty() {
                debug!("Overriding API base URL from {}: {}", API_URL_ENV, base_url);
                self.api.base_url = base_url.trim().to_string();
            }
        }
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `api_url` - Base URL of the remote API
    /// * `renewal_lead_secs` - Seconds before expiry at which the credential is renewed
    pub fn apply_args(&mut self, api_url: Option<String>, renewal_lead_secs: Option<i64>) {
        if let Some(api_url) = api_url {
            debug!("Overriding API base URL from command line: {}", api_url);
            self.api.base_url = api_url;
        }

        if let Some(lead) = renewal_lead_secs {
            debug!("Overriding renewal lead from command line: {}s", lead);
            self.session.renewal_lead_secs = lead;
        }
    }
}
