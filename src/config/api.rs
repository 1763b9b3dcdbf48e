// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Remote API configuration
//!
//! This module defines where the Turbo Badges API lives and how long the
//! client waits for it.

use serde::{Deserialize, Serialize};

/// Configuration of the remote API the session manager talks to.
///
/// # Example
///
/// ```
/// use turbo_badges::config::ApiConfig;
///
/// let api = ApiConfig {
///     base_url: "https://badges.example.com/api/".to_string(),
///     request_timeout_secs: 10,
/// };
/// assert_eq!(api.endpoint("/auth/refresh"), "https://badges.example.com/api/auth/refresh");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, every endpoint path is appended to it.
    ///
    /// Can be overridden with the `TURBO_BADGES_API_URL` environment variable.
    pub base_url: String,

    /// Timeout applied to every HTTP request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Join an endpoint path to the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
