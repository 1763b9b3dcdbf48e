// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Session lifecycle configuration

use serde::{Deserialize, Serialize};

/// Settings of the session manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How many seconds before the credential expires the renewal fires.
    ///
    /// Default is 60 seconds.
    pub renewal_lead_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_lead_secs: 60,
        }
    }
}
