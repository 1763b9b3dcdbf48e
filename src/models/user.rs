// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! User profile structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named permission tier attached to a user
///
/// Role names are compared case-insensitively everywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Server-assigned role identifier
    pub id: String,

    /// Role name, one of `admin`, `agent` or `user`
    pub name: String,
}

impl Role {
    /// Case-insensitive comparison of the role name
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The authenticated user's profile as returned by the API
///
/// A profile is never patched on the client. Every successful fetch or
/// mutation replaces it with the server's representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque, server-assigned identifier
    pub id: String,

    /// Email address (not editable through this client)
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Role of the user (read-only)
    pub role: Role,

    /// Server-side filename or URL of the profile photo
    #[serde(
        default,
        rename = "photoFilename",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// "First Last" display name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive check of the user's role name
    pub fn has_role(&self, name: &str) -> bool {
        self.role.is(name)
    }
}
