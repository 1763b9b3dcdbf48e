// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Request and response envelopes of the authentication endpoints

use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Body of a successful `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

/// Body of a successful `POST /auth/local`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Body of `POST /auth/local`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a successful `PUT /auth/profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// Body of a successful `PUT /auth/profile/photo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPhotoResponse {
    pub user: UserProfile,

    /// Public URL of the stored photo, when the server provides one
    #[serde(default)]
    pub url: Option<String>,
}

/// Error body returned by the API alongside a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Partial profile update, absent fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UpdateProfileInput {
    pub fn new(first_name: Option<String>, last_name: Option<String>) -> Self {
        Self {
            first_name,
            last_name,
        }
    }

    /// True when neither field is provided
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}
