// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Profile mutations
//!
//! Both operations go through [`SessionManager::auth_fetch`] and, on
//! success, replace the current user with the profile returned by the
//! server. Nothing is merged client-side: the server response is
//! authoritative.

use std::path::Path;

use anyhow::Context;
use log::{debug, info};

use super::{error_from_response, ApiRequest, PhotoValidationError, SessionError, SessionManager};
use crate::config::UploadConfig;
use crate::models::{UpdateProfileInput, UploadPhotoResponse, UserProfile, UserResponse};

/// A photo selected by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub file_name: String,

    /// Declared media type, e.g. `image/png`
    pub media_type: String,

    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a photo from disk, declaring its media type from the extension
    /// unless one is given.
    pub fn from_path(path: &Path, media_type: Option<String>) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read photo at {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let media_type = media_type.unwrap_or_else(|| media_type_for(path).to_string());
        Ok(Self::new(file_name, media_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Media type guessed from a file extension
fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Check a photo against the upload limits without touching the network
pub fn validate_photo(
    photo: &PhotoUpload,
    limits: &UploadConfig,
) -> Result<(), PhotoValidationError> {
    if !photo
        .media_type
        .to_ascii_lowercase()
        .starts_with(&limits.accepted_media_prefix.to_ascii_lowercase())
    {
        return Err(PhotoValidationError::NotAnImage {
            media_type: photo.media_type.clone(),
        });
    }

    if photo.size() > limits.max_photo_bytes {
        return Err(PhotoValidationError::TooLarge {
            size: photo.size(),
            max_bytes: limits.max_photo_bytes,
        });
    }

    Ok(())
}

fn validate_update(input: &UpdateProfileInput) -> Result<UpdateProfileInput, SessionError> {
    let mut trimmed = UpdateProfileInput::default();
    for (value, slot) in [
        (&input.first_name, &mut trimmed.first_name),
        (&input.last_name, &mut trimmed.last_name),
    ] {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(SessionError::Validation(
                    "First name and last name cannot be empty".to_string(),
                ));
            }
            *slot = Some(value.trim().to_string());
        }
    }
    Ok(trimmed)
}

impl SessionManager {
    /// Update the user's first and/or last name.
    ///
    /// Concurrent calls are not serialized: the last response to arrive
    /// wins.
    pub async fn update_profile(
        &self,
        input: &UpdateProfileInput,
    ) -> Result<UserProfile, SessionError> {
        let input = validate_update(input)?;
        let request = ApiRequest::put(self.endpoint("/auth/profile")).json(&input)?;

        let response = self.auth_fetch(&request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Profile update failed").await);
        }

        let UserResponse { user } = response.json().await?;
        info!("Profile of {} updated", user.email);
        self.replace_user(user.clone()).await;
        Ok(user)
    }

    /// Upload a new profile photo.
    ///
    /// The photo is checked against the upload limits first; a refused photo
    /// never reaches the API. Returns the public URL of the stored photo
    /// when the server provides one.
    pub async fn upload_profile_photo(
        &self,
        photo: &PhotoUpload,
    ) -> Result<Option<String>, SessionError> {
        validate_photo(photo, self.upload_config())?;

        debug!(
            "Uploading {} ({} bytes, {})",
            photo.file_name,
            photo.size(),
            photo.media_type
        );
        let request = ApiRequest::put(self.endpoint("/auth/profile/photo")).file(
            "photo",
            photo.file_name.clone(),
            photo.media_type.clone(),
            photo.bytes.clone(),
        );

        let response = self.auth_fetch(&request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Photo upload failed").await);
        }

        let UploadPhotoResponse { user, url } = response.json().await?;
        info!("Profile photo of {} replaced", user.email);
        self.replace_user(user).await;
        Ok(url)
    }

    /// Reload the current user's profile from the API
    pub async fn reload_profile(&self) -> Result<UserProfile, SessionError> {
        let response = self
            .auth_fetch(&ApiRequest::get(self.endpoint("/auth/profile")))
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Profile fetch failed").await);
        }

        let user: UserProfile = response.json().await?;
        self.replace_user(user.clone()).await;
        Ok(user)
    }
}
