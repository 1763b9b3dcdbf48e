// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Profile photo upload limits

use serde::{Deserialize, Serialize};

/// Largest profile photo accepted by default (5 MiB)
pub const DEFAULT_MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// Client-side checks applied before a photo is sent to the API.
///
/// # Fields
///
/// * `max_photo_bytes` - Maximum size of an uploaded photo (default: 5 MiB)
/// * `accepted_media_prefix` - Prefix the declared media type must start with (default: `image/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_photo_bytes: u64,
    pub accepted_media_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            accepted_media_prefix: "image/".to_string(),
        }
    }
}
