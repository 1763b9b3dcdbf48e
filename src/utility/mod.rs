// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Utility module for common utilities used throughout the project

pub mod jwt_token;

// Re-exports for use in other modules
pub use jwt_token::{decode_credential, CredentialPayload};

/// Current wall-clock time as seconds since the Unix epoch.
pub fn epoch_now() -> i64 {
    chrono::Utc::now().timestamp()
}
