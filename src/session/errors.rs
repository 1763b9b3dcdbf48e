// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Errors surfaced by the session manager
//!
//! Only operations the user initiated surface errors: profile mutations,
//! photo uploads and local login. Renewal and bootstrap failures degrade the
//! session to unauthenticated instead.

use reqwest::StatusCode;
use thiserror::Error;

/// Reasons a photo is refused before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhotoValidationError {
    #[error("Please select an image file (got '{media_type}')")]
    NotAnImage { media_type: String },

    #[error("The image must not exceed {max_bytes} bytes (got {size} bytes)")]
    TooLarge { size: u64, max_bytes: u64 },
}

/// Errors of the session manager operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// Input refused client-side, no request was sent
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Photo(#[from] PhotoValidationError),

    /// The API answered with a non-success status
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    /// The request could not be completed or its body could not be read
    #[error("Request to the API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The session was signed out while the operation was running
    #[error("No authenticated user")]
    NotAuthenticated,
}

impl SessionError {
    /// True for failures detected before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, SessionError::Validation(_) | SessionError::Photo(_))
    }

    /// HTTP status of a server-side failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SessionError::Server { status, .. } => Some(*status),
            SessionError::Transport(err) => err.status(),
            _ => None,
        }
    }
}
