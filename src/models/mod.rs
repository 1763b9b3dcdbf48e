// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Data exchanged with the Turbo Badges API
//!
//! - `user`: the user profile and its role
//! - `api`: request and response envelopes of the authentication endpoints

pub mod api;
pub mod user;

pub use api::{
    ApiError, LocalLoginRequest, LoginResponse, RefreshTokenResponse, UpdateProfileInput,
    UploadPhotoResponse, UserResponse,
};
pub use user::{Role, UserProfile};
