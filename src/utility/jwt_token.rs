// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Access credential decoding
//!
//! The access credential handed out by the API is a JWT. The client never
//! verifies its signature: it only peeks at the payload to learn when the
//! credential expires so that a renewal can be scheduled ahead of time.
//!
//! Decoding is lossy. A credential that is not a three-part
//! dot-delimited token, whose payload is not base64url, or whose payload is
//! not a JSON object decodes to an empty [`CredentialPayload`]. Callers treat
//! "no expiry known" as a normal outcome.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use log::debug;
use serde_json::Value;

use crate::models::Role;

/// Claims the client cares about in an access credential payload.
///
/// # Examples
///
/// ```
/// use turbo_badges::utility::jwt_token::decode_credential;
///
/// let payload = decode_credential("not-a-token");
/// assert!(payload.exp.is_none());
/// assert!(payload.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialPayload {
    /// Expiration time in seconds since the Unix epoch
    pub exp: Option<i64>,

    /// User identifier claim, when the issuer includes it
    pub id: Option<String>,

    /// Role claim, when the issuer includes it
    pub role: Option<Role>,
}

impl CredentialPayload {
    /// True when nothing could be learned from the credential
    pub fn is_empty(&self) -> bool {
        self.exp.is_none() && self.id.is_none() && self.role.is_none()
    }
}

/// Decode the payload of an access credential without verifying it.
///
/// Never fails: any structural problem yields an empty payload.
pub fn decode_credential(credential: &str) -> CredentialPayload {
    match decode_payload_object(credential) {
        Some(object) => payload_from_object(&object),
        None => {
            debug!("Access credential payload could not be decoded, no expiry known");
            CredentialPayload::default()
        }
    }
}

fn decode_payload_object(credential: &str) -> Option<serde_json::Map<String, Value>> {
    let parts: Vec<&str> = credential.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let encoded = parts[1].trim_end_matches('=');
    // Issuers are supposed to use the URL-safe alphabet, some still emit the standard one
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(object) => Some(object),
        _ => None,
    }
}

fn payload_from_object(object: &serde_json::Map<String, Value>) -> CredentialPayload {
    let exp = object.get("exp").and_then(|value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|seconds| seconds.floor() as i64))
    });

    let id = object.get("id").and_then(|value| match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    });

    let role = object
        .get("role")
        .and_then(|value| serde_json::from_value::<Role>(value.clone()).ok());

    CredentialPayload { exp, id, role }
}
