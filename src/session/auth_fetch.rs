// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authenticated requests with a single silent re-authentication
//!
//! [`SessionManager::auth_fetch`] runs a fixed sequence:
//!
//! 1. send the request with the current credential (if any),
//! 2. anything but 401 is returned as is,
//! 3. on 401 renew the credential once,
//! 4. renewal failed: return the original 401 untouched,
//! 5. renewal succeeded: send the request once more with the new credential
//!    and return whatever comes back.
//!
//! There is never a second retry, so a credential expiring again during the
//! retry is reported to the caller as a plain 401.

use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use super::{SessionError, SessionManager};

/// Body of an [`ApiRequest`]
///
/// Bodies are kept as plain data so the request can be rebuilt for the retry.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Single-file multipart form
    File {
        field: String,
        file_name: String,
        media_type: String,
        bytes: Vec<u8>,
    },
}

/// A request that can be replayed
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, SessionError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a single file as a multipart form field
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = RequestBody::File {
            field: field.into(),
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        };
        self
    }

    fn build(
        &self,
        session: &SessionManager,
        credential: Option<&str>,
    ) -> Result<RequestBuilder, SessionError> {
        let mut builder = session
            .client()
            .request(self.method.clone(), self.url.as_str());

        if let Some(credential) = credential {
            builder = builder.bearer_auth(credential);
        }

        builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File {
                field,
                file_name,
                media_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(media_type)?;
                builder.multipart(Form::new().part(field.clone(), part))
            }
        };

        Ok(builder)
    }
}

impl SessionManager {
    /// Send `request` with the current credential, renewing it and retrying
    /// once if the API answers 401.
    ///
    /// Non-success statuses other than 401 are returned, not raised. Errors
    /// only come from the transport or from building the request.
    pub async fn auth_fetch(&self, request: &ApiRequest) -> Result<Response, SessionError> {
        let credential = self.access_credential().await;
        let response = self.send_once(request, credential.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(
            "{} {} rejected as unauthorized, renewing the credential",
            request.method, request.url
        );
        let renewed = match self.refresh().await {
            Some(renewed) => renewed,
            None => {
                debug!("Renewal failed, returning the original 401");
                return Ok(response);
            }
        };

        debug!("Retrying {} {} with the renewed credential", request.method, request.url);
        self.send_once(request, Some(&renewed)).await
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        credential: Option<&str>,
    ) -> Result<Response, SessionError> {
        Ok(request.build(self, credential)?.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_is_kept_as_value() {
        let request = ApiRequest::put("http://api/auth/profile")
            .json(&serde_json::json!({ "firstName": "Jane" }))
            .unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.body,
            RequestBody::Json(serde_json::json!({ "firstName": "Jane" }))
        );
    }

    #[test]
    fn test_request_is_replayable() {
        let request = ApiRequest::put("http://api/auth/profile/photo").file(
            "photo",
            "me.png",
            "image/png",
            vec![1, 2, 3],
        );
        let replay = request.clone();
        assert_eq!(request, replay);
    }
}
