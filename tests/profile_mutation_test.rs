// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Integration tests for profile edits and photo uploads

mod common;

use common::{
    credential, mount_profile, profile_json, requests_to, session_for, setup, signed_in_session,
};
use serde_json::json;
use turbo_badges::models::{UpdateProfileInput, UserProfile};
use turbo_badges::session::{PhotoUpload, PhotoValidationError, SessionError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn test_update_profile_replaces_current_user() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;

    let mut updated = profile_json("u1", "Janet", "Doe", "user");
    updated["updatedAt"] = json!("2025-04-02T08:30:00Z");
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .and(body_json(json!({ "firstName": "Janet" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": updated })))
        .expect(1)
        .mount(&server)
        .await;

    let user = session
        .update_profile(&UpdateProfileInput::new(Some(" Janet ".to_string()), None))
        .await
        .unwrap();

    let expected: UserProfile = serde_json::from_value(updated).unwrap();
    assert_eq!(user, expected);
    assert_eq!(session.current_user().await, Some(expected));
}

#[tokio::test]
async fn test_update_profile_reports_server_message() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({
                "message": "First name is too long",
                "statusCode": 400
            })),
        )
        .mount(&server)
        .await;

    let err = session
        .update_profile(&UpdateProfileInput::new(Some("J".repeat(300)), None))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "First name is too long");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(
        session.current_user().await.map(|user| user.first_name),
        Some("Jane".to_string())
    );
}

#[tokio::test]
async fn test_update_profile_falls_back_to_generic_message() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = session
        .update_profile(&UpdateProfileInput::new(None, Some("Smith".to_string())))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Profile update failed");
}

#[tokio::test]
async fn test_blank_name_is_refused_locally() {
    setup();
    let server = MockServer::start().await;
    let session = session_for(&server);

    let err = session
        .update_profile(&UpdateProfileInput::new(Some("Jane".to_string()), Some("   ".to_string())))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_oversized_photo_never_reaches_the_api() {
    setup();
    let server = MockServer::start().await;
    let session = session_for(&server);

    let photo = PhotoUpload::new("huge.png", "image/png", vec![0; 6 * MIB]);
    let err = session.upload_profile_photo(&photo).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Photo(PhotoValidationError::TooLarge { .. })
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_non_image_never_reaches_the_api() {
    setup();
    let server = MockServer::start().await;
    let session = session_for(&server);

    let photo = PhotoUpload::new("notes.txt", "text/plain", b"hello".to_vec());
    let err = session.upload_profile_photo(&photo).await.unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(
        err,
        SessionError::Photo(PhotoValidationError::NotAnImage { .. })
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_photo_upload_replaces_current_user() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;

    // No timestamps and a new last name: only a full replacement matches
    let updated = json!({
        "id": "u1",
        "email": "jane@example.com",
        "firstName": "Jane",
        "lastName": "Doe-Smith",
        "role": { "id": "role-user", "name": "user" },
        "photoFilename": "u1-1712345678.png"
    });
    Mock::given(method("PUT"))
        .and(path("/auth/profile/photo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": updated,
            "url": "https://cdn.example.com/photos/u1-1712345678.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let photo = PhotoUpload::new("me.png", "image/png", vec![7; 2 * MIB]);
    let url = session.upload_profile_photo(&photo).await.unwrap();

    assert_eq!(
        url.as_deref(),
        Some("https://cdn.example.com/photos/u1-1712345678.png")
    );
    let expected: UserProfile = serde_json::from_value(updated).unwrap();
    let current = session.current_user().await.unwrap();
    assert_eq!(current, expected);
    assert_eq!(current.last_name, "Doe-Smith");
    assert!(current.created_at.is_none());
    assert!(current.updated_at.is_none());

    let requests = server.received_requests().await.unwrap_or_default();
    let upload = requests
        .iter()
        .find(|request| request.url.path() == "/auth/profile/photo")
        .unwrap();
    let content_type = upload
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"photo\""));
    assert!(body.contains("filename=\"me.png\""));
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[tokio::test]
async fn test_photo_upload_is_resent_after_renewal() {
    setup();
    let server = MockServer::start().await;
    let first = credential("u1", 3600);
    let renewed = credential("u1-renewed", 3600);

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": first })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": renewed.clone() })),
        )
        .mount(&server)
        .await;
    mount_profile(&server, &profile_json("u1", "Jane", "Doe", "user")).await;

    let session = session_for(&server);
    session.bootstrap().await;
    assert_eq!(session.access_credential().await, Some(first));

    let updated = json!({
        "id": "u1",
        "email": "jane@example.com",
        "firstName": "Jane",
        "lastName": "Renewed",
        "role": { "id": "role-user", "name": "user" },
        "photoFilename": "u1-1712345679.png"
    });
    Mock::given(method("PUT"))
        .and(path("/auth/profile/photo"))
        .and(header("authorization", format!("Bearer {}", renewed).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": updated,
            "url": "https://cdn.example.com/photos/u1-1712345679.png"
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile/photo"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let content: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let photo = PhotoUpload::new("me.png", "image/png", content.clone());
    let url = session.upload_profile_photo(&photo).await.unwrap();

    assert_eq!(
        url.as_deref(),
        Some("https://cdn.example.com/photos/u1-1712345679.png")
    );
    assert_eq!(session.access_credential().await, Some(renewed));
    let expected: UserProfile = serde_json::from_value(updated).unwrap();
    assert_eq!(session.current_user().await, Some(expected));

    let requests = server.received_requests().await.unwrap_or_default();
    let uploads: Vec<_> = requests
        .iter()
        .filter(|request| request.url.path() == "/auth/profile/photo")
        .collect();
    assert_eq!(uploads.len(), 2);
    for upload in uploads {
        let body = String::from_utf8_lossy(&upload.body);
        assert!(body.contains("name=\"photo\""));
        assert!(body.contains("filename=\"me.png\""));
        assert!(body.contains("Content-Type: image/png") || body.contains("content-type: image/png"));
        assert!(contains_bytes(&upload.body, &content));
    }
}

#[tokio::test]
async fn test_reload_profile_replaces_current_user() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;

    let changed = profile_json("u1", "Jane", "Roe", "agent");
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(changed.clone()))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let user = session.reload_profile().await.unwrap();

    let expected: UserProfile = serde_json::from_value(changed).unwrap();
    assert_eq!(user, expected);
    assert_eq!(session.current_user().await, Some(expected));
}

#[tokio::test]
async fn test_reload_profile_failure_keeps_user() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = session.reload_profile().await.unwrap_err();
    assert_eq!(err.to_string(), "Profile fetch failed");
    assert_eq!(
        session.current_user().await.map(|user| user.last_name),
        Some("Doe".to_string())
    );
}

#[tokio::test]
async fn test_photo_upload_failure_keeps_user() {
    setup();
    let server = MockServer::start().await;
    let session = signed_in_session(&server, &profile_json("u1", "Jane", "Doe", "user")).await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile/photo"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let photo = PhotoUpload::new("me.jpg", "image/jpeg", vec![1; 1024]);
    let err = session.upload_profile_photo(&photo).await.unwrap_err();

    assert_eq!(err.to_string(), "Photo upload failed");
    assert_eq!(requests_to(&server, "/auth/profile/photo").await, 1);
    assert!(session
        .current_user()
        .await
        .is_some_and(|user| user.photo_reference.is_none()));
}

#[tokio::test]
async fn test_photo_from_path_guesses_media_type() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("avatar.JPG");
    std::fs::write(&file, [0xFF, 0xD8, 0xFF]).unwrap();

    let photo = PhotoUpload::from_path(&file, None).unwrap();
    assert_eq!(photo.file_name, "avatar.JPG");
    assert_eq!(photo.media_type, "image/jpeg");
    assert_eq!(photo.size(), 3);

    assert!(PhotoUpload::from_path(&dir.path().join("missing.png"), None).is_err());
}
