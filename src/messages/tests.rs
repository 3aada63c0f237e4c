//! Tests for the contact inbox

use axum::{http::StatusCode, Extension};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::SubmitMessageRequest;
use super::services::ContactMessageService;
use super::*;
use crate::auth::test_support::sign_up_user;
use crate::common::state::test_support::{send_json, test_state};
use crate::common::ApiError;

fn submission(subject: &str) -> SubmitMessageRequest {
    SubmitMessageRequest {
        name: "Visitor".to_string(),
        email: "Visitor@Example.com".to_string(),
        phone: Some("  ".to_string()),
        subject: subject.to_string(),
        message: "What time is the Sunday service?".to_string(),
    }
}

#[tokio::test]
async fn test_submit_and_read_flags() {
    let state = test_state().await;
    let service = ContactMessageService::new(state.db.clone());

    let first = service.submit(submission("Service times")).await.unwrap();
    assert!(!first.is_read);
    assert_eq!(first.email, "visitor@example.com");
    assert!(first.phone.is_none());
    service.submit(submission("Prayer request")).await.unwrap();

    assert_eq!(service.unread_count().await.unwrap(), 2);

    let read = service.set_read(&first.id, true).await.unwrap();
    assert!(read.is_read);
    assert_eq!(service.unread_count().await.unwrap(), 1);
    assert_eq!(service.list(true).await.unwrap().len(), 1);

    let inbox = service.list(false).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].subject, "Prayer request");

    service.set_read(&first.id, false).await.unwrap();
    assert_eq!(service.unread_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_invalid_submission_rejected() {
    let state = test_state().await;
    let service = ContactMessageService::new(state.db.clone());

    let mut bad = submission("Hello");
    bad.email = "not-an-email".to_string();
    assert!(matches!(service.submit(bad).await, Err(ApiError::ValidationError(_))));

    let mut empty = submission("Hello");
    empty.message = "   ".to_string();
    assert!(matches!(service.submit(empty).await, Err(ApiError::ValidationError(_))));
}

#[tokio::test]
async fn test_delete_missing_message() {
    let state = test_state().await;
    let service = ContactMessageService::new(state.db.clone());
    assert!(matches!(service.delete("M_MISSING0").await, Err(ApiError::NotFound(_))));
    assert!(matches!(
        service.set_read("M_MISSING0", true).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_public_submit_and_admin_inbox() {
    let state = test_state().await;
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let app = message_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let payload = json!({
        "name": "Visitor",
        "email": "visitor@example.com",
        "subject": "Hello",
        "message": "Looking forward to Sunday"
    });
    let (status, body) = send_json(&app, "POST", "/api/contact", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, _) = send_json(&app, "GET", "/api/admin/messages", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, count) =
        send_json(&app, "GET", "/api/admin/messages/unread/count", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 1);
}
