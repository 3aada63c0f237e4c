//! Tests for events module

use axum::{http::StatusCode, Extension, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{CreateEventRequest, UpdateEventRequest};
use super::services::EventService;
use super::*;
use crate::auth::test_support::sign_up_user;
use crate::common::state::test_support::{send_json, test_state};
use crate::common::ApiError;

fn event(title: &str, date: &str, active: bool) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: Some("Bring a friend".to_string()),
        event_date: date.to_string(),
        start_time: Some("10:00".to_string()),
        end_time: Some("12:00".to_string()),
        location: Some("Main hall".to_string()),
        image_url: None,
        album_id: None,
        video_id: None,
        is_active: active,
        display_order: 0,
    }
}

#[tokio::test]
async fn test_active_list_ascending_and_admin_list_descending() {
    let state = test_state().await;
    let service = EventService::new(state.db.clone());

    service.create_event(event("Easter", "2030-04-20", true)).await.unwrap();
    service.create_event(event("Retreat", "2030-02-01", true)).await.unwrap();
    service.create_event(event("Draft", "2030-03-01", false)).await.unwrap();

    let active: Vec<String> = service
        .list_active(None)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(active, vec!["Retreat", "Easter"]);

    let all: Vec<String> = service
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(all, vec!["Easter", "Draft", "Retreat"]);
}

#[tokio::test]
async fn test_upcoming_filter_drops_past_events() {
    let state = test_state().await;
    let service = EventService::new(state.db.clone());
    service.create_event(event("Past", "2001-01-01", true)).await.unwrap();
    service.create_event(event("Future", "2999-01-01", true)).await.unwrap();

    let upcoming = service.list_active(Some(&services::today())).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].title, "Future");
}

#[tokio::test]
async fn test_created_event_keeps_supplied_fields() {
    let state = test_state().await;
    let service = EventService::new(state.db.clone());

    let created = service.create_event(event("Picnic", "2030-06-01", true)).await.unwrap();
    assert!(created.id.starts_with("EV_"));

    let listed = service.list_all().await.unwrap();
    let found = listed.iter().find(|e| e.id == created.id).unwrap();
    assert_eq!(found.title, "Picnic");
    assert_eq!(found.event_date, "2030-06-01");
    assert_eq!(found.start_time.as_deref(), Some("10:00"));
    assert_eq!(found.location.as_deref(), Some("Main hall"));
    assert!(!found.created_at.is_empty());
    assert_eq!(found.created_at, found.updated_at);
}

#[tokio::test]
async fn test_validation_rejects_bad_dates_and_times() {
    let state = test_state().await;
    let service = EventService::new(state.db.clone());

    let mut bad_date = event("Picnic", "June 1st", true);
    assert!(matches!(
        service.create_event(bad_date.clone()).await,
        Err(ApiError::ValidationError(_))
    ));

    bad_date.event_date = "2030-06-01".to_string();
    bad_date.end_time = Some("09:00".to_string());
    assert!(matches!(
        service.create_event(bad_date).await,
        Err(ApiError::ValidationError(_))
    ));

    let blank = event("   ", "2030-06-01", true);
    assert!(matches!(
        service.create_event(blank).await,
        Err(ApiError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_partial_update_and_delete() {
    let state = test_state().await;
    let service = EventService::new(state.db.clone());
    let created = service.create_event(event("Picnic", "2030-06-01", true)).await.unwrap();

    let updated = service
        .update_event(
            &created.id,
            UpdateEventRequest {
                title: Some("Church Picnic".to_string()),
                location: Some("".to_string()),
                is_active: Some(false),
                ..UpdateEventRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Church Picnic");
    assert_eq!(updated.event_date, "2030-06-01");
    assert!(updated.location.is_none());
    assert!(!updated.is_active);
    assert_eq!(updated.description.as_deref(), Some("Bring a friend"));

    service.delete_event(&created.id).await.unwrap();
    assert!(matches!(
        service.delete_event(&created.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        service.update_event(&created.id, UpdateEventRequest::default()).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_public_listing_refreshes_after_admin_create() {
    let state = test_state().await;
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let (_, member_token) = sign_up_user(&state, "member@church.org").await;
    let app: Router = event_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let (status, body) = send_json(&app, "GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let payload = json!({ "title": "Prayer night", "event_date": "2030-01-10" });
    let (status, _) = send_json(&app, "POST", "/api/admin/events", Some(&member_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send_json(&app, "POST", "/api/admin/events", Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_active"], true);

    let (_, body) = send_json(&app, "GET", "/api/events", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Prayer night");
}
