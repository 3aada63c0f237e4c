//! Tests for videos module

use axum::{http::StatusCode, Extension};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{CreateVideoRequest, UpdateVideoRequest};
use super::services::VideoService;
use super::*;
use crate::auth::test_support::sign_up_user;
use crate::common::state::test_support::{send_json, test_state};
use crate::common::ApiError;

fn video(title: &str, url: &str, order: i64, active: bool) -> CreateVideoRequest {
    CreateVideoRequest {
        title: title.to_string(),
        description: None,
        youtube_url: url.to_string(),
        category: Some("sermon".to_string()),
        is_active: active,
        display_order: order,
    }
}

#[tokio::test]
async fn test_create_derives_id_and_thumbnail() {
    let state = test_state().await;
    let created = VideoService::new(state.db.clone())
        .create_video(video("Sunday", "https://youtu.be/dQw4w9WgXcQ", 0, true))
        .await
        .unwrap();

    assert!(created.id.starts_with("V_"));
    assert_eq!(created.youtube_id, "dQw4w9WgXcQ");
    assert_eq!(
        created.thumbnail_url,
        "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
    );
}

#[tokio::test]
async fn test_invalid_link_rejected() {
    let state = test_state().await;
    let result = VideoService::new(state.db.clone())
        .create_video(video("Sunday", "https://vimeo.com/1234", 0, true))
        .await;
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[tokio::test]
async fn test_active_videos_ordered_by_display_order() {
    let state = test_state().await;
    let service = VideoService::new(state.db.clone());
    service.create_video(video("Second", "https://youtu.be/AAAAAAAAAAA", 2, true)).await.unwrap();
    service.create_video(video("First", "https://youtu.be/BBBBBBBBBBB", 1, true)).await.unwrap();
    service.create_video(video("Hidden", "https://youtu.be/CCCCCCCCCCC", 0, false)).await.unwrap();

    let titles: Vec<String> = service
        .list_active(None)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(service.list_all().await.unwrap().len(), 3);
    assert!(service.list_active(Some("worship")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_link_refreshes_thumbnail() {
    let state = test_state().await;
    let service = VideoService::new(state.db.clone());
    let created = service
        .create_video(video("Sunday", "https://youtu.be/AAAAAAAAAAA", 0, true))
        .await
        .unwrap();

    let updated = service
        .update_video(
            &created.id,
            UpdateVideoRequest {
                youtube_url: Some("https://www.youtube.com/watch?v=BBBBBBBBBBB".to_string()),
                ..UpdateVideoRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.youtube_id, "BBBBBBBBBBB");
    assert!(updated.thumbnail_url.contains("BBBBBBBBBBB"));
    assert_eq!(updated.title, "Sunday");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let state = test_state().await;
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let app = video_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let payload = json!({ "title": "Worship", "youtube_url": "https://youtu.be/dQw4w9WgXcQ" });
    let (status, _) = send_json(&app, "POST", "/api/admin/videos", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = send_json(&app, "POST", "/api/admin/videos", Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/admin/videos/{}", created["id"].as_str().unwrap());
    let (status, _) = send_json(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send_json(&app, "GET", "/api/videos", None, None).await;
    assert_eq!(listed, json!([]));
}
