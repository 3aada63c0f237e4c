//! Tests for church info and service times

use axum::{http::StatusCode, Extension};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{CreateServiceTimeRequest, UpdateChurchInfoRequest, UpdateServiceTimeRequest};
use super::services::{ChurchInfoService, ServiceTimeService};
use super::*;
use crate::auth::test_support::sign_up_user;
use crate::common::state::test_support::{send_json, test_state};
use crate::common::ApiError;

fn service_time(name: &str, day: i64, time: &str, order: i64) -> CreateServiceTimeRequest {
    CreateServiceTimeRequest {
        name: name.to_string(),
        day_of_week: day,
        time: time.to_string(),
        description: None,
        location: None,
        is_active: true,
        display_order: order,
    }
}

#[tokio::test]
async fn test_church_info_created_on_first_write_then_patched() {
    let state = test_state().await;
    let service = ChurchInfoService::new(state.db.clone());
    assert!(service.get_info().await.unwrap().is_none());

    let missing_name = service
        .update_info("U_ADMIN000", UpdateChurchInfoRequest::default())
        .await;
    assert!(matches!(missing_name, Err(ApiError::ValidationError(_))));

    let created = service
        .update_info(
            "U_ADMIN000",
            UpdateChurchInfoRequest {
                name: Some("Grace Fellowship".to_string()),
                tagline: Some("All are welcome".to_string()),
                ..UpdateChurchInfoRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Grace Fellowship");
    assert_eq!(created.updated_by.as_deref(), Some("U_ADMIN000"));

    let patched = service
        .update_info(
            "U_OTHER000",
            UpdateChurchInfoRequest {
                phone: Some("555-0100".to_string()),
                ..UpdateChurchInfoRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.name, "Grace Fellowship");
    assert_eq!(patched.tagline.as_deref(), Some("All are welcome"));
    assert_eq!(patched.phone.as_deref(), Some("555-0100"));
    assert_eq!(patched.updated_by.as_deref(), Some("U_OTHER000"));
    assert_eq!(patched.created_at, created.created_at);
}

#[tokio::test]
async fn test_church_info_validates_links_and_email() {
    let state = test_state().await;
    let result = ChurchInfoService::new(state.db.clone())
        .update_info(
            "U_ADMIN000",
            UpdateChurchInfoRequest {
                name: Some("Grace".to_string()),
                email: Some("office".to_string()),
                facebook_url: Some("facebook.com/grace".to_string()),
                ..UpdateChurchInfoRequest::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[tokio::test]
async fn test_service_times_validation_and_order() {
    let state = test_state().await;
    let service = ServiceTimeService::new(state.db.clone());

    assert!(matches!(
        service.create_service_time(service_time("Bad day", 7, "10:00", 0)).await,
        Err(ApiError::ValidationError(_))
    ));
    assert!(matches!(
        service.create_service_time(service_time("Bad time", 0, "ten", 0)).await,
        Err(ApiError::ValidationError(_))
    ));

    service.create_service_time(service_time("Bible study", 3, "19:00", 2)).await.unwrap();
    let worship = service
        .create_service_time(service_time("Worship", 0, "10:00", 1))
        .await
        .unwrap();

    let names: Vec<String> = service
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Worship", "Bible study"]);

    service
        .update_service_time(
            &worship.id,
            UpdateServiceTimeRequest {
                is_active: Some(false),
                ..UpdateServiceTimeRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(service.list_active().await.unwrap().len(), 1);
    assert_eq!(service.list_all().await.unwrap().len(), 2);

    service.delete_service_time(&worship.id).await.unwrap();
    assert!(matches!(
        service.get_service_time(&worship.id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_church_info_over_http() {
    let state = test_state().await;
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let app = church_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let (status, body) = send_json(&app, "GET", "/api/church-info", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/admin/church-info",
        Some(&admin_token),
        Some(json!({ "name": "Grace Fellowship" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/church-info", None, None).await;
    assert_eq!(body["name"], "Grace Fellowship");
}
