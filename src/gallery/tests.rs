//! Tests for gallery module

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Extension, Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use super::compression::ProcessedImage;
use super::models::{CreateAlbumRequest, UpdateAlbumRequest, UpdateImageRequest};
use super::services::GalleryService;
use super::storage::{is_safe_filename, StoredFile, PUBLIC_PREFIX};
use super::*;
use crate::auth::test_support::sign_up_user;
use crate::common::migrations::test_support::file_test_pool;
use crate::common::state::test_support::{send_json, test_state};
use crate::common::ApiError;

fn album(title: &str, order: i64, active: bool) -> CreateAlbumRequest {
    CreateAlbumRequest {
        title: title.to_string(),
        description: None,
        cover_image_url: None,
        event_date: Some("2030-05-01".to_string()),
        is_active: active,
        display_order: order,
    }
}

fn stored(name: &str) -> (StoredFile, ProcessedImage) {
    (
        StoredFile {
            filename: format!("{}.jpg", name),
            url: format!("{}/{}.jpg", PUBLIC_PREFIX, name),
            file_size: 1024,
        },
        ProcessedImage {
            bytes: Vec::new(),
            width: 640,
            height: 480,
        },
    )
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_public_albums_hide_inactive_and_follow_display_order() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());

    service.create_album(album("Baptisms", 2, true)).await.unwrap();
    service.create_album(album("Christmas", 1, true)).await.unwrap();
    let hidden = service.create_album(album("Draft", 0, false)).await.unwrap();
    assert!(hidden.id.starts_with("AL_"));

    let titles: Vec<String> = service
        .list_active_albums()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Christmas", "Baptisms"]);

    assert_eq!(service.list_all_albums().await.unwrap().len(), 3);
    assert!(matches!(
        service.get_album_detail(&hidden.id, false).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(service.get_album_detail(&hidden.id, true).await.is_ok());
}

#[tokio::test]
async fn test_album_validation_and_patch() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());

    let mut bad = album("", 0, true);
    bad.event_date = Some("01/05/2030".to_string());
    assert!(matches!(
        service.create_album(bad).await,
        Err(ApiError::ValidationError(_))
    ));

    let created = service.create_album(album("Youth camp", 0, true)).await.unwrap();
    let updated = service
        .update_album(
            &created.id,
            UpdateAlbumRequest {
                description: Some("Summer 2030".to_string()),
                event_date: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Youth camp");
    assert_eq!(updated.description.as_deref(), Some("Summer 2030"));
    assert_eq!(updated.event_date, None);
}

#[tokio::test]
async fn test_first_image_becomes_cover_and_order_increments() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());
    let created = service.create_album(album("Easter", 0, true)).await.unwrap();

    let (file_a, processed) = stored("aaaa");
    let first = service
        .add_image(&created.id, &file_a, &processed, Some("Sunrise".to_string()))
        .await
        .unwrap();
    let (file_b, processed) = stored("bbbb");
    let second = service
        .add_image(&created.id, &file_b, &processed, None)
        .await
        .unwrap();

    assert!(first.id.starts_with("IM_"));
    assert_eq!((first.display_order, second.display_order), (0, 1));
    assert_eq!((first.width, first.height), (640, 480));

    let detail = service.get_album_detail(&created.id, false).await.unwrap();
    assert_eq!(detail.album.cover_image_url.as_deref(), Some(file_a.url.as_str()));
    assert_eq!(detail.images.len(), 2);

    // Deleting the cover hands it to the next image
    service.delete_image(&first.id).await.unwrap();
    let album = service.get_album(&created.id).await.unwrap();
    assert_eq!(album.cover_image_url.as_deref(), Some(file_b.url.as_str()));

    service.delete_image(&second.id).await.unwrap();
    let album = service.get_album(&created.id).await.unwrap();
    assert_eq!(album.cover_image_url, None);
}

#[tokio::test]
async fn test_existing_cover_is_kept() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());
    let mut request = album("Choir", 0, true);
    request.cover_image_url = Some("https://cdn.example.com/choir.jpg".to_string());
    let created = service.create_album(request).await.unwrap();

    let (file, processed) = stored("cccc");
    service.add_image(&created.id, &file, &processed, None).await.unwrap();

    let album = service.get_album(&created.id).await.unwrap();
    assert_eq!(
        album.cover_image_url.as_deref(),
        Some("https://cdn.example.com/choir.jpg")
    );
}

#[tokio::test]
async fn test_add_image_to_missing_album_fails() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());
    let (file, processed) = stored("dddd");
    assert!(matches!(
        service.add_image("AL_MISSING1", &file, &processed, None).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_album_delete_removes_every_image() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());
    let doomed = service.create_album(album("Doomed", 0, true)).await.unwrap();
    let kept = service.create_album(album("Kept", 1, true)).await.unwrap();

    for name in ["e1", "e2", "e3"] {
        let (file, processed) = stored(name);
        service.add_image(&doomed.id, &file, &processed, None).await.unwrap();
    }
    let (file, processed) = stored("k1");
    service.add_image(&kept.id, &file, &processed, None).await.unwrap();

    let deleted = service.delete_album(&doomed.id).await.unwrap();
    assert_eq!(deleted.filenames.len(), 3);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gallery_images WHERE album_id = ?")
        .bind(&doomed.id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(matches!(
        service.get_album(&doomed.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert_eq!(service.list_images(&kept.id).await.unwrap().len(), 1);

    assert!(matches!(
        service.delete_album(&doomed.id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_and_deletes_do_not_fail_as_busy() {
    let db = file_test_pool(6).await;
    let service = GalleryService::new(db.clone());
    let target = service.create_album(album("Busy Sunday", 0, true)).await.unwrap();
    let doomed = service.create_album(album("Old photos", 1, true)).await.unwrap();
    for name in ["old1", "old2"] {
        let (file, processed) = stored(name);
        service.add_image(&doomed.id, &file, &processed, None).await.unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..6 {
        let db = db.clone();
        let album_id = target.id.clone();
        handles.push(tokio::spawn(async move {
            let (file, processed) = stored(&format!("busy{}", i));
            GalleryService::new(db)
                .add_image(&album_id, &file, &processed, None)
                .await
                .map(|_| ())
        }));
    }
    let doomed_id = doomed.id.clone();
    let delete_db = db.clone();
    handles.push(tokio::spawn(async move {
        GalleryService::new(delete_db)
            .delete_album(&doomed_id)
            .await
            .map(|_| ())
    }));

    for handle in handles {
        handle.await.unwrap().expect("write should wait for the lock");
    }

    let mut orders: Vec<i64> = service
        .list_images(&target.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.display_order)
        .collect();
    orders.sort();
    assert_eq!(orders, (0..6).collect::<Vec<i64>>());
    assert!(matches!(
        service.get_album(&doomed.id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_image_caption() {
    let state = test_state().await;
    let service = GalleryService::new(state.db.clone());
    let created = service.create_album(album("Picnic", 0, true)).await.unwrap();
    let (file, processed) = stored("ffff");
    let image = service
        .add_image(&created.id, &file, &processed, Some("Old".to_string()))
        .await
        .unwrap();

    let updated = service
        .update_image(
            &image.id,
            UpdateImageRequest {
                caption: Some("New caption".to_string()),
                display_order: Some(5),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.caption.as_deref(), Some("New caption"));
    assert_eq!(updated.display_order, 5);

    let too_long = service
        .update_image(
            &image.id,
            UpdateImageRequest {
                caption: Some("x".repeat(501)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(too_long, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_safe_filenames() {
    assert!(is_safe_filename("k7np3x2qabcdefgh.jpg"));
    assert!(!is_safe_filename("../secret.db"));
    assert!(!is_safe_filename("a/b.jpg"));
    assert!(!is_safe_filename(".env"));
    assert!(!is_safe_filename(""));
}

fn multipart_body(boundary: &str, caption: &str, image: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{c}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            b = boundary,
            c = caption
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn test_upload_serve_and_delete_over_http() {
    let state = test_state().await;
    let gallery_dir = state.config.gallery_dir();
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let (_, member_token) = sign_up_user(&state, "member@church.org").await;
    let app: Router = gallery_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/admin/gallery/albums",
        Some(&member_token),
        Some(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/admin/gallery/albums",
        Some(&admin_token),
        Some(json!({ "title": "Harvest festival" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let album_id = created["id"].as_str().unwrap().to_string();

    // Prime the public cache so the upload has to invalidate it
    let (_, before) = send_json(&app, "GET", &format!("/api/gallery/{}", album_id), None, None).await;
    assert_eq!(before["images"].as_array().unwrap().len(), 0);

    let boundary = "church-boundary";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/gallery/albums/{}/images", album_id))
                .header("authorization", format!("Bearer {}", admin_token))
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(multipart_body(boundary, "Harvest table", &png_bytes(2000, 1000))))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let uploaded: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let image = &uploaded[0];
    assert_eq!(image["width"], 1920);
    assert_eq!(image["height"], 960);
    assert_eq!(image["caption"], "Harvest table");
    let url = image["url"].as_str().unwrap().to_string();
    let filename = image["filename"].as_str().unwrap().to_string();
    assert!(gallery_dir.join(&filename).exists());

    let (_, after) = send_json(&app, "GET", &format!("/api/gallery/{}", album_id), None, None).await;
    assert_eq!(after["images"].as_array().unwrap().len(), 1);
    assert_eq!(after["cover_image_url"], url.as_str());

    let served = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()["content-type"], "image/jpeg");

    let traversal = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/uploads/gallery/..%2F..%2Fchurch.db")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/admin/gallery/albums/{}", album_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!gallery_dir.join(&filename).exists());

    let (status, _) = send_json(&app, "GET", &format!("/api/gallery/{}", album_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let state = test_state().await;
    let (_, admin_token) = sign_up_user(&state, "pastor@church.org").await;
    let app: Router = gallery_routes().layer(Extension(Arc::new(RwLock::new(state))));

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/admin/gallery/albums",
        Some(&admin_token),
        Some(json!({ "title": "Docs" })),
    )
    .await;
    let album_id = created["id"].as_str().unwrap();

    let boundary = "church-boundary";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/gallery/albums/{}/images", album_id))
                .header("authorization", format!("Bearer {}", admin_token))
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(multipart_body(boundary, "", b"%PDF-1.7 not a photo")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
