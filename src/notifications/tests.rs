//! Tests for the notifications module

use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

use super::watcher::next_backoff;
use super::*;
use crate::accounts::models::NewMember;
use crate::accounts::onboarding::OnboardingService;
use crate::accounts::requests::AdminRequestService;
use crate::common::migrations::test_support::file_test_pool;
use crate::common::state::test_support::test_state;

fn member(id: &str) -> NewMember {
    NewMember {
        user_id: id.to_string(),
        email: format!("{}@church.org", id.to_lowercase()),
        display_name: None,
        photo_url: None,
    }
}

fn created_user_id(event: AdminRequestEvent) -> String {
    match event {
        AdminRequestEvent::Created { request } => request.user_id,
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_backoff_doubles_up_to_cap() {
    let first = next_backoff(None);
    assert_eq!(first, Duration::from_millis(250));
    assert_eq!(next_backoff(Some(first)), Duration::from_millis(500));
    assert_eq!(next_backoff(Some(Duration::from_secs(20))), Duration::from_secs(30));
    assert_eq!(next_backoff(Some(Duration::from_secs(30))), Duration::from_secs(30));
}

#[tokio::test]
async fn test_hub_delivers_to_subscribers() {
    let hub = NotificationHub::new();
    assert_eq!(
        hub.publish(AdminRequestEvent::Removed {
            user_id: "U-1".to_string()
        }),
        0
    );

    let mut receiver = hub.subscribe();
    assert_eq!(
        hub.publish(AdminRequestEvent::Removed {
            user_id: "U-2".to_string()
        }),
        1
    );
    match receiver.recv().await.unwrap() {
        AdminRequestEvent::Removed { user_id } => assert_eq!(user_id, "U-2"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_watcher_yields_new_pending_requests_in_order() {
    let state = test_state().await;
    let onboarding = OnboardingService::new(state.db.clone());

    // First identity becomes super admin and never shows up as a request
    onboarding.onboard(&member("U-ADMIN")).await.unwrap();
    onboarding.onboard(&member("U-FIRST")).await.unwrap();

    let watcher = PendingRequestWatcher::new(
        AdminRequestService::new(state.db.clone()),
        Duration::from_millis(10),
        WatchCursor::default(),
    );
    let mut events = Box::pin(watcher.into_stream());

    let first = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    match first {
        AdminRequestEvent::Created { request } => assert_eq!(request.user_id, "U-FIRST"),
        other => panic!("unexpected event: {:?}", other),
    }

    onboarding.onboard(&member("U-SECOND")).await.unwrap();

    let second = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    match second {
        AdminRequestEvent::Created { request } => assert_eq!(request.user_id, "U-SECOND"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_watcher_from_now_skips_existing_requests() {
    let state = test_state().await;
    let onboarding = OnboardingService::new(state.db.clone());
    onboarding.onboard(&member("U-ADMIN")).await.unwrap();
    onboarding.onboard(&member("U-OLD")).await.unwrap();

    let watcher = PendingRequestWatcher::new(
        AdminRequestService::new(state.db.clone()),
        Duration::from_millis(10),
        WatchCursor::now(),
    );
    let mut events = Box::pin(watcher.into_stream());

    onboarding.onboard(&member("U-NEW")).await.unwrap();

    let event = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    match event {
        AdminRequestEvent::Created { request } => assert_eq!(request.user_id, "U-NEW"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_resumes_from_cursor_after_store_failure() {
    let db = file_test_pool(3).await;
    let onboarding = OnboardingService::new(db.clone());
    onboarding.onboard(&member("U-ADMIN")).await.unwrap();
    onboarding.onboard(&member("U-1-BEFORE")).await.unwrap();

    let watcher = PendingRequestWatcher::new(
        AdminRequestService::new(db.clone()),
        Duration::from_millis(20),
        WatchCursor::default(),
    );
    let mut events = Box::pin(watcher.into_stream());

    let first = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    assert_eq!(created_user_id(first), "U-1-BEFORE");

    // Take the store away: polls fail and the stream backs off without yielding
    sqlx::query("ALTER TABLE admin_requests RENAME TO admin_requests_offline")
        .execute(&db)
        .await
        .unwrap();
    assert!(timeout(Duration::from_millis(400), events.next()).await.is_err());

    sqlx::query("ALTER TABLE admin_requests_offline RENAME TO admin_requests")
        .execute(&db)
        .await
        .unwrap();
    onboarding.onboard(&member("U-2-AFTER")).await.unwrap();

    // Resumes from the same cursor: nothing replayed, nothing skipped
    let resumed = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    assert_eq!(created_user_id(resumed), "U-2-AFTER");

    onboarding.onboard(&member("U-3-LATER")).await.unwrap();
    let later = timeout(Duration::from_secs(5), events.next()).await.unwrap().unwrap();
    assert_eq!(created_user_id(later), "U-3-LATER");
}
