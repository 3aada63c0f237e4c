//! Authentication handlers

use axum::extract::{Extension, Json, Query};
use axum::response::Redirect;
use tracing::{error, info, warn};

use super::extractors::Session;
use super::google;
use super::models::{
    AuthResponse, GoogleIdTokenPayload, MeResponse, OnboardedAuthResponse, RedirectCallbackQuery,
    RedirectStartQuery, SignInRequest, SignUpRequest,
};
use super::services::AuthService;
use crate::accounts::models::MessageResponse;
use crate::accounts::requests::AdminRequestService;
use crate::common::{ApiError, AppState, SharedState};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.db.clone(), state.config.clone())
}

/// POST /api/auth/signup
///
/// # Request Body
/// ```json
/// { "email": "a@b.org", "password": "secret1", "display_name": "Ann" }
/// ```
pub async fn sign_up(
    Extension(state_lock): Extension<SharedState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<OnboardedAuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let (session, onboarding) = auth_service(&state).sign_up(payload).await?;
    Ok(Json(OnboardedAuthResponse { session, onboarding }))
}

/// POST /api/auth/signin
pub async fn sign_in(
    Extension(state_lock): Extension<SharedState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let response = auth_service(&state).sign_in(payload).await?;
    Ok(Json(response))
}

/// POST /api/auth/google
/// Signs in with a Google ID token obtained by the client
pub async fn google_sign_in(
    Extension(state_lock): Extension<SharedState>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<OnboardedAuthResponse>, ApiError> {
    info!("Received Google sign-in request");
    let state = state_lock.read().await.clone();

    let client_id = state.config.google.as_ref().map(|g| g.client_id.as_str());
    let profile = google::verify_id_token(&state.http, client_id, &payload.id_token).await?;

    let (session, onboarding) = auth_service(&state)
        .sign_in_federated(profile, payload.remember)
        .await?;
    Ok(Json(OnboardedAuthResponse { session, onboarding }))
}

/// GET /auth/google - Start the Google redirect flow
pub async fn google_redirect_start(
    Extension(state_lock): Extension<SharedState>,
    Query(query): Query<RedirectStartQuery>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let google = state.config.google.as_ref().ok_or_else(|| {
        ApiError::InternalServer("Google sign-in is not configured".to_string())
    })?;

    let nonce = auth_service(&state).create_oauth_state(query.remember).await?;
    let url = google::authorization_url(google, &nonce);

    info!(remember = query.remember, "Redirecting to Google sign-in");
    Ok(Redirect::to(&url))
}

/// GET /auth/google/callback - Completes the redirect flow and hands the
/// session token to the frontend in the URL fragment
pub async fn google_redirect_callback(
    Extension(state_lock): Extension<SharedState>,
    Query(query): Query<RedirectCallbackQuery>,
) -> Redirect {
    let state = state_lock.read().await.clone();
    let callback = format!(
        "{}/auth/callback",
        state.config.frontend_url.trim_end_matches('/')
    );

    match complete_redirect(&state, query).await {
        Ok(token) => Redirect::to(&format!("{}#token={}", callback, urlencoding::encode(&token))),
        Err(e) => {
            warn!(error = %e, "Google redirect sign-in failed");
            let reason = match e {
                ApiError::Unauthorized(msg) | ApiError::BadRequest(msg) => msg,
                _ => "sign-in failed".to_string(),
            };
            Redirect::to(&format!("{}#error={}", callback, urlencoding::encode(&reason)))
        }
    }
}

async fn complete_redirect(state: &AppState, query: RedirectCallbackQuery) -> Result<String, ApiError> {
    if let Some(err) = query.error {
        return Err(ApiError::Unauthorized(format!("Google returned: {}", err)));
    }
    let google = state.config.google.as_ref().ok_or_else(|| {
        ApiError::InternalServer("Google sign-in is not configured".to_string())
    })?;
    let nonce = query
        .state
        .ok_or_else(|| ApiError::BadRequest("missing state".to_string()))?;
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("No authorization code provided".to_string()))?;

    let service = auth_service(state);
    let remember = service.consume_oauth_state(&nonce).await?;

    let id_token = google::exchange_code(&state.http, google, &code).await?;
    let profile = google::verify_id_token(&state.http, Some(&google.client_id), &id_token).await?;
    let (session, _) = service.sign_in_federated(profile, remember).await?;

    Ok(session.token)
}

/// POST /api/auth/logout
/// Ends the current session; the token stops working immediately
pub async fn logout(
    Extension(state_lock): Extension<SharedState>,
    session: Session,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    auth_service(&state).sign_out(&session).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Logout successful".to_string(),
    }))
}

/// GET /api/me
pub async fn me(
    Extension(state_lock): Extension<SharedState>,
    session: Session,
) -> Result<Json<MeResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = auth_service(&state)
        .session_user(&session.user_id, &session.email)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %session.user_id, "Failed to load session user");
            e
        })?;
    let request_status = AdminRequestService::new(state.db.clone())
        .get_request(&session.user_id)
        .await?
        .map(|r| r.status);

    Ok(Json(MeResponse { user, request_status }))
}
