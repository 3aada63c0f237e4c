//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::services::AuthService;
use super::tokens::bearer_token;
use crate::accounts::models::Role;
use crate::common::{ApiError, AppState, SharedState};

/// Authenticated session
///
/// Validates the bearer token, checks the session is still live and loads
/// the caller's role from the role store.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session whose holder is an admin or super admin
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

/// Resolves a raw token against the given state
pub async fn authenticate_token(state: &AppState, token: &str) -> Result<Session, ApiError> {
    AuthService::new(state.db.clone(), state.config.clone())
        .authenticate(token)
        .await
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("Authentication failed: missing Authorization header");
                ApiError::Unauthorized("missing auth".into())
            })?;

        let token = bearer_token(header).ok_or_else(|| {
            warn!("Authentication failed: malformed Authorization header");
            ApiError::Unauthorized("malformed auth header".into())
        })?;

        let app_state = state_lock.read().await.clone();
        authenticate_token(&app_state, token).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            warn!(user_id = %session.user_id, "Non-admin attempted admin operation");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminSession(session))
    }
}
