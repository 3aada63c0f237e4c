//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::accounts::models::{OnboardingOutcome, RequestStatus, Role};

/// Identity token claims
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Identity id
    pub sub: String,
    pub email: String,
    /// Session id
    pub sid: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

pub const PASSWORD_PROVIDER: &str = "password";
pub const GOOGLE_PROVIDER: &str = "google";

/// Identity record held by the identity provider
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: String,
    pub last_sign_in_at: Option<String>,
}

#[derive(FromRow, Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub identity_id: String,
    pub persistent: bool,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(Deserialize, Debug)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    /// Keep the session across browser restarts
    #[serde(default)]
    pub remember: bool,
}

/// Google ID token payload for the direct sign-in endpoint
#[derive(Deserialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
    #[serde(default)]
    pub remember: bool,
}

/// Query for starting the redirect flow
#[derive(Deserialize, Debug, Default)]
pub struct RedirectStartQuery {
    #[serde(default)]
    pub remember: bool,
}

#[derive(Deserialize, Debug)]
pub struct RedirectCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Profile facts a third-party provider vouches for
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub provider: &'static str,
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Signed-in user as returned to the client
#[derive(Serialize, Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub role: Role,
    pub is_admin: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub user: SessionUser,
}

/// Sign-in result for flows that may onboard a new identity
#[derive(Serialize, Debug, Clone)]
pub struct OnboardedAuthResponse {
    #[serde(flatten)]
    pub session: AuthResponse,
    pub onboarding: OnboardingOutcome,
}

#[derive(Serialize, Debug, Clone)]
pub struct MeResponse {
    pub user: SessionUser,
    /// Status of the caller's admin request, if one exists
    pub request_status: Option<RequestStatus>,
}
