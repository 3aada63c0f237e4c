//! Google sign-in: ID token verification and the redirect (authorization code) flow

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::models::{FederatedProfile, GOOGLE_PROVIDER};
use crate::common::{normalize_email, ApiError};
use crate::common::config::GoogleOAuthConfig;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    id_token: Option<String>,
}

/// Builds the URL the browser is redirected to when sign-in starts
pub fn authorization_url(config: &GoogleOAuthConfig, state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
        AUTHORIZE_URL,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode("openid email profile"),
        urlencoding::encode(state),
    )
}

/// Exchanges the authorization code from the callback for an ID token
pub async fn exchange_code(
    http: &Client,
    config: &GoogleOAuthConfig,
    code: &str,
) -> Result<String, ApiError> {
    let client_secret = config.client_secret.as_deref().ok_or_else(|| {
        ApiError::InternalServer("Google client secret is not configured".to_string())
    })?;

    let params = [
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", client_secret),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let response = http.post(TOKEN_URL).form(&params).send().await.map_err(|e| {
        error!(error = %e, endpoint = TOKEN_URL, "HTTP error contacting Google token endpoint");
        ApiError::InternalServer("google sign-in service unavailable".to_string())
    })?;

    if !response.status().is_success() {
        warn!(http_status = %response.status(), "Google rejected the authorization code");
        return Err(ApiError::Unauthorized(
            "Google sign-in was not completed".to_string(),
        ));
    }

    let body: TokenExchangeResponse = response.json().await.map_err(|e| {
        error!(error = %e, "Malformed response from Google token endpoint");
        ApiError::InternalServer("google sign-in service returned an invalid response".to_string())
    })?;

    body.id_token
        .ok_or_else(|| ApiError::Unauthorized("Google did not return an ID token".to_string()))
}

/// Verifies an ID token with Google's tokeninfo endpoint
pub async fn verify_id_token(
    http: &Client,
    expected_client_id: Option<&str>,
    id_token: &str,
) -> Result<FederatedProfile, ApiError> {
    debug!("Initiating Google token validation with tokeninfo endpoint");

    let response = http
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, endpoint = TOKENINFO_URL, "HTTP error contacting Google tokeninfo endpoint");
            ApiError::InternalServer("google token validation service unavailable".to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(http_status = %status, "Google tokeninfo rejected the ID token");
        return Err(match status.as_u16() {
            400 => ApiError::BadRequest("invalid or malformed id_token".to_string()),
            _ => ApiError::Unauthorized("expired or invalid id_token".to_string()),
        });
    }

    let body: serde_json::Value = response.json().await.map_err(|e| {
        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
        ApiError::BadRequest("malformed id_token".to_string())
    })?;

    profile_from_tokeninfo(&body, expected_client_id, Utc::now().timestamp())
}

/// Validates the tokeninfo claims and extracts the profile
pub(crate) fn profile_from_tokeninfo(
    body: &serde_json::Value,
    expected_client_id: Option<&str>,
    now: i64,
) -> Result<FederatedProfile, ApiError> {
    let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);

    let (email, sub) = match (text("email"), text("sub")) {
        (Some(email), Some(sub)) => (email, sub),
        (email, sub) => {
            warn!(
                has_email = email.is_some(),
                has_sub = sub.is_some(),
                "Google token missing required fields (email/sub)"
            );
            return Err(ApiError::BadRequest("token missing required fields".to_string()));
        }
    };

    // tokeninfo returns claims as strings
    let email_verified = body
        .get("email_verified")
        .map(|v| v.as_bool().unwrap_or_else(|| v.as_str() == Some("true")))
        .unwrap_or(false);
    if !email_verified {
        warn!("Google token contains unverified email address");
        return Err(ApiError::Unauthorized("email address is not verified".to_string()));
    }

    let exp = body
        .get("exp")
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())));
    if let Some(exp) = exp {
        if exp < now {
            warn!(token_exp = exp, current_time = now, "Google token has expired");
            return Err(ApiError::Unauthorized("token has expired".to_string()));
        }
    }

    if let Some(client_id) = expected_client_id {
        if text("aud").as_deref() != Some(client_id) {
            warn!(expected_client_id = %client_id, "Google token audience validation failed");
            return Err(ApiError::Unauthorized("token audience mismatch".to_string()));
        }
    }

    Ok(FederatedProfile {
        provider: GOOGLE_PROVIDER,
        provider_id: sub,
        email: normalize_email(&email),
        display_name: text("name"),
        photo_url: text("picture"),
    })
}
