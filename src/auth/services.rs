//! Identity provider: password and federated identities plus their sessions

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::extractors::Session;
use super::models::{
    AuthResponse, FederatedProfile, Identity, SessionRecord, SessionUser, SignInRequest,
    SignUpRequest, PASSWORD_PROVIDER,
};
use super::passwords::{hash_password, verify_password};
use super::tokens::TokenService;
use super::validators::SignUpValidator;
use crate::accounts::models::{NewMember, OnboardingOutcome};
use crate::accounts::onboarding::OnboardingService;
use crate::accounts::profiles::ProfileService;
use crate::accounts::roles::RoleService;
use crate::common::{
    clean_optional, generate_id, normalize_email, now_rfc3339, safe_email_log, ApiError, Config,
    EntityPrefix, Validator,
};

const IDENTITY_COLUMNS: &str =
    "id, email, password_hash, provider, provider_id, created_at, last_sign_in_at";

/// Redirect-flow state nonces older than this are refused
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(db: SqlitePool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    // ========================================================================
    // Identity lookups
    // ========================================================================

    pub async fn find_identity(&self, id: &str) -> Result<Option<Identity>, ApiError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {} FROM identities WHERE id = ?",
            IDENTITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(identity)
    }

    pub async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, ApiError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {} FROM identities WHERE email = ?",
            IDENTITY_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;
        Ok(identity)
    }

    async fn insert_identity(
        &self,
        email: &str,
        password_hash: Option<&str>,
        provider: &str,
        provider_id: Option<&str>,
    ) -> Result<Identity, ApiError> {
        let id = generate_id(EntityPrefix::Identity);

        sqlx::query(
            r#"
            INSERT INTO identities (id, email, password_hash, provider, provider_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(provider)
        .bind(provider_id)
        .bind(now_rfc3339())
        .execute(&self.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("An account with this email already exists".to_string())
            } else {
                error!(error = %e, email = %safe_email_log(email), "Database error creating identity");
                ApiError::DatabaseError(e)
            }
        })?;

        self.find_identity(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("identity vanished after insert".to_string()))
    }

    // ========================================================================
    // Sign-up / sign-in
    // ========================================================================

    /// Creates a password identity and onboards it
    pub async fn sign_up(
        &self,
        request: SignUpRequest,
    ) -> Result<(AuthResponse, OnboardingOutcome), ApiError> {
        SignUpValidator.validate(&request).into_result()?;

        let email = normalize_email(&request.email);
        if self.find_identity_by_email(&email).await?.is_some() {
            warn!(email = %safe_email_log(&email), "Sign-up rejected: email already registered");
            return Err(ApiError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let identity = self
            .insert_identity(&email, Some(&password_hash), PASSWORD_PROVIDER, None)
            .await?;

        info!(
            user_id = %identity.id,
            email = %safe_email_log(&email),
            "Identity created via email sign-up"
        );

        let member = NewMember {
            user_id: identity.id.clone(),
            email: email.clone(),
            display_name: clean_optional(request.display_name),
            photo_url: None,
        };

        let outcome = match OnboardingService::new(self.db.clone()).onboard(&member).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // No account without a profile: undo the identity
                warn!(user_id = %identity.id, error = %e, "Onboarding failed, removing new identity");
                let mut conn = self.db.acquire().await?;
                delete_identity(&mut conn, &identity.id).await?;
                return Err(e);
            }
        };

        let response = self.start_session(&identity, false).await?;
        Ok((response, outcome))
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<AuthResponse, ApiError> {
        let identity = self
            .find_identity_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %safe_email_log(&request.email), "Sign-in failed: unknown email");
                ApiError::Unauthorized("No account found for this email".to_string())
            })?;

        let hash = identity.password_hash.as_deref().ok_or_else(|| {
            ApiError::Unauthorized("This account signs in with Google".to_string())
        })?;

        if !verify_password(&request.password, hash) {
            warn!(user_id = %identity.id, "Sign-in failed: incorrect password");
            return Err(ApiError::Unauthorized("Incorrect password".to_string()));
        }

        // Repairs identities whose onboarding never completed
        OnboardingService::new(self.db.clone())
            .onboard(&NewMember {
                user_id: identity.id.clone(),
                email: identity.email.clone(),
                display_name: None,
                photo_url: None,
            })
            .await?;

        self.start_session(&identity, request.remember).await
    }

    /// Signs in an identity vouched for by a third-party provider,
    /// creating and onboarding it on first use
    pub async fn sign_in_federated(
        &self,
        profile: FederatedProfile,
        remember: bool,
    ) -> Result<(AuthResponse, OnboardingOutcome), ApiError> {
        let identity = match self.find_identity_by_email(&profile.email).await? {
            Some(identity) => identity,
            None => {
                let identity = self
                    .insert_identity(
                        &profile.email,
                        None,
                        profile.provider,
                        Some(&profile.provider_id),
                    )
                    .await?;
                info!(
                    user_id = %identity.id,
                    email = %safe_email_log(&profile.email),
                    provider = profile.provider,
                    "Identity created via federated sign-in"
                );
                identity
            }
        };

        let outcome = OnboardingService::new(self.db.clone())
            .onboard(&NewMember {
                user_id: identity.id.clone(),
                email: identity.email.clone(),
                display_name: profile.display_name,
                photo_url: profile.photo_url,
            })
            .await?;

        let response = self.start_session(&identity, remember).await?;
        Ok((response, outcome))
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(&session.session_id)
            .execute(&self.db)
            .await?;
        info!(user_id = %session.user_id, "Session ended");
        Ok(())
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    fn session_expiry(&self, remember: bool) -> DateTime<Utc> {
        if remember {
            Utc::now() + Duration::days(self.config.remember_me_ttl_days)
        } else {
            Utc::now() + Duration::hours(self.config.session_ttl_hours)
        }
    }

    async fn start_session(&self, identity: &Identity, remember: bool) -> Result<AuthResponse, ApiError> {
        let session_id = Uuid::new_v4().to_string();
        let expires_at = self.session_expiry(remember);
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, identity_id, persistent, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session_id)
        .bind(&identity.id)
        .bind(remember)
        .bind(&now)
        .bind(expires_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        sqlx::query("UPDATE identities SET last_sign_in_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&identity.id)
            .execute(&self.db)
            .await?;

        let token = TokenService::new(&self.config)
            .issue(&identity.id, &identity.email, &session_id, expires_at)
            .map_err(|e| {
                error!(error = %e, user_id = %identity.id, "JWT encoding error during sign-in");
                ApiError::InternalServer("jwt error".to_string())
            })?;

        let user = self.session_user(&identity.id, &identity.email).await?;

        info!(
            user_id = %identity.id,
            email = %safe_email_log(&identity.email),
            is_admin = user.is_admin,
            persistent = remember,
            "Session started"
        );

        Ok(AuthResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            user,
        })
    }

    /// Profile plus current role for the client
    pub async fn session_user(&self, user_id: &str, email: &str) -> Result<SessionUser, ApiError> {
        let profile = ProfileService::new(self.db.clone()).get_profile(user_id).await?;
        let role = RoleService::new(self.db.clone()).effective_role(user_id).await?;

        Ok(SessionUser {
            id: user_id.to_string(),
            email: email.to_string(),
            display_name: profile.as_ref().and_then(|p| p.display_name.clone()),
            photo_url: profile.and_then(|p| p.photo_url),
            role,
            is_admin: role.is_admin(),
        })
    }

    /// Verifies a bearer token and resolves it into a live session.
    /// The role is read from the role store, never from the token.
    pub async fn authenticate(&self, token: &str) -> Result<Session, ApiError> {
        let claims = TokenService::new(&self.config).verify(token).map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            ApiError::Unauthorized("invalid token".to_string())
        })?;

        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, identity_id, persistent, created_at, expires_at FROM sessions WHERE id = ? AND identity_id = ?",
        )
        .bind(&claims.sid)
        .bind(&claims.sub)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "Authentication failed: session not found");
            ApiError::Unauthorized("session expired or signed out".to_string())
        })?;

        let expired = DateTime::parse_from_rfc3339(&record.expires_at)
            .map(|at| at.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&record.id)
                .execute(&self.db)
                .await?;
            return Err(ApiError::Unauthorized("session expired".to_string()));
        }

        let role = RoleService::new(self.db.clone())
            .effective_role(&claims.sub)
            .await?;

        debug!(user_id = %claims.sub, role = %role, "Token authenticated");

        Ok(Session {
            session_id: record.id,
            user_id: claims.sub,
            email: claims.email,
            role,
        })
    }

    // ========================================================================
    // Redirect-flow state
    // ========================================================================

    pub async fn create_oauth_state(&self, remember: bool) -> Result<String, ApiError> {
        let state = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO oauth_states (state, remember, created_at) VALUES (?, ?, ?)")
            .bind(&state)
            .bind(remember)
            .bind(now_rfc3339())
            .execute(&self.db)
            .await?;
        Ok(state)
    }

    /// Consumes a state nonce, returning its `remember` flag
    pub async fn consume_oauth_state(&self, state: &str) -> Result<bool, ApiError> {
        let row: Option<(bool, String)> =
            sqlx::query_as("SELECT remember, created_at FROM oauth_states WHERE state = ?")
                .bind(state)
                .fetch_optional(&self.db)
                .await?;

        sqlx::query("DELETE FROM oauth_states WHERE state = ?")
            .bind(state)
            .execute(&self.db)
            .await?;

        let (remember, created_at) =
            row.ok_or_else(|| ApiError::Unauthorized("unknown sign-in state".to_string()))?;

        let fresh = DateTime::parse_from_rfc3339(&created_at)
            .map(|at| Utc::now() - at.with_timezone(&Utc) < Duration::minutes(OAUTH_STATE_TTL_MINUTES))
            .unwrap_or(false);
        if !fresh {
            return Err(ApiError::Unauthorized("sign-in state expired".to_string()));
        }

        Ok(remember)
    }
}

pub(crate) async fn delete_sessions_for(
    conn: &mut SqliteConnection,
    identity_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE identity_id = ?")
        .bind(identity_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_identity(
    conn: &mut SqliteConnection,
    identity_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM identities WHERE id = ?")
        .bind(identity_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
