use super::models::SignUpRequest;
use super::AuthService;
use crate::common::AppState;

/// Signs up a password identity, returning its id and session token.
/// The first call on a fresh state yields the super admin.
pub async fn sign_up_user(state: &AppState, email: &str) -> (String, String) {
    let (response, _) = AuthService::new(state.db.clone(), state.config.clone())
        .sign_up(SignUpRequest {
            email: email.to_string(),
            password: "secret1".to_string(),
            display_name: None,
        })
        .await
        .expect("sign-up should succeed");
    (response.user.id, response.token)
}
