//! Email-keyed account creation. This path writes two records: the auth
//! account and the profile row sharing its id. A profile failure unwinds
//! the auth account so no orphaned login can accumulate — the one
//! multi-step flow in the system that compensates on partial failure.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};
use tracing::{error, warn};
use uuid::Uuid;

use campusfind_db::StoreError;
use campusfind_types::api::{AuthResponse, RegisterAccountRequest};
use campusfind_types::models::UserProfile;

use crate::AppState;
use crate::auth::hash_password;
use crate::error::ApiError;

const RATE_LIMIT_MESSAGE: &str =
    "Too many sign-up attempts. Please wait 1 hour or try a different email address.";

const DUPLICATE_EMAIL_MESSAGE: &str =
    "Email already registered. Please try logging in or use a different email.";

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty()
        || req.password.is_empty()
        || req.reg_number.trim().is_empty()
        || req.full_name.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing required fields".into()));
    }

    if !state.register_limiter.allow(&client_key(&headers)) {
        return Err(ApiError::RateLimited(RATE_LIMIT_MESSAGE.into()));
    }

    match state.store.get_auth_account_by_email(&req.email) {
        Ok(_) => return Err(ApiError::Conflict(DUPLICATE_EMAIL_MESSAGE.into())),
        Err(StoreError::NotFound) => {}
        Err(err) => warn!("email availability probe failed: {err}"),
    }

    let password_hash = hash_password(&req.password)?;
    let account_id = Uuid::new_v4();

    if let Err(err) =
        state
            .store
            .create_auth_account(&account_id.to_string(), &req.email, &password_hash)
    {
        if err.is_unique_violation() {
            return Err(ApiError::Conflict(DUPLICATE_EMAIL_MESSAGE.into()));
        }
        return Err(err.into());
    }

    if let Err(err) = state.store.create_email_profile(
        &account_id.to_string(),
        &req.email,
        &req.full_name,
        &req.reg_number,
    ) {
        // Unwind the auth account; a login with no profile is worse than
        // asking the user to retry.
        if let Err(delete_err) = state.store.delete_auth_account(&account_id.to_string()) {
            error!("compensating auth-account delete failed for {account_id}: {delete_err}");
        }

        if err.is_unique_violation() {
            let message = match err.violated_constraint() {
                Some("users.reg_number") => "Registration number already registered",
                Some("users.email") => DUPLICATE_EMAIL_MESSAGE,
                _ => "Failed to create user profile",
            };
            return Err(ApiError::Conflict(message.into()));
        }
        return Err(err.into());
    }

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: UserProfile {
                id: account_id,
                username: None,
                email: Some(req.email),
                full_name: req.full_name,
                reg_number: req.reg_number,
            },
            message: Some("Account created successfully".into()),
        }),
    ))
}

/// Rate-limit key: first hop of X-Forwarded-For when deployed behind a
/// proxy, otherwise one shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "local".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_key_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "local");
    }
}
