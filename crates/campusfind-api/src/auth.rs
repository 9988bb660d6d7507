use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use campusfind_db::StoreError;
use campusfind_types::api::{AuthResponse, LoginRequest, RegisterRequest};
use campusfind_types::models::UserProfile;

use crate::AppState;
use crate::error::ApiError;
use crate::session;

/// Username/password registration.
///
/// Local rules run before any store traffic: required fields, password
/// length, confirmation match. Then two availability probes; `NotFound` is
/// the only acceptable negative outcome, any other probe failure is logged
/// and registration proceeds (the insert's UNIQUE constraints are the
/// backstop).
pub async fn simple_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.trim().is_empty()
        || req.reg_number.trim().is_empty()
        || req.full_name.trim().is_empty()
        || req.password.is_empty()
    {
        return Err(ApiError::Validation("Missing required fields".into()));
    }
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if req.password != req.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".into()));
    }

    match state.store.get_user_by_username(&req.username) {
        Ok(_) => return Err(ApiError::Conflict("Username already taken".into())),
        Err(StoreError::NotFound) => {}
        Err(err) => warn!("username availability probe failed: {err}"),
    }
    match state.store.get_user_by_reg_number(&req.reg_number) {
        Ok(_) => {
            return Err(ApiError::Conflict(
                "Registration number already registered".into(),
            ));
        }
        Err(StoreError::NotFound) => {}
        Err(err) => warn!("registration number availability probe failed: {err}"),
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    if let Err(err) = state.store.create_user(
        &user_id.to_string(),
        &req.username,
        &password_hash,
        &req.full_name,
        &req.reg_number,
    ) {
        // A concurrent registration can slip past the probes; the UNIQUE
        // constraint reports which key lost the race.
        if err.is_unique_violation() {
            let message = match err.violated_constraint() {
                Some("users.username") => "Username already taken",
                Some("users.reg_number") => "Registration number already registered",
                _ => "Duplicate value",
            };
            return Err(ApiError::Conflict(message.into()));
        }
        return Err(err.into());
    }

    info!("registered user {} ({})", user_id, req.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: UserProfile {
                id: user_id,
                username: Some(req.username),
                email: None,
                full_name: req.full_name,
                reg_number: req.reg_number,
            },
            message: None,
        }),
    ))
}

/// Username/password login. Unknown username, store failure during lookup,
/// and wrong password all collapse into the same 401; nothing in the
/// response distinguishes them.
pub async fn simple_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("Username and password required".into()));
    }

    let user = state.store.get_user_by_username(&req.username).map_err(|err| {
        if !matches!(err, StoreError::NotFound) {
            warn!("login lookup failed: {err}");
        }
        ApiError::InvalidCredentials
    })?;

    // Email-flow profiles carry no username-path hash; same 401 as above.
    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("stored password hash is malformed: {e}");
        ApiError::Internal("Internal server error".into())
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::InvalidCredentials);
    }

    let profile = user.into_profile()?;
    let cookie = session::issue_cookie(&state, profile.id, &req.username)?;

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            success: true,
            user: profile,
            message: None,
        }),
    ))
}

/// Expires the `user_session` cookie. Nothing to revoke server-side; the
/// expiry cookie is added (not conditionally removed) so the response
/// carries it even when the request arrived without a session.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(session::removal_cookie()),
        Json(json!({ "success": true })),
    )
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("password hashing failed: {e}");
            ApiError::Internal("Internal server error".into())
        })?
        .to_string();
    Ok(hash)
}
