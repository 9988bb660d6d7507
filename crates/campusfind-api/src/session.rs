//! The `user_session` cookie is the auth strategy: an HS256 token of
//! `{sub, username, exp}` held entirely by the client. There is no
//! server-side session store, rotation, or revocation list; logout simply
//! expires the cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::error;
use uuid::Uuid;

use campusfind_types::api::SessionClaims;

use crate::error::ApiError;
use crate::{AppState, AppStateInner};

pub const SESSION_COOKIE: &str = "user_session";

const SESSION_LIFETIME_DAYS: i64 = 7;

pub fn issue_cookie(
    state: &AppStateInner,
    user_id: Uuid,
    username: &str,
) -> Result<Cookie<'static>, ApiError> {
    let claims = SessionClaims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_LIFETIME_DAYS)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.session_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("session token encoding failed: {e}");
        ApiError::Internal("Internal server error".into())
    })?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(SESSION_LIFETIME_DAYS));
    cookie.set_secure(state.production);
    Ok(cookie)
}

/// Cookie that expires the session on logout. Sent unconditionally so a
/// stale client whose request carried no cookie still gets the expiry.
/// Path must match the issued cookie or browsers keep the original.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Extractor for handlers that need the calling user. Missing or
/// undecodable cookies reject with 401 before the handler runs.
pub struct Session(pub SessionClaims);

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthenticated)?;

        let data = decode::<SessionClaims>(
            cookie.value(),
            &DecodingKey::from_secret(state.session_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Unauthenticated)?;

        Ok(Session(data.claims))
    }
}
