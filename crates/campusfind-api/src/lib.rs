pub mod accounts;
pub mod auth;
pub mod chat;
pub mod diagnostics;
pub mod error;
pub mod items;
pub mod matches;
pub mod rate_limit;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};

use campusfind_db::Store;

use crate::rate_limit::RateLimiter;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler needs, constructed once at startup and passed in.
/// No handler reaches for ambient globals or environment variables.
pub struct AppStateInner {
    pub store: Store,
    pub session_secret: String,
    /// Production deployments get `Secure` session cookies.
    pub production: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub http: reqwest::Client,
    pub register_limiter: RateLimiter,
}

impl AppStateInner {
    pub fn new(
        store: Store,
        session_secret: String,
        production: bool,
        gemini_api_key: Option<String>,
        gemini_base_url: String,
    ) -> Self {
        Self {
            store,
            session_secret,
            production,
            gemini_api_key,
            gemini_base_url,
            http: reqwest::Client::new(),
            // The sign-up surface the original exposed rate-limit messaging on
            register_limiter: RateLimiter::new(3, Duration::from_secs(60 * 60)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/simple-register", post(auth::simple_register))
        .route("/api/auth/simple-login", post(auth::simple_login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/register", post(accounts::register))
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/items/lost",
            get(items::list_lost_items).post(items::report_lost_item),
        )
        .route(
            "/api/items/found",
            get(items::list_found_items).post(items::report_found_item),
        )
        .route("/api/matches", post(matches::create_match))
        .route("/api/matches/{lost_item_id}", get(matches::list_matches))
        .route("/api/diagnostic/schema-status", get(diagnostics::schema_status))
        .route(
            "/api/admin/init-schema",
            post(diagnostics::verify_schema).get(diagnostics::usage),
        )
        .route("/api/debug/test-store", post(diagnostics::test_store))
        .with_state(state)
}
