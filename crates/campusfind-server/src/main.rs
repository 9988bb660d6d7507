use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use campusfind_api::{AppState, AppStateInner};
use campusfind_db::schema;

const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// In production the secret must be present, non-empty, and not the
/// placeholder; each failure names its own cause. Dev falls back to the
/// placeholder with a warning.
fn resolve_session_secret(var: Option<String>, production: bool) -> anyhow::Result<String> {
    match var {
        Some(secret) if !secret.is_empty() && secret != PLACEHOLDER_SECRET => Ok(secret),
        Some(secret) if production => {
            if secret.is_empty() {
                anyhow::bail!(
                    "CAMPUSFIND_SESSION_SECRET is empty; refusing to start in production"
                )
            }
            anyhow::bail!(
                "CAMPUSFIND_SESSION_SECRET is the placeholder value; refusing to start in production"
            )
        }
        None if production => {
            anyhow::bail!("CAMPUSFIND_SESSION_SECRET must be set in production")
        }
        _ => {
            warn!("CAMPUSFIND_SESSION_SECRET not set; using the dev placeholder");
            Ok(PLACEHOLDER_SECRET.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campusfind=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let production = std::env::var("CAMPUSFIND_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let session_secret = resolve_session_secret(
        std::env::var("CAMPUSFIND_SESSION_SECRET").ok(),
        production,
    )?;

    let db_path = std::env::var("CAMPUSFIND_DB_PATH").unwrap_or_else(|_| "campusfind.db".into());
    let host = std::env::var("CAMPUSFIND_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CAMPUSFIND_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let gemini_api_key = std::env::var("CAMPUSFIND_GEMINI_API_KEY").ok();
    if gemini_api_key.is_none() {
        warn!("CAMPUSFIND_GEMINI_API_KEY not set; /api/chat will refuse requests");
    }
    let gemini_base_url = std::env::var("CAMPUSFIND_GEMINI_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into());

    // Open the store and run the readiness check: verify, provision only if
    // a probe failed, verify again. The diagnostics endpoints stay available
    // either way so a broken deployment can explain itself.
    let store = campusfind_db::Store::open(&PathBuf::from(&db_path))?;
    let status = schema::ensure(&store);
    if status.is_ok() {
        info!("schema ready");
    } else {
        error!("schema not ready after provisioning: {status:?}");
    }

    let state: AppState = Arc::new(AppStateInner::new(
        store,
        session_secret,
        production,
        gemini_api_key,
        gemini_base_url,
    ));

    let app = campusfind_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("CampusFind server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_secret_is_used_as_is() {
        let secret = resolve_session_secret(Some("s3kr1t".into()), true).unwrap();
        assert_eq!(secret, "s3kr1t");
    }

    #[test]
    fn dev_falls_back_to_the_placeholder() {
        assert_eq!(
            resolve_session_secret(None, false).unwrap(),
            PLACEHOLDER_SECRET
        );
        assert_eq!(
            resolve_session_secret(Some(String::new()), false).unwrap(),
            PLACEHOLDER_SECRET
        );
    }

    #[test]
    fn production_failures_name_their_cause() {
        let missing = resolve_session_secret(None, true).unwrap_err();
        assert!(missing.to_string().contains("must be set"));

        let empty = resolve_session_secret(Some(String::new()), true).unwrap_err();
        assert!(empty.to_string().contains("is empty"));

        let placeholder =
            resolve_session_secret(Some(PLACEHOLDER_SECRET.into()), true).unwrap_err();
        assert!(placeholder.to_string().contains("placeholder value"));
    }
}
