use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use campusfind_types::api::{
    FoundItemListResponse, FoundItemResponse, LostItemListResponse, LostItemResponse,
    ReportFoundItemRequest, ReportLostItemRequest,
};
use campusfind_types::models::{FoundItem, LostItem};

use crate::AppState;
use crate::error::ApiError;
use crate::session::Session;

// Required-field presence is the only application-level validation; the
// security answer is stored as given, opaque to this system.

pub async fn report_lost_item(
    State(state): State<AppState>,
    Session(claims): Session,
    Json(req): Json<ReportLostItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let required = [
        &req.title,
        &req.description,
        &req.category,
        &req.location,
        &req.security_question,
        &req.security_answer,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::Validation("Missing required fields".into()));
    }

    let id = Uuid::new_v4();
    let created_at = Utc::now();

    state.store.insert_lost_item(
        &id.to_string(),
        &claims.sub.to_string(),
        &req.title,
        &req.description,
        &req.category,
        &req.location,
        &req.security_question,
        &req.security_answer,
        req.image_url.as_deref(),
        &created_at.to_rfc3339(),
    )?;

    info!("user {} reported lost item {id}", claims.sub);

    Ok((
        StatusCode::CREATED,
        Json(LostItemResponse {
            success: true,
            item: LostItem {
                id,
                user_id: claims.sub,
                title: req.title,
                description: req.description,
                category: req.category,
                location: req.location,
                security_question: req.security_question,
                security_answer: req.security_answer,
                image_url: req.image_url,
                created_at,
            },
        }),
    ))
}

pub async fn list_lost_items(
    State(state): State<AppState>,
) -> Result<Json<LostItemListResponse>, ApiError> {
    let items = state
        .store
        .list_lost_items()?
        .into_iter()
        .map(|row| row.into_item())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(LostItemListResponse { success: true, items }))
}

pub async fn report_found_item(
    State(state): State<AppState>,
    Session(claims): Session,
    Json(req): Json<ReportFoundItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let required = [
        &req.title,
        &req.description,
        &req.category,
        &req.location,
        &req.contact_info,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::Validation("Missing required fields".into()));
    }

    let id = Uuid::new_v4();
    let created_at = Utc::now();

    state.store.insert_found_item(
        &id.to_string(),
        &claims.sub.to_string(),
        &req.title,
        &req.description,
        &req.category,
        &req.location,
        &req.contact_info,
        req.image_url.as_deref(),
        &created_at.to_rfc3339(),
    )?;

    info!("user {} reported found item {id}", claims.sub);

    Ok((
        StatusCode::CREATED,
        Json(FoundItemResponse {
            success: true,
            item: FoundItem {
                id,
                user_id: claims.sub,
                title: req.title,
                description: req.description,
                category: req.category,
                location: req.location,
                contact_info: req.contact_info,
                image_url: req.image_url,
                created_at,
            },
        }),
    ))
}

pub async fn list_found_items(
    State(state): State<AppState>,
) -> Result<Json<FoundItemListResponse>, ApiError> {
    let items = state
        .store
        .list_found_items()?
        .into_iter()
        .map(|row| row.into_item())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(FoundItemListResponse { success: true, items }))
}
