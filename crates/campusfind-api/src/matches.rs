use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use campusfind_types::api::{CreateMatchRequest, MatchListResponse, MatchResponse};
use campusfind_types::models::MatchRecord;

use crate::AppState;
use crate::error::ApiError;

/// Stores a match record as given. The confidence score is never computed
/// or range-checked here; referential integrity is the store's problem.
pub async fn create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    state.store.insert_match(
        &id.to_string(),
        &req.lost_item_id.to_string(),
        &req.found_item_id.to_string(),
        req.confidence_score,
        &created_at.to_rfc3339(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(MatchResponse {
            success: true,
            record: MatchRecord {
                id,
                lost_item_id: req.lost_item_id,
                found_item_id: req.found_item_id,
                confidence_score: req.confidence_score,
                created_at,
                found_item: None,
            },
        }),
    ))
}

/// Matches for one lost item, joined with the corresponding found items,
/// best confidence first.
pub async fn list_matches(
    State(state): State<AppState>,
    Path(lost_item_id): Path<Uuid>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let matches = state
        .store
        .list_matches_for_lost_item(&lost_item_id.to_string())?
        .into_iter()
        .map(|row| row.into_record())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(MatchListResponse {
        success: true,
        matches,
    }))
}
