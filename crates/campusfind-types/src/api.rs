use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FoundItem, LostItem, MatchRecord, UserProfile};

// -- Session claims --

/// Claims carried by the `user_session` cookie. Canonical definition lives
/// here so the API middleware and the server tests agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

// Request fields default to empty rather than failing deserialization, so
// an absent key reaches the handlers' own presence checks and gets the
// contracted `400 {"error": "Missing required fields"}` instead of a
// framework-shaped rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub reg_number: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Alternate account-creation path keyed by email instead of username.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterAccountRequest {
    pub email: String,
    pub password: String,
    pub reg_number: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// -- Items --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportLostItemRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub security_question: String,
    pub security_answer: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFoundItemRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact_info: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LostItemResponse {
    pub success: bool,
    pub item: LostItem,
}

#[derive(Debug, Serialize)]
pub struct LostItemListResponse {
    pub success: bool,
    pub items: Vec<LostItem>,
}

#[derive(Debug, Serialize)]
pub struct FoundItemResponse {
    pub success: bool,
    pub item: FoundItem,
}

#[derive(Debug, Serialize)]
pub struct FoundItemListResponse {
    pub success: bool,
    pub items: Vec<FoundItem>,
}

// -- Matches --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub lost_item_id: Uuid,
    pub found_item_id: Uuid,
    pub confidence_score: f64,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub record: MatchRecord,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub success: bool,
    pub matches: Vec<MatchRecord>,
}

// -- Chat --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
