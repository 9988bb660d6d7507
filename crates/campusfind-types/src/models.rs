use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a registered user. The password hash never leaves the
/// database layer; this is the shape every auth endpoint returns.
///
/// `username` is set for accounts created through the username flow,
/// `email` for accounts created through the email flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub full_name: String,
    pub reg_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub security_question: String,
    pub security_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored lost/found pairing. The confidence score is an opaque number
/// written by whoever inserted the record; this system never computes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub lost_item_id: Uuid,
    pub found_item_id: Uuid,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    /// Joined found item, present when listing matches for a lost item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_item: Option<FoundItem>,
}
