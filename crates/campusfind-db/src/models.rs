use chrono::{DateTime, Utc};
use uuid::Uuid;

use campusfind_types::models::{FoundItem, LostItem, MatchRecord, UserProfile};

use crate::error::StoreError;

/// Raw `users` row. Ids and timestamps are stored as TEXT in SQLite; the
/// conversion methods below parse them once, at the storage boundary.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub reg_number: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct AuthAccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct LostItemRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub security_question: String,
    pub security_answer: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct FoundItemRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact_info: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// `matches` row, optionally carrying the joined found item when the query
/// asked for it.
#[derive(Debug, Clone)]
pub struct MatchRow {
    pub id: String,
    pub lost_item_id: String,
    pub found_item_id: String,
    pub confidence_score: f64,
    pub created_at: String,
    pub found_item: Option<FoundItemRow>,
}

impl UserRow {
    /// Public profile view. The password hash stays behind.
    pub fn into_profile(self) -> Result<UserProfile, StoreError> {
        Ok(UserProfile {
            id: parse_uuid(&self.id)?,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            reg_number: self.reg_number,
        })
    }
}

impl LostItemRow {
    pub fn into_item(self) -> Result<LostItem, StoreError> {
        Ok(LostItem {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            security_question: self.security_question,
            security_answer: self.security_answer,
            image_url: self.image_url,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl FoundItemRow {
    pub fn into_item(self) -> Result<FoundItem, StoreError> {
        Ok(FoundItem {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            contact_info: self.contact_info,
            image_url: self.image_url,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl MatchRow {
    pub fn into_record(self) -> Result<MatchRecord, StoreError> {
        let found_item = self.found_item.map(FoundItemRow::into_item).transpose()?;
        Ok(MatchRecord {
            id: parse_uuid(&self.id)?,
            lost_item_id: parse_uuid(&self.lost_item_id)?,
            found_item_id: parse_uuid(&self.found_item_id)?,
            confidence_score: self.confidence_score,
            created_at: parse_timestamp(&self.created_at)?,
            found_item,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Internal(format!("corrupt uuid in store: {raw}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    // SQLite's datetime('now') default writes "YYYY-MM-DD HH:MM:SS" without
    // a timezone; rows written by the application carry RFC 3339.
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|_| StoreError::Internal(format!("corrupt timestamp in store: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_timestamps() {
        assert!(parse_timestamp("2026-08-27 10:15:00").is_ok());
        assert!(parse_timestamp("2026-08-27T10:15:00Z").is_ok());
        assert!(parse_timestamp("not a timestamp").is_err());
    }

    #[test]
    fn profile_drops_password_hash() {
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            username: Some("alice".into()),
            email: None,
            password_hash: Some("$argon2id$...".into()),
            full_name: "Alice A".into(),
            reg_number: "R100".into(),
            created_at: "2026-08-27 10:15:00".into(),
        };
        let profile = row.into_profile().unwrap();
        assert_eq!(profile.username.as_deref(), Some("alice"));
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
