use rusqlite::Connection;

use crate::Store;
use crate::error::StoreError;
use crate::models::{AuthAccountRow, FoundItemRow, LostItemRow, MatchRow, UserRow};

impl Store {
    // -- Users --

    /// Insert a user created through the username/password flow.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        full_name: &str,
        reg_number: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password_hash, full_name, reg_number)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, password_hash, full_name, reg_number),
            )?;
            Ok(())
        })
    }

    /// Insert the profile row for an email-flow account. The id is the
    /// auth account's id, so the two records stay linked.
    pub fn create_email_profile(
        &self,
        id: &str,
        email: &str,
        full_name: &str,
        reg_number: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, full_name, reg_number) VALUES (?1, ?2, ?3, ?4)",
                (id, email, full_name, reg_number),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<UserRow, StoreError> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_reg_number(&self, reg_number: &str) -> Result<UserRow, StoreError> {
        self.with_conn(|conn| query_user(conn, "reg_number = ?1", reg_number))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<UserRow, StoreError> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// Compensating delete, used when profile creation fails after the auth
    /// account already exists. Not part of any user-facing flow.
    pub fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn count_users(&self) -> Result<u32, StoreError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    // -- Auth accounts (email flow) --

    pub fn create_auth_account(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO auth_accounts (id, email, password_hash) VALUES (?1, ?2, ?3)",
                (id, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_auth_account_by_email(&self, email: &str) -> Result<AuthAccountRow, StoreError> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT id, email, password_hash, created_at FROM auth_accounts WHERE email = ?1",
                [email],
                |row| {
                    Ok(AuthAccountRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )?;
            Ok(row)
        })
    }

    pub fn delete_auth_account(&self, id: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM auth_accounts WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Lost items --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_lost_item(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        description: &str,
        category: &str,
        location: &str,
        security_question: &str,
        security_answer: &str,
        image_url: Option<&str>,
        created_at: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO lost_items
                 (id, user_id, title, description, category, location,
                  security_question, security_answer, image_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    id,
                    user_id,
                    title,
                    description,
                    category,
                    location,
                    security_question,
                    security_answer,
                    image_url,
                    created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_lost_items(&self) -> Result<Vec<LostItemRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{LOST_SELECT} ORDER BY created_at DESC"))?;
            let rows = stmt
                .query_map([], lost_item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Found items --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_found_item(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        description: &str,
        category: &str,
        location: &str,
        contact_info: &str,
        image_url: Option<&str>,
        created_at: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO found_items
                 (id, user_id, title, description, category, location,
                  contact_info, image_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    id,
                    user_id,
                    title,
                    description,
                    category,
                    location,
                    contact_info,
                    image_url,
                    created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_found_items(&self) -> Result<Vec<FoundItemRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{FOUND_SELECT} ORDER BY created_at DESC"))?;
            let rows = stmt
                .query_map([], found_item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Matches --

    /// The confidence score is stored as given. Nothing here computes or
    /// range-checks it.
    pub fn insert_match(
        &self,
        id: &str,
        lost_item_id: &str,
        found_item_id: &str,
        confidence_score: f64,
        created_at: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO matches
                 (id, lost_item_id, found_item_id, confidence_score, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, lost_item_id, found_item_id, confidence_score, created_at],
            )?;
            Ok(())
        })
    }

    /// Matches for one lost item, each joined with its found item, best
    /// confidence first.
    pub fn list_matches_for_lost_item(&self, lost_item_id: &str) -> Result<Vec<MatchRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.lost_item_id, m.found_item_id, m.confidence_score, m.created_at,
                        f.id, f.user_id, f.title, f.description, f.category, f.location,
                        f.contact_info, f.image_url, f.created_at
                 FROM matches m
                 JOIN found_items f ON m.found_item_id = f.id
                 WHERE m.lost_item_id = ?1
                 ORDER BY m.confidence_score DESC",
            )?;
            let rows = stmt
                .query_map([lost_item_id], |row| {
                    Ok(MatchRow {
                        id: row.get(0)?,
                        lost_item_id: row.get(1)?,
                        found_item_id: row.get(2)?,
                        confidence_score: row.get(3)?,
                        created_at: row.get(4)?,
                        found_item: Some(FoundItemRow {
                            id: row.get(5)?,
                            user_id: row.get(6)?,
                            title: row.get(7)?,
                            description: row.get(8)?,
                            category: row.get(9)?,
                            location: row.get(10)?,
                            contact_info: row.get(11)?,
                            image_url: row.get(12)?,
                            created_at: row.get(13)?,
                        }),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const LOST_SELECT: &str = "SELECT id, user_id, title, description, category, location, \
     security_question, security_answer, image_url, created_at FROM lost_items";

const FOUND_SELECT: &str = "SELECT id, user_id, title, description, category, location, \
     contact_info, image_url, created_at FROM found_items";

fn query_user(conn: &Connection, filter: &str, value: &str) -> Result<UserRow, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password_hash, full_name, reg_number, created_at
         FROM users WHERE {filter}"
    ))?;
    let row = stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            full_name: row.get(4)?,
            reg_number: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;
    Ok(row)
}

fn lost_item_from_row(row: &rusqlite::Row<'_>) -> Result<LostItemRow, rusqlite::Error> {
    Ok(LostItemRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        location: row.get(5)?,
        security_question: row.get(6)?,
        security_answer: row.get(7)?,
        image_url: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn found_item_from_row(row: &rusqlite::Row<'_>) -> Result<FoundItemRow, rusqlite::Error> {
    Ok(FoundItemRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        location: row.get(5)?,
        contact_info: row.get(6)?,
        image_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::schema;
    use crate::Store;

    fn test_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        schema::provision(&store).unwrap();
        store
    }

    fn seed_user(store: &Store, id: &str, username: &str, reg: &str) {
        store
            .create_user(id, username, "$argon2id$fake", "Test User", reg)
            .unwrap();
    }

    #[test]
    fn user_roundtrip_by_each_key() {
        let store = test_store();
        let id = uuid::Uuid::new_v4().to_string();
        seed_user(&store, &id, "alice", "R100");

        assert_eq!(store.get_user_by_username("alice").unwrap().id, id);
        assert_eq!(store.get_user_by_reg_number("R100").unwrap().id, id);
        assert_eq!(
            store.get_user_by_id(&id).unwrap().username.as_deref(),
            Some("alice")
        );
        assert!(matches!(
            store.get_user_by_username("nobody"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn duplicate_username_is_a_unique_violation() {
        let store = test_store();
        seed_user(&store, "u1", "alice", "R100");

        let err = store
            .create_user("u2", "alice", "hash", "Other", "R200")
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(err.violated_constraint(), Some("users.username"));
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn duplicate_reg_number_is_a_unique_violation() {
        let store = test_store();
        seed_user(&store, "u1", "alice", "R100");

        let err = store
            .create_user("u2", "bob", "hash", "Bob", "R100")
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(err.violated_constraint(), Some("users.reg_number"));
    }

    #[test]
    fn lost_items_list_newest_first() {
        let store = test_store();
        seed_user(&store, "u1", "alice", "R100");
        store
            .insert_lost_item(
                "l1", "u1", "Old wallet", "d", "wallets", "library", "q", "a", None,
                "2026-08-01T08:00:00Z",
            )
            .unwrap();
        store
            .insert_lost_item(
                "l2", "u1", "New phone", "d", "phones", "cafeteria", "q", "a",
                Some("https://cdn/img.jpg"), "2026-08-02T08:00:00Z",
            )
            .unwrap();

        let items = store.list_lost_items().unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["l2", "l1"]);
    }

    #[test]
    fn matches_join_found_item_ordered_by_confidence() {
        let store = test_store();
        seed_user(&store, "u1", "alice", "R100");
        store
            .insert_lost_item(
                "l1", "u1", "Wallet", "d", "wallets", "library", "q", "a", None,
                "2026-08-01T08:00:00Z",
            )
            .unwrap();
        for (fid, ts) in [("f1", "2026-08-01T09:00:00Z"), ("f2", "2026-08-01T10:00:00Z")] {
            store
                .insert_found_item(fid, "u1", "Wallet", "d", "wallets", "lab", "x@y", None, ts)
                .unwrap();
        }
        store
            .insert_match("m1", "l1", "f1", 0.42, "2026-08-01T11:00:00Z")
            .unwrap();
        store
            .insert_match("m2", "l1", "f2", 0.91, "2026-08-01T11:00:00Z")
            .unwrap();

        let matches = store.list_matches_for_lost_item("l1").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "m2");
        assert_eq!(matches[0].found_item.as_ref().unwrap().id, "f2");
        assert_eq!(matches[1].confidence_score, 0.42);
    }

    #[test]
    fn match_insert_defers_referential_integrity_to_the_store() {
        let store = test_store();
        let err = store
            .insert_match("m1", "missing-lost", "missing-found", 0.5, "2026-08-01T11:00:00Z")
            .unwrap_err();
        // foreign_keys=ON makes SQLite reject the dangling references
        assert!(err.sqlite_code().is_some());
    }

    #[test]
    fn compensating_deletes_remove_both_records() {
        let store = test_store();
        store
            .create_auth_account("a1", "bob@example.edu", "$argon2id$fake")
            .unwrap();
        store
            .create_email_profile("a1", "bob@example.edu", "Bob Lee", "R001")
            .unwrap();

        store.delete_user("a1").unwrap();
        store.delete_auth_account("a1").unwrap();
        assert!(matches!(
            store.get_auth_account_by_email("bob@example.edu"),
            Err(StoreError::NotFound)
        ));
        assert_eq!(store.count_users().unwrap(), 0);
    }
}
