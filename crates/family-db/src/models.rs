//! Database row types, these map directly to SQLite rows.
//! Distinct from family-types API models so the hash and salt stay here.

use chrono::{DateTime, Utc};
use family_types::models::{Event, User};
use tracing::warn;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub family_id: String,
    pub hash: String,
    pub salt: String,
    pub role: String,
    pub created_at: String,
}

/// Everything needed to insert a credential record.
pub struct NewUser {
    pub username: String,
    pub family_id: String,
    pub hash: String,
    pub salt: String,
    pub role: String,
}

/// Partial update for a credential record. `None` leaves a column untouched.
#[derive(Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub family_id: Option<String>,
    pub hash: Option<String>,
    pub salt: Option<String>,
    pub role: Option<String>,
}

pub struct EventRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub required_items: String,
    pub username: String,
    pub family_id: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let created_at = row
            .created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on user '{}': {}", row.created_at, row.id, e);
                DateTime::default()
            });

        User {
            id: row.id,
            username: row.username,
            family_id: row.family_id,
            role: row.role,
            created_at,
        }
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            required_items: row.required_items,
            username: row.username,
            family_id: row.family_id,
        }
    }
}
