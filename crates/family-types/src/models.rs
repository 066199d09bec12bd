use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered family member as exposed over the API.
/// The password hash and salt never leave the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub family_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// A stored family event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "event")]
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    #[serde(default)]
    pub required_items: String,
    pub username: String,
    pub family_id: String,
}

impl Event {
    /// The user-editable part of this event.
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            location: self.location.clone(),
            required_items: self.required_items.clone(),
        }
    }
}

/// Event fields as submitted by a client, before an id or owner is attached.
///
/// Every field defaults to empty so that a missing field surfaces as a
/// validation message rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(rename = "event")]
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub required_items: String,
}

impl EventDraft {
    /// Overlay the fields present in `patch` onto this draft.
    pub fn merged(&self, patch: &EventPatch) -> EventDraft {
        EventDraft {
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            date: patch.date.clone().unwrap_or_else(|| self.date.clone()),
            start_time: patch
                .start_time
                .clone()
                .unwrap_or_else(|| self.start_time.clone()),
            end_time: patch
                .end_time
                .clone()
                .unwrap_or_else(|| self.end_time.clone()),
            location: patch
                .location
                .clone()
                .unwrap_or_else(|| self.location.clone()),
            required_items: patch
                .required_items
                .clone()
                .unwrap_or_else(|| self.required_items.clone()),
        }
    }
}

/// Partial update for an event. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(rename = "event", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_items: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &EventPatch::default()
    }
}
