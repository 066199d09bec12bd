use serde::{Deserialize, Serialize};

use crate::models::{EventDraft, EventPatch};

// -- JWT Claims --

/// Identity carried by a bearer token. The server trusts only this, never
/// the identity fields a client repeats in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    #[serde(rename = "familyId")]
    pub family_id: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub family_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub family_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub username: String,
    pub userfamily: String,
    pub userrole: String,
}

// -- Events --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FamilyEventsRequest {
    pub family_id: Option<String>,
}

/// Body of `POST /new-event-entry`. The identity fields are accepted for
/// compatibility with existing clients and checked against the token.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEventRequest {
    #[serde(flatten)]
    pub event: EventDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userfamily: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userrole: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateEventRequest {
    #[serde(flatten)]
    pub patch: EventPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userfamily: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userfamily: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEventResponse {
    pub success: bool,
    pub updated: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub success: bool,
    pub removed: usize,
}

// -- Errors --

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}
