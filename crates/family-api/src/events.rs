//! Family-scoped event handlers.
//!
//! The family id in the caller's token is the only access boundary: any
//! member may read, edit or delete any event in their family, and events of
//! other families behave as if they did not exist.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use family_db::EventUpdate;
use family_types::api::{
    Claims, DeleteEventRequest, DeleteEventResponse, FamilyEventsRequest, NewEventRequest,
    UpdateEventRequest, UpdateEventResponse,
};
use family_types::models::Event;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_store;

/// Reject a body that names a family other than the token's.
fn ensure_same_family(claims: &Claims, claimed: Option<&str>) -> Result<(), ApiError> {
    match claimed {
        Some(family) if !family.is_empty() && family != claims.family_id => {
            Err(ApiError::Forbidden)
        }
        _ => Ok(()),
    }
}

/// GET /event/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Event>, ApiError> {
    let row = run_store(&state, move |s| s.events.get_by_id(&id)).await?;

    row.map(Event::from)
        .filter(|event| event.family_id == claims.family_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Event not found"))
}

/// POST /get-family-events
pub async fn family_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<FamilyEventsRequest>, ApiError>,
) -> Result<Json<Vec<Event>>, ApiError> {
    ensure_same_family(&claims, req.family_id.as_deref())?;

    let rows = run_store(&state, move |s| s.events.list_by_family(&claims.family_id)).await?;
    Ok(Json(rows.into_iter().map(Event::from).collect()))
}

/// POST /new-event-entry
pub async fn new_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<NewEventRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_same_family(&claims, req.userfamily.as_deref())?;
    let draft = req.event.validate()?;

    let row = run_store(&state, move |s| {
        s.events.add_event(&draft, &claims.username, &claims.family_id)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(Event::from(row))))
}

/// POST /update-event/{id}
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateEventRequest>, ApiError>,
) -> Result<Json<UpdateEventResponse>, ApiError> {
    ensure_same_family(&claims, req.userfamily.as_deref())?;
    let patch = req.patch.normalized()?;

    let (event_id, family_id) = (id.clone(), claims.family_id.clone());
    let outcome = run_store(&state, move |s| s.events.update_in_family(&event_id, &family_id, &patch))
        .await?;

    let updated = match outcome {
        EventUpdate::Applied(updated) => updated,
        EventUpdate::NotFound => return Err(ApiError::NotFound("Event not found")),
        EventUpdate::Rejected(e) => return Err(e.into()),
    };
    info!("{} updated event {}", claims.username, id);

    Ok(Json(UpdateEventResponse {
        success: true,
        updated,
    }))
}

/// POST /delete-event/{id}
///
/// Deleting an unknown id, or one outside the caller's family, removes nothing.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let req: DeleteEventRequest = if body.is_empty() {
        DeleteEventRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::Validation(e.to_string()))?
    };
    ensure_same_family(&claims, req.userfamily.as_deref())?;

    let family_id = claims.family_id.clone();
    let removed = run_store(&state, move |s| {
        match s.events.get_by_id(&id)? {
            Some(event) if event.family_id == family_id => s.events.delete(&id),
            _ => Ok(0),
        }
    })
    .await?;

    info!("{} deleted {} event(s)", claims.username, removed);
    Ok(Json(DeleteEventResponse {
        success: true,
        removed,
    }))
}
