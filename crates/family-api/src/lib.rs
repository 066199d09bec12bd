pub mod auth;
pub mod error;
pub mod events;
pub mod middleware;
pub mod password;
pub mod token;

use axum::{
    Router,
    http::{StatusCode, header},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::error;

use crate::auth::{AppState, AppStateInner};
use crate::error::ApiError;

/// Build the API router around injected state. Transport layers (CORS,
/// tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/all-users", get(auth::all_users))
        .route("/event/{id}", get(events::get_event))
        .route("/get-family-events", post(events::family_events))
        .route("/new-event-entry", post(events::new_event))
        .route("/update-event/{id}", post(events::update_event))
        .route("/delete-event/{id}", post(events::delete_event))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "404 Not found",
    )
}

/// Run blocking store work off the async runtime. Store errors are logged
/// here and reported to the client as a generic failure.
pub(crate) async fn run_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Store error: {:#}", e);
            ApiError::Internal
        })
}
