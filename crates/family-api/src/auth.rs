use std::sync::Arc;

use anyhow::anyhow;
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use tracing::{error, info, warn};

use family_db::models::NewUser;
use family_db::{EventStore, UserStore};
use family_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use family_types::models::User;
use family_types::{ADMIN_ROLE, DEFAULT_ROLE};

use crate::error::ApiError;
use crate::password;
use crate::run_store;
use crate::token::AuthKeys;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler needs, injected once at startup.
pub struct AppStateInner {
    pub users: UserStore,
    pub events: EventStore,
    pub keys: AuthKeys,
}

fn require_credentials(username: &str, password: &str, family_id: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() || password.is_empty() || family_id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Username, password and family ID are required.".into(),
        ));
    }
    Ok(())
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    require_credentials(&req.username, &req.password, &req.family_id)?;

    let (username, family_id) = (req.username.clone(), req.family_id.clone());
    let created = run_store(&state, move |s| {
        let salted = password::hash_password(&req.password)
            .map_err(|e| anyhow!("Password hashing failed: {}", e))?;

        s.users.create_if_absent(&NewUser {
            username: req.username,
            family_id: req.family_id,
            hash: salted.hash,
            salt: salted.salt,
            role: DEFAULT_ROLE.to_string(),
        })
    })
    .await?;

    if created.is_none() {
        warn!("Registration refused: {} already exists in family {}", username, family_id);
        return Err(ApiError::Conflict("User already exists in this family."));
    }

    Ok((StatusCode::CREATED, Json(RegisterResponse { success: true })))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    require_credentials(&req.username, &req.password, &req.family_id)?;

    let user = run_store(&state, move |s| {
        let user = s.users.lookup(&req.username, &req.family_id)?;
        Ok(match user {
            Some(user) if password::verify_password(&req.password, &user.hash, &user.salt) => {
                Some(user)
            }
            Some(_) => None,
            None => {
                password::verify_dummy(&req.password);
                None
            }
        })
    })
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    let token = state.keys.issue(&user).map_err(|e| {
        error!("Failed to sign token for {}: {}", user.username, e);
        ApiError::Internal
    })?;

    info!("{} logged in to family {}", user.username, user.family_id);

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: state.keys.ttl_secs(),
        username: user.username,
        userfamily: user.family_id,
        userrole: user.role,
    }))
}

/// GET /all-users
///
/// Administrators see every account; everyone else sees their own family.
pub async fn all_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = run_store(&state, move |s| {
        if claims.role == ADMIN_ROLE {
            s.users.list_all()
        } else {
            let rows = s.users.list_by_family(&claims.family_id)?;
            Ok(rows.into_iter().map(User::from).collect())
        }
    })
    .await?;

    Ok(Json(users))
}
