use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use family_types::api::{
    DeleteEventRequest, DeleteEventResponse, ErrorBody, FamilyEventsRequest, LoginRequest,
    LoginResponse, NewEventRequest, RegisterRequest, RegisterResponse, UpdateEventRequest,
    UpdateEventResponse,
};
use family_types::models::{Event, EventDraft, EventPatch, User};

use crate::error::ClientError;
use crate::session::{Session, SessionStore};

pub struct FamilyClient {
    http: reqwest::Client,
    base_url: String,
    sessions: SessionStore,
}

impl FamilyClient {
    pub fn new(base_url: impl Into<String>, sessions: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The stored session, or `NotLoggedIn`.
    pub fn session(&self) -> Result<Session, ClientError> {
        self.sessions.load()?.ok_or(ClientError::NotLoggedIn)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<(RequestBuilder, Session), ClientError> {
        let session = self.session()?;
        Ok((builder.bearer_auth(&session.token), session))
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        family_id: &str,
    ) -> Result<(), ClientError> {
        let body = RegisterRequest {
            username: username.into(),
            password: password.into(),
            family_id: family_id.into(),
        };
        let response = self.http.post(self.url("/register")).json(&body).send().await?;
        let registered: RegisterResponse =
            read(response, "Registration failed. Please try again.").await?;

        if !registered.success {
            return Err(ClientError::Api {
                status: 200,
                message: "Registration failed. Please try again.".into(),
            });
        }
        Ok(())
    }

    /// Log in and persist the returned session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        family_id: &str,
    ) -> Result<Session, ClientError> {
        let body = LoginRequest {
            username: username.into(),
            password: password.into(),
            family_id: family_id.into(),
        };
        let response = self.http.post(self.url("/login")).json(&body).send().await?;
        let login: LoginResponse = read(response, "Invalid username or password").await?;

        if !login.success || login.token.is_empty() {
            return Err(ClientError::Api {
                status: 200,
                message: "Login failed: Server response was invalid.".into(),
            });
        }

        let session = Session {
            token: login.token,
            username: login.username,
            family_id: login.userfamily,
            role: login.userrole,
        };
        self.sessions.save(&session)?;
        debug!("Session saved to {}", self.sessions.path().display());
        Ok(session)
    }

    /// Register, then log straight in with the same credentials.
    pub async fn register_and_login(
        &self,
        username: &str,
        password: &str,
        family_id: &str,
    ) -> Result<Session, ClientError> {
        self.register(username, password, family_id).await?;
        self.login(username, password, family_id).await
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.sessions.clear()
    }

    /// Every event of the logged-in user's family.
    pub async fn family_events(&self) -> Result<Vec<Event>, ClientError> {
        let (builder, session) = self.authed(self.http.post(self.url("/get-family-events")))?;
        let body = FamilyEventsRequest {
            family_id: Some(session.family_id),
        };
        let response = builder.json(&body).send().await?;
        read(response, "Failed to load events.").await
    }

    pub async fn event(&self, id: &str) -> Result<Event, ClientError> {
        let (builder, _) = self.authed(self.http.get(self.url(&format!("/event/{id}"))))?;
        let response = builder.send().await?;
        read(response, "Failed to load event details.").await
    }

    pub async fn add_event(&self, draft: &EventDraft) -> Result<Event, ClientError> {
        let (builder, session) = self.authed(self.http.post(self.url("/new-event-entry")))?;
        let event = draft
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let body = NewEventRequest {
            event,
            username: Some(session.username),
            userfamily: Some(session.family_id),
            userrole: Some(session.role),
        };
        let response = builder.json(&body).send().await?;
        read(response, "Failed to add event. Please try again.").await
    }

    /// Load the event, check the edited result locally, then send the patch.
    pub async fn update_event(&self, id: &str, patch: &EventPatch) -> Result<usize, ClientError> {
        let current = self.event(id).await?;
        current
            .draft()
            .merged(patch)
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let (builder, session) =
            self.authed(self.http.post(self.url(&format!("/update-event/{id}"))))?;
        let body = UpdateEventRequest {
            patch: patch.clone(),
            username: Some(session.username),
            userfamily: Some(session.family_id),
        };
        let response = builder.json(&body).send().await?;
        let updated: UpdateEventResponse =
            read(response, "Failed to update event. Please try again.").await?;
        Ok(updated.updated)
    }

    /// Returns how many events were removed (0 if it was already gone).
    pub async fn delete_event(&self, id: &str) -> Result<usize, ClientError> {
        let (builder, session) =
            self.authed(self.http.post(self.url(&format!("/delete-event/{id}"))))?;
        let body = DeleteEventRequest {
            username: Some(session.username),
            userfamily: Some(session.family_id),
        };
        let response = builder.json(&body).send().await?;
        let deleted: DeleteEventResponse = read(response, "Failed to delete event.").await?;
        Ok(deleted.removed)
    }

    pub async fn all_users(&self) -> Result<Vec<User>, ClientError> {
        let (builder, _) = self.authed(self.http.get(self.url("/all-users")))?;
        let response = builder.send().await?;
        read(response, "Failed to load users.").await
    }
}

/// Decode a success body, or turn an error status into `ClientError::Api`
/// carrying the server's message when present.
async fn read<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
