//! Reqwest-backed Supabase service adapter.
//!
//! One adapter implements both ports: the auth endpoints under `/auth/v1/`
//! and the record tables under `/rest/v1/`. It owns transport details only:
//! request shaping, HTTP error mapping, JSON decoding into domain types,
//! and the in-memory access token for the active session. Session-change
//! events are emitted locally as each auth call completes, mirroring what a
//! server push would deliver.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use super::dto::{ErrorBodyDto, SignUpOutcome, SignUpResponseDto, SupabaseRecord, TokenResponseDto};
use crate::config::ServiceSettings;
use crate::domain::ports::{
    AuthProvider, AuthProviderError, RecordGateway, RecordGatewayError, SessionEvent,
    SessionEvents,
};
use crate::domain::{Credentials, Identity, RecordId, UserId};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Errors raised while constructing the adapter.
#[derive(Debug, Error)]
pub enum SupabaseSetupError {
    /// The configured URL cannot carry path segments.
    #[error("service URL cannot be used as a base: {url}")]
    InvalidBaseUrl {
        /// The offending URL.
        url: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying client error.
        #[from]
        source: reqwest::Error,
    },
}

#[derive(Debug)]
struct ActiveSession {
    access_token: String,
    identity: Identity,
}

/// Supabase adapter holding one HTTP client and the active session token.
#[derive(Debug)]
pub struct SupabaseService {
    client: Client,
    base_url: Url,
    service_key: String,
    session: Mutex<Option<ActiveSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SupabaseService {
    /// Build an adapter against one project URL with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot carry path segments or the
    /// reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SupabaseSetupError> {
        if base_url.cannot_be_a_base() {
            return Err(SupabaseSetupError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client,
            base_url,
            service_key: service_key.into(),
            session: Mutex::new(None),
            events,
        })
    }

    /// Build an adapter from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured URL or client is unusable.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, SupabaseSetupError> {
        Self::new(
            settings.service_url.clone(),
            settings.service_key.clone(),
            settings.request_timeout(),
        )
    }

    fn session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The constructor rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn table_url(&self, table: &str) -> Url {
        self.endpoint(&["rest", "v1", table])
    }

    fn bearer_token(&self) -> String {
        self.session()
            .as_ref()
            .map_or_else(|| self.service_key.clone(), |active| active.access_token.clone())
    }

    fn auth_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.service_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn record_request(&self, builder: RequestBuilder) -> RequestBuilder {
        self.auth_request(builder).bearer_auth(self.bearer_token())
    }

    fn establish_session(&self, access_token: String, identity: Identity) {
        *self.session() = Some(ActiveSession {
            access_token,
            identity: identity.clone(),
        });
        let _ = self.events.send(SessionEvent::SignedIn(identity));
    }

    async fn send_auth(&self, request: RequestBuilder) -> Result<Vec<u8>, AuthProviderError> {
        let response = request.send().await.map_err(map_auth_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_auth_transport_error)?;
        if !status.is_success() {
            return Err(map_auth_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn send_record(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, RecordGatewayError> {
        let response = request
            .send()
            .await
            .map_err(|error| RecordGatewayError::transport(error.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| RecordGatewayError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_record_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AuthProvider for SupabaseService {
    async fn get_session(&self) -> Result<Option<Identity>, AuthProviderError> {
        Ok(self.session().as_ref().map(|active| active.identity.clone()))
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, AuthProviderError> {
        let url = self.endpoint(&["auth", "v1", "signup"]);
        let request = self.auth_request(self.client.post(url)).json(&json!({
            "email": credentials.email().as_ref(),
            "password": credentials.password(),
        }));
        let body = self.send_auth(request).await?;
        let decoded: SignUpResponseDto = serde_json::from_slice(&body).map_err(|error| {
            AuthProviderError::service(format!("invalid sign-up payload: {error}"))
        })?;
        match decoded.into_outcome().map_err(AuthProviderError::service)? {
            SignUpOutcome::Session {
                access_token,
                identity,
            } => {
                debug!(user = %identity.id(), "sign-up established a session");
                self.establish_session(access_token, identity.clone());
                Ok(Some(identity))
            }
            SignUpOutcome::Pending => {
                debug!("sign-up awaits confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthProviderError> {
        let mut url = self.endpoint(&["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self.auth_request(self.client.post(url)).json(&json!({
            "email": credentials.email().as_ref(),
            "password": credentials.password(),
        }));
        let body = self.send_auth(request).await?;
        let decoded: TokenResponseDto = serde_json::from_slice(&body).map_err(|error| {
            AuthProviderError::service(format!("invalid token payload: {error}"))
        })?;
        let identity = decoded
            .user
            .into_identity()
            .map_err(AuthProviderError::service)?;
        debug!(user = %identity.id(), "signed in");
        self.establish_session(decoded.access_token, identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        let Some(access_token) = self
            .session()
            .as_ref()
            .map(|active| active.access_token.clone())
        else {
            return Ok(());
        };
        let url = self.endpoint(&["auth", "v1", "logout"]);
        let request = self
            .auth_request(self.client.post(url))
            .bearer_auth(access_token);
        self.send_auth(request).await?;
        *self.session() = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> SessionEvents {
        SessionEvents::new(self.events.subscribe())
    }
}

#[async_trait]
impl<R> RecordGateway<R> for SupabaseService
where
    R: SupabaseRecord,
{
    async fn list(&self, owner: &UserId) -> Result<Vec<R>, RecordGatewayError> {
        let mut url = self.table_url(R::TABLE);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("owner_id", &owner_filter(owner))
            .append_pair("order", "created_at.desc");
        let body = self.send_record(self.record_request(self.client.get(url))).await?;
        parse_rows::<R>(&body)
    }

    async fn insert(&self, owner: &UserId, draft: &R::Draft) -> Result<R, RecordGatewayError> {
        let url = self.table_url(R::TABLE);
        let mut payload = R::draft_payload(draft);
        if let Some(columns) = payload.as_object_mut() {
            columns.insert("owner_id".to_owned(), json!(owner.to_string()));
        }
        let request = self
            .record_request(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&payload);
        let body = self.send_record(request).await?;
        single_row::<R>(&body, "service returned no representation")
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Result<R, RecordGatewayError> {
        let mut url = self.table_url(R::TABLE);
        url.query_pairs_mut()
            .append_pair("id", &id_filter(id))
            .append_pair("owner_id", &owner_filter(owner));
        let request = self
            .record_request(self.client.patch(url))
            .header("Prefer", "return=representation")
            .json(&R::draft_payload(draft));
        let body = self.send_record(request).await?;
        single_row::<R>(&body, "record not found")
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RecordGatewayError> {
        let mut url = self.table_url(R::TABLE);
        url.query_pairs_mut()
            .append_pair("id", &id_filter(id))
            .append_pair("owner_id", &owner_filter(owner));
        self.send_record(self.record_request(self.client.delete(url)))
            .await?;
        Ok(())
    }
}

fn owner_filter(owner: &UserId) -> String {
    format!("eq.{owner}")
}

fn id_filter(id: &RecordId) -> String {
    format!("eq.{id}")
}

fn parse_rows<R: SupabaseRecord>(body: &[u8]) -> Result<Vec<R>, RecordGatewayError> {
    let rows: Vec<R::Row> = serde_json::from_slice(body).map_err(|error| {
        RecordGatewayError::decode(format!("invalid {} payload: {error}", R::TABLE))
    })?;
    rows.into_iter()
        .map(|row| R::from_row(row).map_err(RecordGatewayError::decode))
        .collect()
}

fn single_row<R: SupabaseRecord>(body: &[u8], missing: &str) -> Result<R, RecordGatewayError> {
    parse_rows::<R>(body)?
        .into_iter()
        .next()
        .ok_or_else(|| RecordGatewayError::service(missing.to_owned()))
}

fn map_auth_transport_error(error: reqwest::Error) -> AuthProviderError {
    AuthProviderError::transport(error.to_string())
}

fn map_auth_status_error(status: StatusCode, body: &[u8]) -> AuthProviderError {
    let message = error_message(status, body);
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => AuthProviderError::credentials(message),
        _ => AuthProviderError::service(message),
    }
}

fn map_record_status_error(status: StatusCode, body: &[u8]) -> RecordGatewayError {
    RecordGatewayError::service(error_message(status, body))
}

/// Prefer the service's own message; fall back to the status line with a
/// trimmed body preview.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(decoded) = serde_json::from_slice::<ErrorBodyDto>(body)
        && let Some(message) = decoded.into_message()
    {
        return message;
    }
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

/// Whitespace-collapsed, length-capped slice of a response body, safe to
/// embed in an error message.
fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() <= PREVIEW_CHAR_LIMIT {
        return compact;
    }
    let truncated = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    format!("{truncated}...")
}
