//! Port for authentication and session-change notifications.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::domain::{Credentials, Identity};

/// Errors surfaced by auth adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthProviderError {
    /// The service rejected the credentials (bad login, duplicate account,
    /// expired session). The service message is preserved verbatim.
    #[error("{message}")]
    Credentials {
        /// Human-readable failure description.
        message: String,
    },
    /// The auth service failed for a non-credential reason.
    #[error("auth service error: {message}")]
    Service {
        /// Human-readable failure description.
        message: String,
    },
    /// The request never produced a service response.
    #[error("auth request failed: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
    },
}

impl AuthProviderError {
    /// Helper for credential rejections.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Helper for service-side failures.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Session lifecycle notification delivered by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established for the given identity.
    SignedIn(Identity),
    /// The active session ended.
    SignedOut,
}

/// Subscription handle over the session-change feed.
///
/// Dropping the handle unsubscribes. Slow subscribers that lag behind the
/// channel skip the missed events and keep receiving.
pub struct SessionEvents {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionEvents {
    /// Wrap a broadcast receiver.
    pub fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next session event; `None` once the feed closes.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Closed) => return None,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session event subscriber lagged");
                }
            }
        }
    }
}

/// Port for the remote authentication service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Return the identity of the currently active session, if any.
    async fn get_session(&self) -> Result<Option<Identity>, AuthProviderError>;

    /// Register a new account. Services that require separate confirmation
    /// establish no session and return `None`; others return the signed-in
    /// identity.
    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, AuthProviderError>;

    /// Authenticate and establish a session.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthProviderError>;

    /// End the active session.
    async fn sign_out(&self) -> Result<(), AuthProviderError>;

    /// Subscribe to session-change notifications for the application's
    /// lifetime. Drop the handle to unsubscribe.
    fn subscribe(&self) -> SessionEvents;
}

/// Fixture provider for tests that never exercise authentication.
///
/// Reports no active session and rejects every credential pair; the event
/// feed stays open but silent.
pub struct FixtureAuthProvider {
    events: broadcast::Sender<SessionEvent>,
}

impl Default for FixtureAuthProvider {
    fn default() -> Self {
        let (events, _) = broadcast::channel(8);
        Self { events }
    }
}

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn get_session(&self) -> Result<Option<Identity>, AuthProviderError> {
        Ok(None)
    }

    async fn sign_up(
        &self,
        _credentials: &Credentials,
    ) -> Result<Option<Identity>, AuthProviderError> {
        Err(AuthProviderError::service("sign-up is not available"))
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<Identity, AuthProviderError> {
        Err(AuthProviderError::credentials("invalid login credentials"))
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        Ok(())
    }

    fn subscribe(&self) -> SessionEvents {
        SessionEvents::new(self.events.subscribe())
    }
}
