//! Session state container.
//!
//! Holds the authenticated identity plus the shared async-status discipline:
//! `Loading` with a cleared error slot when an operation is issued,
//! `Succeeded` with the payload applied on success, `Failed` with the
//! message recorded on failure. State mutates only when a response is
//! applied, never while one is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::AuthProvider;
use crate::domain::{AsyncStatus, Credentials, Identity, StoreError};

/// Read-only view of the session store handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The authenticated identity, absent when signed out.
    pub identity: Option<Identity>,
    /// Lifecycle of the most recent session operation.
    pub status: AsyncStatus,
    /// Message from the most recent failure, cleared on the next issue.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    status: AsyncStatus,
    error: Option<String>,
}

/// State container for the authentication session.
pub struct SessionStore<A> {
    auth: Arc<A>,
    state: Mutex<SessionState>,
}

impl<A> SessionStore<A> {
    /// Create an idle store backed by the given auth provider.
    pub fn new(auth: Arc<A>) -> Self {
        Self {
            auth,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.state();
        state.status = AsyncStatus::Loading;
        state.error = None;
    }

    fn fail(&self, error: StoreError) -> StoreError {
        let mut state = self.state();
        state.status = AsyncStatus::Failed;
        state.error = Some(error.to_string());
        warn!(error = %error, "session operation failed");
        error
    }

    /// Directly apply an identity, bypassing the async protocol.
    ///
    /// This is the session-change notification path: an out-of-band signal
    /// from the remote service always lands the store on `Succeeded`.
    pub fn set_identity(&self, identity: Option<Identity>) {
        let mut state = self.state();
        state.identity = identity;
        state.status = AsyncStatus::Succeeded;
    }

    /// Clear the error slot without touching status or identity.
    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    /// Lifecycle of the most recent session operation.
    pub fn status(&self) -> AsyncStatus {
        self.state().status
    }

    /// Message from the most recent failure.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Snapshot of the full session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            identity: state.identity.clone(),
            status: state.status,
            error: state.error.clone(),
        }
    }
}

impl<A> SessionStore<A>
where
    A: AuthProvider,
{
    /// Register a new account.
    ///
    /// On success the returned identity replaces the current one, including
    /// the none case when the service requires separate confirmation. On
    /// failure the identity is unchanged.
    pub async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, StoreError> {
        self.begin();
        debug!(email = %credentials.email(), "sign-up issued");
        match self.auth.sign_up(credentials).await {
            Ok(identity) => {
                let mut state = self.state();
                state.identity = identity.clone();
                state.status = AsyncStatus::Succeeded;
                Ok(identity)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Authenticate and replace the current identity.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, StoreError> {
        self.begin();
        debug!(email = %credentials.email(), "sign-in issued");
        match self.auth.sign_in(credentials).await {
            Ok(identity) => {
                let mut state = self.state();
                state.identity = Some(identity.clone());
                state.status = AsyncStatus::Succeeded;
                Ok(identity)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// End the session.
    ///
    /// A failed sign-out keeps the identity: the server state is unknown, and
    /// silently dropping the session client-side would present a false
    /// logged-out state.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.begin();
        debug!("sign-out issued");
        match self.auth.sign_out().await {
            Ok(()) => {
                let mut state = self.state();
                state.identity = None;
                state.status = AsyncStatus::Succeeded;
                Ok(())
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
