//! Application coordinator.
//!
//! Composes the session store and both collection stores over one remote
//! service handle. The coordinator is the only component that reads the
//! session to authorize collection work: every collection command resolves
//! the current identity and injects it into the store call, so the stores
//! themselves never reach into session state.
//!
//! It also owns the session-event plumbing: a pump task subscribed to the
//! service for the application's lifetime applies each event to the stores
//! and re-broadcasts it to any number of application-level subscribers.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{AuthProvider, RecordGateway, SessionEvent, SessionEvents};
use crate::domain::{
    Credentials, Identity, Item, ItemDraft, OtherCost, OtherCostDraft, RecordId, SpendSummary,
    StoreError,
};
use crate::navigation::{self, Screen};
use crate::stores::{CollectionStore, SessionStore};

/// Capacity of the re-broadcast channel. Subscribers that fall further
/// behind skip ahead rather than stall the pump.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Orchestrates the stores against one remote service.
pub struct Coordinator<S>
where
    S: AuthProvider + RecordGateway<Item> + RecordGateway<OtherCost> + 'static,
{
    service: Arc<S>,
    session: Arc<SessionStore<S>>,
    items: Arc<CollectionStore<Item, S>>,
    other_costs: Arc<CollectionStore<OtherCost, S>>,
    events: broadcast::Sender<SessionEvent>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl<S> Coordinator<S>
where
    S: AuthProvider + RecordGateway<Item> + RecordGateway<OtherCost> + 'static,
{
    /// Build a coordinator over the given service. No work starts until
    /// [`Coordinator::start`] is called.
    pub fn new(service: Arc<S>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(SessionStore::new(Arc::clone(&service))),
            items: Arc::new(CollectionStore::new(Arc::clone(&service))),
            other_costs: Arc::new(CollectionStore::new(Arc::clone(&service))),
            service,
            events,
            pump: Mutex::new(None),
        }
    }

    /// Resume any existing session and start the event pump.
    pub async fn start(&self) {
        self.resume_session().await;
        self.spawn_event_pump();
    }

    /// Populate the session store from a session that survived a restart.
    ///
    /// A lookup failure is logged and swallowed; the user simply signs in
    /// interactively instead.
    async fn resume_session(&self) {
        match self.service.get_session().await {
            Ok(Some(identity)) => {
                info!(user = %identity.id(), "session resumed");
                self.session.set_identity(Some(identity));
            }
            Ok(None) => debug!("no session to resume"),
            Err(error) => warn!(error = %error, "session resume failed"),
        }
    }

    fn spawn_event_pump(&self) {
        let mut feed = self.service.subscribe();
        let session = Arc::clone(&self.session);
        let items = Arc::clone(&self.items);
        let other_costs = Arc::clone(&self.other_costs);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = feed.next().await {
                Self::apply_event(&session, &items, &other_costs, &events, event);
            }
            debug!("session event feed closed");
        });
        if let Some(previous) = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
        {
            previous.abort();
        }
    }

    /// Apply one session event to the stores and re-broadcast it.
    ///
    /// A signed-out event with no active identity is a duplicate (the
    /// explicit sign-out path already ran) and is dropped without
    /// re-broadcasting.
    fn apply_event(
        session: &SessionStore<S>,
        items: &CollectionStore<Item, S>,
        other_costs: &CollectionStore<OtherCost, S>,
        events: &broadcast::Sender<SessionEvent>,
        event: SessionEvent,
    ) {
        match &event {
            SessionEvent::SignedIn(identity) => {
                debug!(user = %identity.id(), "session event: signed in");
                session.set_identity(Some(identity.clone()));
            }
            SessionEvent::SignedOut => {
                if session.identity().is_none() {
                    return;
                }
                debug!("session event: signed out");
                session.set_identity(None);
                items.clear();
                other_costs.clear();
            }
        }
        let _ = events.send(event);
    }

    /// Subscribe to the application-level session event feed.
    pub fn subscribe(&self) -> SessionEvents {
        SessionEvents::new(self.events.subscribe())
    }

    /// Stop the event pump. Store state is left as-is.
    pub fn shutdown(&self) {
        if let Some(handle) = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Register a new account.
    pub async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, StoreError> {
        self.session.sign_up(credentials).await
    }

    /// Authenticate and establish a session.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, StoreError> {
        self.session.sign_in(credentials).await
    }

    /// End the session and purge both collections.
    ///
    /// The purge also runs when the service's signed-out event arrives;
    /// doing it here as well keeps the stores correct even when the event
    /// feed is not running.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.session.sign_out().await?;
        self.items.clear();
        self.other_costs.clear();
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// Refresh the item list for the signed-in user.
    pub async fn fetch_items(&self) -> Result<Vec<Item>, StoreError> {
        self.items.fetch_all(self.current_identity().as_ref()).await
    }

    /// Create an item for the signed-in user.
    pub async fn add_item(&self, draft: &ItemDraft) -> Result<Item, StoreError> {
        self.items
            .create(self.current_identity().as_ref(), draft)
            .await
    }

    /// Update one of the signed-in user's items.
    pub async fn update_item(
        &self,
        id: &RecordId,
        draft: &ItemDraft,
    ) -> Result<Item, StoreError> {
        self.items
            .update(self.current_identity().as_ref(), id, draft)
            .await
    }

    /// Delete one of the signed-in user's items.
    pub async fn remove_item(&self, id: &RecordId) -> Result<(), StoreError> {
        self.items
            .delete(self.current_identity().as_ref(), id)
            .await
    }

    /// Refresh the other-cost list for the signed-in user.
    pub async fn fetch_other_costs(&self) -> Result<Vec<OtherCost>, StoreError> {
        self.other_costs
            .fetch_all(self.current_identity().as_ref())
            .await
    }

    /// Create an other-cost for the signed-in user.
    pub async fn add_other_cost(&self, draft: &OtherCostDraft) -> Result<OtherCost, StoreError> {
        self.other_costs
            .create(self.current_identity().as_ref(), draft)
            .await
    }

    /// Update one of the signed-in user's other-costs.
    pub async fn update_other_cost(
        &self,
        id: &RecordId,
        draft: &OtherCostDraft,
    ) -> Result<OtherCost, StoreError> {
        self.other_costs
            .update(self.current_identity().as_ref(), id, draft)
            .await
    }

    /// Delete one of the signed-in user's other-costs.
    pub async fn remove_other_cost(&self, id: &RecordId) -> Result<(), StoreError> {
        self.other_costs
            .delete(self.current_identity().as_ref(), id)
            .await
    }

    /// Aggregate totals over both collections as currently loaded.
    pub fn spend_summary(&self) -> SpendSummary {
        SpendSummary::new(&self.items.records(), &self.other_costs.records())
    }

    /// Resolve a navigation request against the current session state.
    pub fn resolve_screen(&self, requested: Screen) -> Screen {
        navigation::resolve(requested, self.current_identity().is_some())
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// The item collection store.
    pub fn items(&self) -> &CollectionStore<Item, S> {
        &self.items
    }

    /// The other-cost collection store.
    pub fn other_costs(&self) -> &CollectionStore<OtherCost, S> {
        &self.other_costs
    }
}

impl<S> Drop for Coordinator<S>
where
    S: AuthProvider + RecordGateway<Item> + RecordGateway<OtherCost> + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
