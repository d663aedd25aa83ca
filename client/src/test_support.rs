//! In-memory stand-in for the remote data service.
//!
//! Implements every port the coordinator needs against plain mutex-guarded
//! state, emitting the same session events a real adapter would. Enabled via
//! the `test-support` feature so tests and demos can share it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::domain::ports::{
    AuthProvider, AuthProviderError, RecordGateway, RecordGatewayError, SessionEvent,
    SessionEvents,
};
use crate::domain::{
    CostRecord, Credentials, Identity, Item, ItemDraft, OtherCost, OtherCostDraft, RecordId,
    UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fake remote service: auth provider and both record gateways in one.
///
/// Record lists are kept newest-first, matching the ordering contract of the
/// real service. Auth operations emit [`SessionEvent`]s exactly as an adapter
/// wrapping the real service would.
pub struct InMemoryRemoteService {
    accounts: Mutex<HashMap<String, (String, UserId)>>,
    session: Mutex<Option<Identity>>,
    items: Mutex<Vec<Item>>,
    other_costs: Mutex<Vec<OtherCost>>,
    events: broadcast::Sender<SessionEvent>,
    fail_next_auth: Mutex<Option<AuthProviderError>>,
    fail_next_record: Mutex<Option<RecordGatewayError>>,
    record_calls: AtomicUsize,
    require_confirmation: AtomicBool,
}

impl Default for InMemoryRemoteService {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            items: Mutex::new(Vec::new()),
            other_costs: Mutex::new(Vec::new()),
            events,
            fail_next_auth: Mutex::new(None),
            fail_next_record: Mutex::new(None),
            record_calls: AtomicUsize::new(0),
            require_confirmation: AtomicBool::new(false),
        }
    }
}

impl InMemoryRemoteService {
    /// Register an account without signing it in.
    pub fn register_account(&self, email: &str, password: &str) -> Identity {
        let identity = Identity::try_from_strings(&UserId::random().to_string(), email)
            .unwrap_or_else(|error| panic!("fixture identity must be valid: {error}"));
        lock(&self.accounts).insert(
            email.to_owned(),
            (password.to_owned(), identity.id().clone()),
        );
        identity
    }

    /// Register an account and mark its session active, as if a prior
    /// sign-in survived an application restart.
    pub fn with_active_session(&self, email: &str, password: &str) -> Identity {
        let identity = self.register_account(email, password);
        *lock(&self.session) = Some(identity.clone());
        identity
    }

    /// Make sign-up withhold the session, as services requiring email
    /// confirmation do.
    pub fn require_confirmation(&self) {
        self.require_confirmation.store(true, Ordering::SeqCst);
    }

    /// Prime the next auth call to fail.
    pub fn fail_next_auth(&self, error: AuthProviderError) {
        *lock(&self.fail_next_auth) = Some(error);
    }

    /// Prime the next record call to fail.
    pub fn fail_next_record(&self, error: RecordGatewayError) {
        *lock(&self.fail_next_record) = Some(error);
    }

    /// Number of record-gateway calls that reached the service.
    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    /// Push a session event, standing in for an out-of-band change such as
    /// a token expiring or a sign-out in another tab.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Store an item owned by `owner`, newest-first.
    pub fn seed_item(&self, owner: &UserId, name: &str, cost: f64) -> Item {
        let record = Item::new(RecordId::random(), name, cost, owner.clone(), Utc::now());
        lock(&self.items).insert(0, record.clone());
        record
    }

    /// Store an other-cost owned by `owner`, newest-first.
    pub fn seed_other_cost(&self, owner: &UserId, description: &str, amount: f64) -> OtherCost {
        let record = OtherCost::new(
            RecordId::random(),
            description,
            amount,
            owner.clone(),
            Utc::now(),
        );
        lock(&self.other_costs).insert(0, record.clone());
        record
    }

    fn check_auth(&self) -> Result<(), AuthProviderError> {
        match lock(&self.fail_next_auth).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn check_record(&self) -> Result<(), RecordGatewayError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.fail_next_record).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthProvider for InMemoryRemoteService {
    async fn get_session(&self) -> Result<Option<Identity>, AuthProviderError> {
        self.check_auth()?;
        Ok(lock(&self.session).clone())
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, AuthProviderError> {
        self.check_auth()?;
        let email = credentials.email().as_ref().to_owned();
        if lock(&self.accounts).contains_key(&email) {
            return Err(AuthProviderError::credentials("User already registered"));
        }
        let identity = self.register_account(&email, credentials.password());
        if self.require_confirmation.load(Ordering::SeqCst) {
            return Ok(None);
        }
        *lock(&self.session) = Some(identity.clone());
        let _ = self.events.send(SessionEvent::SignedIn(identity.clone()));
        Ok(Some(identity))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthProviderError> {
        self.check_auth()?;
        let email = credentials.email().as_ref().to_owned();
        let user_id = {
            let accounts = lock(&self.accounts);
            match accounts.get(&email) {
                Some((password, user_id)) if password == credentials.password() => {
                    user_id.clone()
                }
                _ => return Err(AuthProviderError::credentials("Invalid login credentials")),
            }
        };
        let identity = Identity::try_from_strings(&user_id.to_string(), &email)
            .map_err(|error| AuthProviderError::service(error.to_string()))?;
        *lock(&self.session) = Some(identity.clone());
        let _ = self.events.send(SessionEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        self.check_auth()?;
        *lock(&self.session) = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> SessionEvents {
        SessionEvents::new(self.events.subscribe())
    }
}

#[async_trait]
impl RecordGateway<Item> for InMemoryRemoteService {
    async fn list(&self, owner: &UserId) -> Result<Vec<Item>, RecordGatewayError> {
        self.check_record()?;
        Ok(lock(&self.items)
            .iter()
            .filter(|record| record.owner_id() == owner)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        owner: &UserId,
        draft: &ItemDraft,
    ) -> Result<Item, RecordGatewayError> {
        self.check_record()?;
        Ok(self.seed_item(owner, draft.name(), draft.cost()))
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &ItemDraft,
    ) -> Result<Item, RecordGatewayError> {
        self.check_record()?;
        let mut items = lock(&self.items);
        let position = items
            .iter()
            .position(|record| record.id() == id && record.owner_id() == owner);
        match position {
            Some(position) => {
                let replaced = Item::new(
                    id.clone(),
                    draft.name(),
                    draft.cost(),
                    owner.clone(),
                    items[position].created_at(),
                );
                items[position] = replaced.clone();
                Ok(replaced)
            }
            None => Err(RecordGatewayError::service("record not found")),
        }
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RecordGatewayError> {
        self.check_record()?;
        lock(&self.items).retain(|record| record.id() != id || record.owner_id() != owner);
        Ok(())
    }
}

#[async_trait]
impl RecordGateway<OtherCost> for InMemoryRemoteService {
    async fn list(&self, owner: &UserId) -> Result<Vec<OtherCost>, RecordGatewayError> {
        self.check_record()?;
        Ok(lock(&self.other_costs)
            .iter()
            .filter(|record| record.owner_id() == owner)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        owner: &UserId,
        draft: &OtherCostDraft,
    ) -> Result<OtherCost, RecordGatewayError> {
        self.check_record()?;
        Ok(self.seed_other_cost(owner, draft.description(), draft.amount()))
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &OtherCostDraft,
    ) -> Result<OtherCost, RecordGatewayError> {
        self.check_record()?;
        let mut records = lock(&self.other_costs);
        let position = records
            .iter()
            .position(|record| record.id() == id && record.owner_id() == owner);
        match position {
            Some(position) => {
                let replaced = OtherCost::new(
                    id.clone(),
                    draft.description(),
                    draft.amount(),
                    owner.clone(),
                    records[position].created_at(),
                );
                records[position] = replaced.clone();
                Ok(replaced)
            }
            None => Err(RecordGatewayError::service("record not found")),
        }
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RecordGatewayError> {
        self.check_record()?;
        lock(&self.other_costs)
            .retain(|record| record.id() != id || record.owner_id() != owner);
        Ok(())
    }
}
