//! Generic collection state container.
//!
//! One instance exists per record shape (items, other costs); the logic is
//! identical between the two, so it is written once over [`CostRecord`] and
//! a [`RecordGateway`].
//!
//! The owning identity is injected into every call rather than read from a
//! global, which makes the authentication dependency an explicit, testable
//! parameter. A call with no identity fails fast with the unauthenticated
//! error and never reaches the gateway.
//!
//! One status/error pair exists per store, not per in-flight operation. Two
//! operations may be in flight at once; each completion is applied atomically
//! under the state lock, in response-arrival order. Whichever completes last
//! determines the final status.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::RecordGateway;
use crate::domain::{AsyncStatus, CostRecord, Identity, RecordId, StoreError, UserId};

/// Read-only view of a collection store handed to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<R> {
    /// Owned records, newest-first.
    pub records: Vec<R>,
    /// Lifecycle of the most recent collection operation.
    pub status: AsyncStatus,
    /// Message from the most recent failure, cleared on the next issue.
    pub error: Option<String>,
}

struct CollectionState<R> {
    records: Vec<R>,
    status: AsyncStatus,
    error: Option<String>,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: AsyncStatus::Idle,
            error: None,
        }
    }
}

/// State container for one ordered list of owned cost records.
pub struct CollectionStore<R, G> {
    gateway: Arc<G>,
    state: Mutex<CollectionState<R>>,
}

impl<R, G> CollectionStore<R, G>
where
    R: CostRecord,
{
    /// Create an empty, idle store backed by the given gateway.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Mutex::new(CollectionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CollectionState<R>> {
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
        warn!(kind = R::kind(), error = %error, "collection operation failed");
        error
    }

    fn succeed(&self, apply: impl FnOnce(&mut Vec<R>)) {
        let mut state = self.state();
        apply(&mut state.records);
        state.status = AsyncStatus::Succeeded;
        state.error = None;
    }

    fn require_owner<'a>(
        &self,
        owner: Option<&'a Identity>,
    ) -> Result<&'a UserId, StoreError> {
        owner
            .map(Identity::id)
            .ok_or_else(|| self.fail(StoreError::Unauthenticated))
    }

    /// Clear the error slot without touching status or records.
    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Drop all records and return to the initial idle state.
    ///
    /// Used by the sign-out purge so stale data is never served as
    /// authoritative after the session ends.
    pub fn clear(&self) {
        let mut state = self.state();
        state.records.clear();
        state.status = AsyncStatus::Idle;
        state.error = None;
    }

    /// Owned records, newest-first.
    pub fn records(&self) -> Vec<R> {
        self.state().records.clone()
    }

    /// Lifecycle of the most recent collection operation.
    pub fn status(&self) -> AsyncStatus {
        self.state().status
    }

    /// Message from the most recent failure.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Snapshot of the full collection state.
    pub fn snapshot(&self) -> CollectionSnapshot<R> {
        let state = self.state();
        CollectionSnapshot {
            records: state.records.clone(),
            status: state.status,
            error: state.error.clone(),
        }
    }
}

impl<R, G> CollectionStore<R, G>
where
    R: CostRecord,
    G: RecordGateway<R>,
{
    /// Replace the list with all records owned by the identity, newest-first.
    ///
    /// On failure the existing list is left untouched: stale-but-available
    /// beats blanking the UI.
    pub async fn fetch_all(&self, owner: Option<&Identity>) -> Result<Vec<R>, StoreError> {
        self.begin();
        let owner = self.require_owner(owner)?;
        debug!(kind = R::kind(), owner = %owner, "fetch issued");
        match self.gateway.list(owner).await {
            Ok(records) => {
                self.succeed(|list| *list = records.clone());
                Ok(records)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Create a record from a validated draft and prepend it to the list.
    ///
    /// The new record is prepended, not re-sorted against existing entries,
    /// so the most recent action is always first regardless of timestamp
    /// skew from the server.
    pub async fn create(
        &self,
        owner: Option<&Identity>,
        draft: &R::Draft,
    ) -> Result<R, StoreError> {
        self.begin();
        let owner = self.require_owner(owner)?;
        debug!(kind = R::kind(), owner = %owner, "create issued");
        match self.gateway.insert(owner, draft).await {
            Ok(record) => {
                self.succeed(|list| list.insert(0, record.clone()));
                Ok(record)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Replace the fields of the record matching `id`, preserving its
    /// position in the list.
    ///
    /// If no record with that id exists locally, the committed result is
    /// silently discarded rather than inserted: the store never
    /// materializes records it did not fetch or create itself.
    pub async fn update(
        &self,
        owner: Option<&Identity>,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Result<R, StoreError> {
        self.begin();
        let owner = self.require_owner(owner)?;
        debug!(kind = R::kind(), owner = %owner, record = %id, "update issued");
        match self.gateway.update(owner, id, draft).await {
            Ok(record) => {
                self.succeed(|list| {
                    if let Some(position) = list.iter().position(|entry| entry.id() == id) {
                        list[position] = record.clone();
                    }
                });
                Ok(record)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Remove the record matching `id` from the list; absent ids are a
    /// no-op.
    pub async fn delete(
        &self,
        owner: Option<&Identity>,
        id: &RecordId,
    ) -> Result<(), StoreError> {
        self.begin();
        let owner = self.require_owner(owner)?;
        debug!(kind = R::kind(), owner = %owner, record = %id, "delete issued");
        match self.gateway.delete(owner, id).await {
            Ok(()) => {
                self.succeed(|list| list.retain(|entry| entry.id() != id));
                Ok(())
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
