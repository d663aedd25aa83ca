//! Port for owner-scoped cost record persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CostRecord, RecordId, UserId};

/// Errors surfaced by record gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordGatewayError {
    /// The data service reported a failure; its message passes through
    /// verbatim.
    #[error("{message}")]
    Service {
        /// Human-readable failure description.
        message: String,
    },
    /// The request never produced a service response.
    #[error("request failed: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
    },
    /// The response body could not be decoded into domain records.
    #[error("invalid response payload: {message}")]
    Decode {
        /// Human-readable failure description.
        message: String,
    },
}

impl RecordGatewayError {
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

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for querying and mutating one owner's cost records.
///
/// Every call is scoped to the owning identity; mutations are additionally
/// scoped to the record id, so a guessed id cannot act on another identity's
/// record. `list` returns newest-created-first.
#[async_trait]
pub trait RecordGateway<R: CostRecord>: Send + Sync {
    /// Query all records owned by `owner`, ordered by creation time
    /// descending.
    async fn list(&self, owner: &UserId) -> Result<Vec<R>, RecordGatewayError>;

    /// Create a record from a validated draft. The service assigns the id,
    /// the owner, and the creation timestamp.
    async fn insert(&self, owner: &UserId, draft: &R::Draft)
    -> Result<R, RecordGatewayError>;

    /// Replace the fields of the record matching `id` AND `owner`.
    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Result<R, RecordGatewayError>;

    /// Delete the record matching `id` AND `owner`. Deleting an id that
    /// matches nothing succeeds.
    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RecordGatewayError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn service_errors_pass_the_message_through() {
        let err = RecordGatewayError::service("row level security violation");
        assert_eq!(err.to_string(), "row level security violation");
    }

    #[rstest]
    fn decode_errors_carry_context() {
        let err = RecordGatewayError::decode("missing field `cost`");
        assert_eq!(
            err.to_string(),
            "invalid response payload: missing field `cost`"
        );
    }
}
