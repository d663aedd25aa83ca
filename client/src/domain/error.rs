//! Store-boundary error type.
//!
//! Validation errors never reach a store: they are surfaced by the draft and
//! credential constructors before any state transition. Everything else is
//! caught at the operation boundary, converted to a message, and recorded in
//! the owning store's error slot with status `Failed`.

use thiserror::Error;

use super::ports::{AuthProviderError, RecordGatewayError};

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A collection operation was attempted with no active identity. Raised
    /// locally; the remote service is never contacted.
    #[error("user not authenticated")]
    Unauthenticated,
    /// The remote auth service rejected the operation.
    #[error("{message}")]
    Auth {
        /// Human-readable failure description.
        message: String,
    },
    /// A data query or mutation failed; the service message passes through
    /// verbatim.
    #[error("{message}")]
    Remote {
        /// Human-readable failure description.
        message: String,
    },
}

impl StoreError {
    /// Helper for auth failures.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Helper for remote data failures.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

impl From<AuthProviderError> for StoreError {
    fn from(error: AuthProviderError) -> Self {
        Self::auth(error.to_string())
    }
}

impl From<RecordGatewayError> for StoreError {
    fn from(error: RecordGatewayError) -> Self {
        Self::remote(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_pass_the_message_through() {
        let err = StoreError::from(AuthProviderError::credentials("invalid login credentials"));
        assert_eq!(err.to_string(), "invalid login credentials");
    }

    #[test]
    fn remote_errors_keep_adapter_context() {
        let err = StoreError::from(RecordGatewayError::transport("connection refused"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn unauthenticated_has_a_stable_message() {
        assert_eq!(StoreError::Unauthenticated.to_string(), "user not authenticated");
    }
}
