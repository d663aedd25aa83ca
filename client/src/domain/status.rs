//! Asynchronous operation lifecycle shared by every store.

use serde::{Deserialize, Serialize};

/// Four-state lifecycle attached to each store independently.
///
/// A store is created `Idle`, moves to `Loading` when an operation is
/// issued, and lands on `Succeeded` or `Failed` when the response is
/// applied. Stores never share a status: the session store and the two
/// collection stores each carry their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncStatus {
    /// No operation has been issued yet.
    #[default]
    Idle,
    /// An operation is in flight.
    Loading,
    /// The most recent operation completed successfully.
    Succeeded,
    /// The most recent operation failed; the error slot holds the message.
    Failed,
}

impl AsyncStatus {
    /// True while an operation is awaiting the remote service.
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(AsyncStatus::default(), AsyncStatus::Idle);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&AsyncStatus::Succeeded).expect("serialize");
        assert_eq!(json, "\"succeeded\"");
    }
}
