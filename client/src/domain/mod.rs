//! Domain primitives and the remote-service boundary.
//!
//! Purpose: define the strongly typed state the stores hold (identities,
//! cost records, statuses, errors) plus the ports the stores call through.
//! Keep types immutable and document invariants in each type's Rustdoc.

pub mod error;
pub mod identity;
pub mod ports;
pub mod record;
pub mod status;
pub mod summary;

pub use self::error::StoreError;
pub use self::identity::{
    Credentials, EmailAddress, Identity, IdentityValidationError, UserId,
};
pub use self::record::{
    CostRecord, Item, ItemDraft, OtherCost, OtherCostDraft, RecordId, RecordValidationError,
};
pub use self::status::AsyncStatus;
pub use self::summary::SpendSummary;
