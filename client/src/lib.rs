//! Client-side state synchronisation for the project cost tracker.
//!
//! The crate mirrors remote data into mutex-guarded stores following a
//! shared async-status protocol, gates every collection operation on the
//! authenticated identity, and keeps the stores consistent with session
//! events pushed by the remote service.

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod navigation;
pub mod outbound;
pub mod stores;
pub mod telemetry;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use coordinator::Coordinator;
