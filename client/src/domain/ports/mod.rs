//! Ports describing the remote data/auth service boundary.
//!
//! The core treats the remote service as a single request/response boundary
//! per call. Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of returning `anyhow::Result`.

mod auth_provider;
mod record_gateway;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{
    AuthProvider, AuthProviderError, FixtureAuthProvider, SessionEvent, SessionEvents,
};
pub use record_gateway::{RecordGateway, RecordGatewayError};
