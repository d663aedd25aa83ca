//! State containers mirroring remote data.
//!
//! Each store owns one slice of client state behind a mutex and applies the
//! shared async-status protocol to every remote operation. Stores never talk
//! to each other; the coordinator composes them.

pub mod collection;
pub mod session;

pub use self::collection::{CollectionSnapshot, CollectionStore};
pub use self::session::{SessionSnapshot, SessionStore};
