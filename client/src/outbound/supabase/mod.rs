//! Supabase outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `AuthProvider`
//! and `RecordGateway` ports against one Supabase project.

mod dto;
mod http_service;

pub use http_service::{SupabaseService, SupabaseSetupError};
