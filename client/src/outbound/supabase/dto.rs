//! DTOs for decoding Supabase auth and table responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into
//! domain types in one pass. Table rows are tied to their record shape via
//! [`SupabaseRecord`], which also names the table and shapes the write
//! payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::domain::{CostRecord, Identity, Item, OtherCost, RecordId, UserId};

/// Auth user object returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: String,
    pub(super) email: Option<String>,
}

impl UserDto {
    pub(super) fn into_identity(self) -> Result<Identity, String> {
        let email = self
            .email
            .ok_or_else(|| format!("user {} missing email", self.id))?;
        Identity::try_from_strings(&self.id, email).map_err(|error| error.to_string())
    }
}

/// Password-grant token response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    pub(super) user: UserDto,
}

/// Sign-up response.
///
/// With confirmations disabled the service returns a token envelope with a
/// nested user; with confirmations enabled it returns the bare user object
/// and establishes no session.
#[derive(Debug, Deserialize)]
pub(super) struct SignUpResponseDto {
    pub(super) access_token: Option<String>,
    pub(super) user: Option<UserDto>,
    pub(super) id: Option<String>,
}

/// Outcome of a sign-up request after shape discrimination.
#[derive(Debug)]
pub(super) enum SignUpOutcome {
    /// A session was established for the new account.
    Session {
        access_token: String,
        identity: Identity,
    },
    /// The account awaits confirmation; no session exists yet.
    Pending,
}

impl SignUpResponseDto {
    pub(super) fn into_outcome(self) -> Result<SignUpOutcome, String> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) => Ok(SignUpOutcome::Session {
                access_token,
                identity: user.into_identity()?,
            }),
            (None, _) if self.id.is_some() => Ok(SignUpOutcome::Pending),
            (None, Some(_)) => Ok(SignUpOutcome::Pending),
            _ => Err("unrecognised sign-up response shape".to_owned()),
        }
    }
}

/// Error body shapes used across the auth and table endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBodyDto {
    /// Best human-readable message from whichever field the endpoint used.
    pub(super) fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Binding between a record shape and its Supabase table.
pub(super) trait SupabaseRecord: CostRecord + Sized {
    /// Table name under `/rest/v1/`.
    const TABLE: &'static str;
    /// Row DTO the table responds with.
    type Row: DeserializeOwned + Send;

    /// Map a decoded row into the domain record.
    fn from_row(row: Self::Row) -> Result<Self, String>;

    /// JSON object holding the draft's writable columns.
    fn draft_payload(draft: &Self::Draft) -> Value;
}

#[derive(Debug, Deserialize)]
pub(super) struct ItemRowDto {
    id: String,
    name: String,
    cost: f64,
    owner_id: String,
    created_at: DateTime<Utc>,
}

impl SupabaseRecord for Item {
    const TABLE: &'static str = "items";
    type Row = ItemRowDto;

    fn from_row(row: Self::Row) -> Result<Self, String> {
        let id = RecordId::new(&row.id).map_err(|error| format!("item {}: {error}", row.id))?;
        let owner_id = UserId::new(&row.owner_id)
            .map_err(|error| format!("item {}: {error}", row.id))?;
        Ok(Self::new(id, row.name, row.cost, owner_id, row.created_at))
    }

    fn draft_payload(draft: &Self::Draft) -> Value {
        json!({ "name": draft.name(), "cost": draft.cost() })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OtherCostRowDto {
    id: String,
    description: String,
    amount: f64,
    owner_id: String,
    created_at: DateTime<Utc>,
}

impl SupabaseRecord for OtherCost {
    const TABLE: &'static str = "other_costs";
    type Row = OtherCostRowDto;

    fn from_row(row: Self::Row) -> Result<Self, String> {
        let id = RecordId::new(&row.id)
            .map_err(|error| format!("other cost {}: {error}", row.id))?;
        let owner_id = UserId::new(&row.owner_id)
            .map_err(|error| format!("other cost {}: {error}", row.id))?;
        Ok(Self::new(id, row.description, row.amount, owner_id, row.created_at))
    }

    fn draft_payload(draft: &Self::Draft) -> Value {
        json!({ "description": draft.description(), "amount": draft.amount() })
    }
}
