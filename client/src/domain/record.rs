//! Cost record data model.
//!
//! Two record shapes share one structure: an `Item` carries a name and a
//! cost, an `OtherCost` a description and an amount. Both are owned by the
//! identity that created them, and both are created server-side: the remote
//! service assigns `id`, `owner_id`, and `created_at`.
//!
//! Input travels through validated draft types ([`ItemDraft`],
//! [`OtherCostDraft`]); a draft is the only way to issue a create or update,
//! so malformed input can never reach the network.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::UserId;

/// Validation errors returned by the draft constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Record id was empty.
    EmptyId,
    /// Record id was not a valid UUID.
    InvalidId,
    /// Name/description was missing or blank once trimmed.
    EmptyLabel,
    /// Monetary value was negative.
    NegativeAmount,
    /// Monetary value was NaN or infinite.
    NonFiniteAmount,
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
            Self::InvalidId => write!(f, "record id must be a valid UUID"),
            Self::EmptyLabel => write!(f, "name must not be empty"),
            Self::NegativeAmount => write!(f, "amount must not be negative"),
            Self::NonFiniteAmount => write!(f, "amount must be a finite number"),
        }
    }
}

impl std::error::Error for RecordValidationError {}

/// Stable record identifier assigned by the remote data service on creation.
///
/// Never client-generated; [`RecordId::random`] exists for fixtures and the
/// in-memory fake standing in for the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(Uuid);

impl RecordId {
    /// Validate and construct a [`RecordId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RecordValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`RecordId`] (server-side assignment only).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, RecordValidationError> {
        if id.is_empty() {
            return Err(RecordValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| RecordValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

fn validate_amount(value: f64) -> Result<f64, RecordValidationError> {
    if !value.is_finite() {
        return Err(RecordValidationError::NonFiniteAmount);
    }
    if value < 0.0 {
        return Err(RecordValidationError::NegativeAmount);
    }
    Ok(value)
}

fn validate_label(value: String) -> Result<String, RecordValidationError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RecordValidationError::EmptyLabel);
    }
    Ok(normalized.to_owned())
}

/// Common surface shared by the two record shapes.
///
/// The collection store and the aggregate summary only need identity,
/// ownership, recency, and the monetary charge; everything shape-specific
/// stays on the concrete types.
pub trait CostRecord: Clone + Send + Sync + 'static {
    /// Validated input used to create or update a record of this shape.
    type Draft: Clone + Send + Sync + 'static;

    /// Label used in logs.
    fn kind() -> &'static str;

    /// Service-assigned record identifier.
    fn id(&self) -> &RecordId;

    /// Identity that owns this record.
    fn owner_id(&self) -> &UserId;

    /// Server-side creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// The monetary value this record contributes to totals.
    fn charge(&self) -> f64;
}

/// A named project expense.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: RecordId,
    name: String,
    cost: f64,
    owner_id: UserId,
    created_at: DateTime<Utc>,
}

impl Item {
    /// Build an [`Item`] from service-provided fields.
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        cost: f64,
        owner_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            owner_id,
            created_at,
        }
    }

    /// Item name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Item cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

impl CostRecord for Item {
    type Draft = ItemDraft;

    fn kind() -> &'static str {
        "item"
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn charge(&self) -> f64 {
        self.cost
    }
}

/// Validated input for creating or updating an [`Item`].
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `cost` is finite and non-negative.
///
/// # Examples
/// ```
/// use client::domain::ItemDraft;
///
/// let draft = ItemDraft::new("timber", 120.5).expect("valid draft");
/// assert_eq!(draft.name(), "timber");
///
/// assert!(ItemDraft::new("timber", -1.0).is_err());
/// assert!(ItemDraft::new("   ", 10.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    name: String,
    cost: f64,
}

impl ItemDraft {
    /// Validate and construct an [`ItemDraft`].
    pub fn new(name: impl Into<String>, cost: f64) -> Result<Self, RecordValidationError> {
        Ok(Self {
            name: validate_label(name.into())?,
            cost: validate_amount(cost)?,
        })
    }

    /// Proposed item name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Proposed item cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// A miscellaneous expense outside the item list.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherCost {
    id: RecordId,
    description: String,
    amount: f64,
    owner_id: UserId,
    created_at: DateTime<Utc>,
}

impl OtherCost {
    /// Build an [`OtherCost`] from service-provided fields.
    pub fn new(
        id: RecordId,
        description: impl Into<String>,
        amount: f64,
        owner_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            owner_id,
            created_at,
        }
    }

    /// Expense description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Expense amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl CostRecord for OtherCost {
    type Draft = OtherCostDraft;

    fn kind() -> &'static str {
        "other cost"
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn charge(&self) -> f64 {
        self.amount
    }
}

/// Validated input for creating or updating an [`OtherCost`].
#[derive(Debug, Clone, PartialEq)]
pub struct OtherCostDraft {
    description: String,
    amount: f64,
}

impl OtherCostDraft {
    /// Validate and construct an [`OtherCostDraft`].
    pub fn new(
        description: impl Into<String>,
        amount: f64,
    ) -> Result<Self, RecordValidationError> {
        Ok(Self {
            description: validate_label(description.into())?,
            amount: validate_amount(amount)?,
        })
    }

    /// Proposed expense description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Proposed expense amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 10.0, RecordValidationError::EmptyLabel)]
    #[case("   ", 10.0, RecordValidationError::EmptyLabel)]
    #[case("timber", -0.01, RecordValidationError::NegativeAmount)]
    #[case("timber", f64::NAN, RecordValidationError::NonFiniteAmount)]
    #[case("timber", f64::INFINITY, RecordValidationError::NonFiniteAmount)]
    fn item_draft_rejects_invalid_input(
        #[case] name: &str,
        #[case] cost: f64,
        #[case] expected: RecordValidationError,
    ) {
        let err = ItemDraft::new(name, cost).expect_err("invalid drafts must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("timber", 0.0)]
    #[case("  bricks  ", 249.99)]
    fn item_draft_accepts_and_trims_valid_input(#[case] name: &str, #[case] cost: f64) {
        let draft = ItemDraft::new(name, cost).expect("valid draft");
        assert_eq!(draft.name(), name.trim());
        assert_eq!(draft.cost(), cost);
    }

    #[rstest]
    #[case("", 5.0, RecordValidationError::EmptyLabel)]
    #[case("permit fee", -5.0, RecordValidationError::NegativeAmount)]
    fn other_cost_draft_rejects_invalid_input(
        #[case] description: &str,
        #[case] amount: f64,
        #[case] expected: RecordValidationError,
    ) {
        let err =
            OtherCostDraft::new(description, amount).expect_err("invalid drafts must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn record_id_rejects_non_uuid_input() {
        let err = RecordId::new("nope").expect_err("invalid id must fail");
        assert_eq!(err, RecordValidationError::InvalidId);
    }

    #[rstest]
    fn records_expose_common_surface() {
        let owner = UserId::random();
        let created_at = Utc::now();
        let item = Item::new(RecordId::random(), "timber", 12.0, owner.clone(), created_at);
        let other = OtherCost::new(
            RecordId::random(),
            "permit fee",
            30.0,
            owner.clone(),
            created_at,
        );

        assert_eq!(item.owner_id(), &owner);
        assert_eq!(item.charge(), 12.0);
        assert_eq!(item.created_at(), created_at);
        assert_eq!(other.charge(), 30.0);
        assert_eq!(Item::kind(), "item");
        assert_eq!(OtherCost::kind(), "other cost");
    }
}
