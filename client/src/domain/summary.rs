//! Aggregate spend totals across both record collections.

use serde::Serialize;

use super::record::{CostRecord, Item, OtherCost};

fn sum_charges<R: CostRecord>(records: &[R]) -> f64 {
    records.iter().map(CostRecord::charge).sum()
}

/// Totals the dashboard renders: per-collection sums plus the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendSummary {
    items_total: f64,
    other_costs_total: f64,
}

impl SpendSummary {
    /// Compute totals over the two collections.
    ///
    /// # Examples
    /// ```
    /// use client::domain::SpendSummary;
    ///
    /// let summary = SpendSummary::new(&[], &[]);
    /// assert_eq!(summary.grand_total(), 0.0);
    /// ```
    pub fn new(items: &[Item], other_costs: &[OtherCost]) -> Self {
        Self {
            items_total: sum_charges(items),
            other_costs_total: sum_charges(other_costs),
        }
    }

    /// Sum of all item costs.
    pub fn items_total(self) -> f64 {
        self.items_total
    }

    /// Sum of all other-cost amounts.
    pub fn other_costs_total(self) -> f64 {
        self.other_costs_total
    }

    /// Combined project spend.
    pub fn grand_total(self) -> f64 {
        self.items_total + self.other_costs_total
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{RecordId, UserId};

    fn item(cost: f64, owner: &UserId) -> Item {
        Item::new(RecordId::random(), "item", cost, owner.clone(), Utc::now())
    }

    fn other_cost(amount: f64, owner: &UserId) -> OtherCost {
        OtherCost::new(
            RecordId::random(),
            "expense",
            amount,
            owner.clone(),
            Utc::now(),
        )
    }

    #[rstest]
    fn totals_sum_each_collection_independently() {
        let owner = UserId::random();
        let items = vec![item(10.0, &owner), item(2.5, &owner)];
        let other_costs = vec![other_cost(5.0, &owner)];

        let summary = SpendSummary::new(&items, &other_costs);
        assert_eq!(summary.items_total(), 12.5);
        assert_eq!(summary.other_costs_total(), 5.0);
        assert_eq!(summary.grand_total(), 17.5);
    }

    #[rstest]
    fn empty_collections_total_zero() {
        let summary = SpendSummary::new(&[], &[]);
        assert_eq!(summary.items_total(), 0.0);
        assert_eq!(summary.grand_total(), 0.0);
    }
}
