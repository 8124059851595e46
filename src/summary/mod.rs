//! Pure aggregation over budget and spending maps.
//!
//! Everything here is derived data: totals, per-category status, and
//! month-over-month deltas. Nothing in this module touches storage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::MonthSnapshot;

/// Aggregate figures for one month of budgeting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub monthly_surplus: f64,
}

impl Totals {
    /// Derives totals from the per-category maps and the configured salary.
    ///
    /// `total_remaining` is always `total_budget - total_spent` and
    /// `monthly_surplus` is always `salary - total_spent`; both may go
    /// negative when the month overruns.
    pub fn from_maps(
        budget: &BTreeMap<String, f64>,
        spent: &BTreeMap<String, f64>,
        salary: f64,
    ) -> Self {
        let total_budget: f64 = budget.values().sum();
        let total_spent: f64 = spent.values().sum();
        Self {
            total_budget,
            total_spent,
            total_remaining: total_budget - total_spent,
            monthly_surplus: salary - total_spent,
        }
    }
}

/// How far along a category is against its planned budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryStatus {
    /// At or below 80% of the planned amount.
    Under,
    /// Above 80% but not past the planned amount.
    Near,
    /// Past the planned amount.
    Over,
}

impl CategoryStatus {
    /// Classifies spending against a planned budget.
    ///
    /// A zero budget means any spending at all is an overrun.
    pub fn classify(spent: f64, budget: f64) -> Self {
        if budget <= 0.0 {
            return if spent > 0.0 {
                CategoryStatus::Over
            } else {
                CategoryStatus::Under
            };
        }
        let ratio = spent / budget;
        if ratio > 1.0 {
            CategoryStatus::Over
        } else if ratio > 0.8 {
            CategoryStatus::Near
        } else {
            CategoryStatus::Under
        }
    }

    /// Colour marker shown next to a category line.
    pub fn marker(&self) -> &'static str {
        match self {
            CategoryStatus::Under => "\u{1F7E2}",
            CategoryStatus::Near => "\u{1F7E1}",
            CategoryStatus::Over => "\u{1F534}",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryStatus::Under => "under budget",
            CategoryStatus::Near => "near limit",
            CategoryStatus::Over => "over budget",
        };
        write!(f, "{label}")
    }
}

/// Month-over-month change in percent, rounded to the nearest whole number.
///
/// Returns `None` when there is no meaningful baseline (`previous == 0`),
/// leaving "new spending" presentation to the caller instead of inventing
/// a number.
pub fn percent_delta(current: f64, previous: f64) -> Option<i64> {
    if previous == 0.0 {
        return None;
    }
    Some(((current - previous) / previous * 100.0).round() as i64)
}

/// One category line of a [`BudgetSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub status: CategoryStatus,
}

/// Full derived view of the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub month: String,
    pub categories: Vec<CategorySummary>,
    pub totals: Totals,
}

/// Builds the month view in the caller's category order.
///
/// Categories live in `order`; a name missing from either map counts as
/// zero there.
pub fn summarize(
    month: impl Into<String>,
    order: &[String],
    budget: &BTreeMap<String, f64>,
    spent: &BTreeMap<String, f64>,
    salary: f64,
) -> BudgetSummary {
    let categories = order
        .iter()
        .map(|name| {
            let planned = budget.get(name).copied().unwrap_or(0.0);
            let used = spent.get(name).copied().unwrap_or(0.0);
            CategorySummary {
                name: name.clone(),
                budget: planned,
                spent: used,
                remaining: planned - used,
                status: CategoryStatus::classify(used, planned),
            }
        })
        .collect();
    BudgetSummary {
        month: month.into(),
        categories,
        totals: Totals::from_maps(budget, spent, salary),
    }
}

/// One category row of a month-to-month comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: String,
    pub first: f64,
    pub second: f64,
    pub delta: Option<i64>,
}

/// Compares spending between two closed months, category by category.
///
/// Rows follow `reference` order (typically the caller's current category
/// list); a category missing from a snapshot counts as zero there. `delta`
/// is the change from `first` to `second`, `None` when the first month has
/// no spending to compare against.
pub fn compare_months(
    reference: &[String],
    first: &MonthSnapshot,
    second: &MonthSnapshot,
) -> Vec<CategoryComparison> {
    reference
        .iter()
        .map(|name| {
            let a = first.spent.get(name).copied().unwrap_or(0.0);
            let b = second.spent.get(name).copied().unwrap_or(0.0);
            CategoryComparison {
                category: name.clone(),
                first: a,
                second: b,
                delta: percent_delta(b, a),
            }
        })
        .collect()
}
