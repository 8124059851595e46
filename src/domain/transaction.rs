use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded expense against a named category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub category: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(category: impl Into<String>, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            category: category.into(),
            amount,
            timestamp,
        }
    }
}

/// Sums transaction amounts per category.
///
/// Every category in `categories` appears in the result, zeroed when it has
/// no transactions. Transactions referencing a category that is not listed
/// are ignored rather than resurrecting a deleted key.
pub fn spent_per_category(
    categories: &[String],
    transactions: &[Transaction],
) -> BTreeMap<String, f64> {
    let mut spent: BTreeMap<String, f64> = categories
        .iter()
        .map(|name| (name.clone(), 0.0))
        .collect();
    for transaction in transactions {
        if let Some(total) = spent.get_mut(&transaction.category) {
            *total += transaction.amount;
        }
    }
    spent
}
