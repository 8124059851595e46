use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::Totals;

/// Immutable record of a month at the moment it was closed.
///
/// The per-category maps are frozen copies; later edits to the live budget
/// never touch an archived snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub closed_at: DateTime<Utc>,
    pub month: String,
    pub budget: BTreeMap<String, f64>,
    pub spent: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub totals: Totals,
}

impl MonthSnapshot {
    pub fn new(
        closed_at: DateTime<Utc>,
        month: impl Into<String>,
        budget: BTreeMap<String, f64>,
        spent: BTreeMap<String, f64>,
        totals: Totals,
    ) -> Self {
        Self {
            closed_at,
            month: month.into(),
            budget,
            spent,
            totals,
        }
    }
}
