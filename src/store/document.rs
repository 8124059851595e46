use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MonthSnapshot, Transaction, DEFAULT_CATEGORIES};

/// The durable per-user record, as held by the backing document store.
///
/// Every field defaults, so a partially-written document read back from an
/// older version still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub monthly_budget: f64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub budgets: BTreeMap<String, f64>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub history: Vec<MonthSnapshot>,
}

impl UserDocument {
    /// Starter document for a user who has never signed in before.
    pub fn seeded() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

/// Merge-style partial update of a [`UserDocument`].
///
/// `None` fields are left untouched; present fields replace the stored value
/// wholesale. Operations that must change several fields consistently (such
/// as a category deletion) send them in one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<MonthSnapshot>>,
}

impl DocumentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_monthly_budget(mut self, monthly_budget: f64) -> Self {
        self.monthly_budget = Some(monthly_budget);
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_budgets(mut self, budgets: BTreeMap<String, f64>) -> Self {
        self.budgets = Some(budgets);
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    pub fn with_onboarding_complete(mut self, done: bool) -> Self {
        self.onboarding_complete = Some(done);
        self
    }

    pub fn with_history(mut self, history: Vec<MonthSnapshot>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges this update into a document, consuming the update.
    pub fn apply_to(self, document: &mut UserDocument) {
        if let Some(salary) = self.salary {
            document.salary = salary;
        }
        if let Some(monthly_budget) = self.monthly_budget {
            document.monthly_budget = monthly_budget;
        }
        if let Some(categories) = self.categories {
            document.categories = categories;
        }
        if let Some(budgets) = self.budgets {
            document.budgets = budgets;
        }
        if let Some(transactions) = self.transactions {
            document.transactions = transactions;
        }
        if let Some(done) = self.onboarding_complete {
            document.onboarding_complete = done;
        }
        if let Some(history) = self.history {
            document.history = history;
        }
    }
}
