use serde::{Deserialize, Serialize};

/// Categories seeded for a user whose document does not exist yet.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Храна", "Наем", "Забавление", "Спорт"];

/// One row of the configuration form: a category name and its planned budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub budget: f64,
}

impl CategoryEntry {
    pub fn new(name: impl Into<String>, budget: f64) -> Self {
        Self {
            name: name.into(),
            budget,
        }
    }
}

/// A merge-style configuration change.
///
/// `None` fields keep their current value; `categories` entries are merged
/// into the existing set, updating budgets for names that already exist and
/// appending new names at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryEntry>,
}

impl ConfigUpdate {
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

    pub fn with_category(mut self, name: impl Into<String>, budget: f64) -> Self {
        self.categories.push(CategoryEntry::new(name, budget));
        self
    }
}
