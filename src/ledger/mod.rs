//! The ledger state manager: current-period state, the operations that
//! mutate it, and the closed-month history.
//!
//! Every mutating operation persists through the backing store first and
//! applies the in-memory change only once the write succeeded, so memory
//! never runs ahead of the durable record. Operations take `&mut self`,
//! which keeps writes for one ledger strictly sequential.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{spent_per_category, ConfigUpdate, MonthSnapshot, Transaction};
use crate::errors::{BudgetError, Result};
use crate::locale::Locale;
use crate::notify::{LedgerEvent, Notification, NotificationQueue};
use crate::session::{AuthState, Session};
use crate::store::{DocumentStore, DocumentUpdate, LocalState, LocalStore, UserDocument};
use crate::summary::{self, BudgetSummary, CategoryComparison, Totals};
use crate::time::{Clock, SystemClock};

#[derive(Clone)]
enum Backend {
    Remote(Arc<dyn DocumentStore>),
    Local(LocalStore),
}

/// In-memory state for the current budgeting period of one user.
pub struct Ledger {
    salary: f64,
    monthly_budget: f64,
    categories: Vec<String>,
    budgets: BTreeMap<String, f64>,
    spent: BTreeMap<String, f64>,
    inputs: BTreeMap<String, String>,
    transactions: Vec<Transaction>,
    history: Vec<MonthSnapshot>,
    onboarding_complete: bool,
    backend: Backend,
    notifications: NotificationQueue,
    clock: Arc<dyn Clock>,
    locale: Locale,
}

impl Ledger {
    /// An empty ledger bound to a document store; no user loaded yet.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            salary: 0.0,
            monthly_budget: 0.0,
            categories: Vec::new(),
            budgets: BTreeMap::new(),
            spent: BTreeMap::new(),
            inputs: BTreeMap::new(),
            transactions: Vec::new(),
            history: Vec::new(),
            onboarding_complete: false,
            backend: Backend::Remote(store),
            notifications: NotificationQueue::new(),
            clock: Arc::new(SystemClock),
            locale: Locale::default(),
        }
    }

    /// Opens the ledger for a signed-in user, seeding a starter document
    /// when none exists yet.
    pub fn open(store: Arc<dyn DocumentStore>, session: &Session) -> Result<Self> {
        let mut ledger = Self::new(store);
        ledger.sign_in(session)?;
        Ok(ledger)
    }

    /// Opens the legacy local-machine path.
    ///
    /// Configuration (salary, cap, categories and budgets) comes from `seed`
    /// and lives in memory only; history, spent, and pending inputs come from
    /// the state file and are written back on every mutation.
    pub fn open_local(store: LocalStore, seed: ConfigUpdate) -> Result<Self> {
        let state = store.load()?;
        let mut ledger = Self {
            salary: seed.salary.unwrap_or(0.0),
            monthly_budget: seed.monthly_budget.unwrap_or(0.0),
            categories: Vec::new(),
            budgets: BTreeMap::new(),
            spent: state.current_spent,
            inputs: state.current_inputs,
            transactions: Vec::new(),
            history: state.budget_history,
            onboarding_complete: false,
            backend: Backend::Local(store),
            notifications: NotificationQueue::new(),
            clock: Arc::new(SystemClock),
            locale: Locale::default(),
        };
        for entry in seed.categories {
            if !ledger.categories.contains(&entry.name) {
                ledger.categories.push(entry.name.clone());
            }
            ledger.budgets.insert(entry.name, entry.budget);
        }
        ledger.seed_category_keys();
        Ok(ledger)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Writes a starter document for a user who has none, mirroring what a
    /// first sign-in does. Returns whether seeding happened.
    pub fn seed_if_needed(store: &dyn DocumentStore, session: &Session) -> Result<bool> {
        if store.fetch(session.user())?.is_some() {
            return Ok(false);
        }
        let starter = UserDocument::seeded();
        store.apply(
            session.user(),
            DocumentUpdate::new()
                .with_categories(starter.categories)
                .with_budgets(starter.budgets)
                .with_transactions(starter.transactions),
        )?;
        info!("seeded starter document for `{}`", session.user());
        Ok(true)
    }

    /// Re-fetches persisted state and rebuilds everything derived from it.
    pub fn reload(&mut self, session: &Session) -> Result<()> {
        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                let document = store.fetch(session.user())?.unwrap_or_default();
                self.apply_document(document);
            }
            Backend::Local(store) => {
                let state = store.load()?;
                self.history = state.budget_history;
                self.spent = state.current_spent;
                self.inputs = state.current_inputs;
                self.seed_category_keys();
            }
        }
        Ok(())
    }

    /// Reacts to an authentication transition: sign-in loads (and seeds if
    /// needed), sign-out drops all user state.
    pub fn handle_auth(&mut self, auth: &AuthState) -> Result<()> {
        match auth {
            AuthState::SignedIn(session) => self.sign_in(session),
            AuthState::SignedOut => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Parses and records an expense against a category.
    ///
    /// The transaction is appended to the durable store first; only a
    /// successful write updates the spent map and clears the pending input.
    /// Returns the parsed amount.
    pub fn record_expense(
        &mut self,
        session: &Session,
        category: &str,
        raw_amount: &str,
    ) -> Result<f64> {
        let amount = match parse_amount(raw_amount) {
            Ok(value) => value,
            Err(err) => {
                self.notify(LedgerEvent::InvalidExpense {
                    raw: raw_amount.to_string(),
                });
                return Err(err);
            }
        };
        if !self.categories.iter().any(|name| name == category) {
            return Err(BudgetError::CategoryNotFound(category.to_string()));
        }

        let transaction = Transaction::new(category, amount, self.clock.now());
        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                // Read-modify-write against the stored list, so a transaction
                // added from another device since the last load is not lost.
                let mut transactions = store
                    .fetch(session.user())?
                    .map(|document| document.transactions)
                    .unwrap_or_default();
                transactions.push(transaction);
                persist_remote(
                    store.as_ref(),
                    session,
                    DocumentUpdate::new().with_transactions(transactions.clone()),
                    "expense",
                )?;
                self.transactions = transactions;
                self.rederive_spent();
                self.inputs.insert(category.to_string(), String::new());
            }
            Backend::Local(store) => {
                let mut next_spent = self.spent.clone();
                *next_spent.entry(category.to_string()).or_insert(0.0) += amount;
                let mut next_inputs = self.inputs.clone();
                next_inputs.insert(category.to_string(), String::new());
                persist_local(&store, &self.history, &next_spent, &next_inputs, "expense")?;
                self.spent = next_spent;
                self.inputs = next_inputs;
                self.transactions.push(transaction);
            }
        }
        self.notify(LedgerEvent::ExpenseRecorded {
            category: category.to_string(),
            amount,
        });
        Ok(amount)
    }

    /// Stores the pending input text for a category.
    ///
    /// On the local path inputs are part of the persisted state; on the
    /// remote path they stay in memory.
    pub fn set_input(&mut self, category: &str, raw: impl Into<String>) -> Result<()> {
        let raw = raw.into();
        if let Backend::Local(store) = &self.backend {
            let mut next_inputs = self.inputs.clone();
            next_inputs.insert(category.to_string(), raw);
            persist_local(store, &self.history, &self.spent, &next_inputs, "input")?;
            self.inputs = next_inputs;
            return Ok(());
        }
        self.inputs.insert(category.to_string(), raw);
        Ok(())
    }

    pub fn input(&self, category: &str) -> &str {
        self.inputs
            .get(category)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Merges an onboarding-style configuration change and marks onboarding
    /// complete. New categories are appended in entry order; existing ones
    /// get their budget replaced.
    pub fn update_configuration(&mut self, session: &Session, update: ConfigUpdate) -> Result<()> {
        let next_salary = update.salary.unwrap_or(self.salary);
        let next_monthly = update.monthly_budget.unwrap_or(self.monthly_budget);
        let mut next_categories = self.categories.clone();
        let mut next_budgets = self.budgets.clone();
        for entry in &update.categories {
            if !next_categories.contains(&entry.name) {
                next_categories.push(entry.name.clone());
            }
            next_budgets.insert(entry.name.clone(), entry.budget);
        }

        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                persist_remote(
                    store.as_ref(),
                    session,
                    DocumentUpdate::new()
                        .with_salary(next_salary)
                        .with_monthly_budget(next_monthly)
                        .with_categories(next_categories.clone())
                        .with_budgets(next_budgets.clone())
                        .with_onboarding_complete(true),
                    "configuration",
                )?;
                self.salary = next_salary;
                self.monthly_budget = next_monthly;
                self.categories = next_categories;
                self.budgets = next_budgets;
                self.onboarding_complete = true;
                self.rederive_spent();
                self.seed_category_keys();
            }
            Backend::Local(store) => {
                let mut next_spent = self.spent.clone();
                let mut next_inputs = self.inputs.clone();
                for name in &next_categories {
                    next_spent.entry(name.clone()).or_insert(0.0);
                    next_inputs.entry(name.clone()).or_default();
                }
                persist_local(
                    &store,
                    &self.history,
                    &next_spent,
                    &next_inputs,
                    "configuration",
                )?;
                self.salary = next_salary;
                self.monthly_budget = next_monthly;
                self.categories = next_categories;
                self.budgets = next_budgets;
                self.spent = next_spent;
                self.inputs = next_inputs;
                self.onboarding_complete = true;
            }
        }
        self.notify(LedgerEvent::ConfigurationSaved);
        Ok(())
    }

    /// Changes a single category's planned budget.
    pub fn set_category_budget(&mut self, session: &Session, name: &str, amount: f64) -> Result<()> {
        if !self.categories.iter().any(|category| category == name) {
            return Err(BudgetError::CategoryNotFound(name.to_string()));
        }
        let mut next_budgets = self.budgets.clone();
        next_budgets.insert(name.to_string(), amount);
        if let Backend::Remote(store) = &self.backend {
            let store = Arc::clone(store);
            persist_remote(
                store.as_ref(),
                session,
                DocumentUpdate::new().with_budgets(next_budgets.clone()),
                "budget change",
            )?;
        }
        self.budgets = next_budgets;
        Ok(())
    }

    /// Deletes a category together with its budget entry and every
    /// transaction referencing it, as one consistent write.
    pub fn delete_category(&mut self, session: &Session, name: &str) -> Result<()> {
        if !self.categories.iter().any(|category| category == name) {
            return Err(BudgetError::CategoryNotFound(name.to_string()));
        }
        let next_categories: Vec<String> = self
            .categories
            .iter()
            .filter(|category| category.as_str() != name)
            .cloned()
            .collect();
        let mut next_budgets = self.budgets.clone();
        next_budgets.remove(name);
        let next_transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|transaction| transaction.category != name)
            .cloned()
            .collect();

        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                persist_remote(
                    store.as_ref(),
                    session,
                    DocumentUpdate::new()
                        .with_categories(next_categories.clone())
                        .with_budgets(next_budgets.clone())
                        .with_transactions(next_transactions.clone()),
                    "category deletion",
                )?;
                self.categories = next_categories;
                self.budgets = next_budgets;
                self.transactions = next_transactions;
                self.rederive_spent();
                self.inputs.remove(name);
            }
            Backend::Local(store) => {
                let mut next_spent = self.spent.clone();
                next_spent.remove(name);
                let mut next_inputs = self.inputs.clone();
                next_inputs.remove(name);
                persist_local(
                    &store,
                    &self.history,
                    &next_spent,
                    &next_inputs,
                    "category deletion",
                )?;
                self.categories = next_categories;
                self.budgets = next_budgets;
                self.transactions = next_transactions;
                self.spent = next_spent;
                self.inputs = next_inputs;
            }
        }
        self.notify(LedgerEvent::CategoryDeleted {
            category: name.to_string(),
        });
        Ok(())
    }

    /// Freezes the current period into a snapshot and starts a fresh one.
    ///
    /// The month label is derived from the clock and locale; a second close
    /// under the same label is rejected with a warning notification and
    /// leaves everything untouched.
    pub fn close_month(&mut self, session: &Session) -> Result<MonthSnapshot> {
        let label = self.locale.month_label(self.clock.today());
        if self.history.iter().any(|snapshot| snapshot.month == label) {
            warn!("`{}` is already archived, refusing to close again", label);
            self.notify(LedgerEvent::MonthAlreadyClosed {
                month: label.clone(),
            });
            return Err(BudgetError::MonthAlreadyClosed(label));
        }

        let totals = Totals::from_maps(&self.budgets, &self.spent, self.salary);
        let snapshot = MonthSnapshot::new(
            self.clock.now(),
            label.clone(),
            self.budgets.clone(),
            self.spent.clone(),
            totals,
        );
        let mut next_history = self.history.clone();
        next_history.push(snapshot.clone());
        let zeroed_spent: BTreeMap<String, f64> =
            self.spent.keys().map(|name| (name.clone(), 0.0)).collect();

        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                persist_remote(
                    store.as_ref(),
                    session,
                    DocumentUpdate::new()
                        .with_transactions(Vec::new())
                        .with_history(next_history.clone()),
                    "month close",
                )?;
            }
            Backend::Local(store) => {
                persist_local(
                    &store,
                    &next_history,
                    &zeroed_spent,
                    &self.inputs,
                    "month close",
                )?;
            }
        }
        self.history = next_history;
        self.transactions.clear();
        self.spent = zeroed_spent;
        info!("closed `{}`", snapshot.month);
        self.notify(LedgerEvent::MonthClosed {
            month: snapshot.month.clone(),
        });
        Ok(snapshot)
    }

    /// Removes an archived month by position, returning it.
    pub fn delete_history_entry(
        &mut self,
        session: &Session,
        index: usize,
    ) -> Result<MonthSnapshot> {
        let len = self.history.len();
        if index >= len {
            return Err(BudgetError::HistoryIndexOutOfRange { index, len });
        }
        let mut next_history = self.history.clone();
        let removed = next_history.remove(index);

        let backend = self.backend.clone();
        match backend {
            Backend::Remote(store) => {
                persist_remote(
                    store.as_ref(),
                    session,
                    DocumentUpdate::new().with_history(next_history.clone()),
                    "history deletion",
                )?;
            }
            Backend::Local(store) => {
                persist_local(
                    &store,
                    &next_history,
                    &self.spent,
                    &self.inputs,
                    "history deletion",
                )?;
            }
        }
        self.history = next_history;
        self.notify(LedgerEvent::HistoryEntryDeleted {
            month: removed.month.clone(),
        });
        Ok(removed)
    }

    /// Current-period totals, always recomputed from live state.
    pub fn totals(&self) -> Totals {
        Totals::from_maps(&self.budgets, &self.spent, self.salary)
    }

    /// Full derived view of the current month for display.
    pub fn summary(&self) -> BudgetSummary {
        summary::summarize(
            self.month_label(),
            &self.categories,
            &self.budgets,
            &self.spent,
            self.salary,
        )
    }

    /// Category-by-category comparison between two archived months.
    pub fn compare(&self, first_month: &str, second_month: &str) -> Result<Vec<CategoryComparison>> {
        let first = self.archived(first_month)?;
        let second = self.archived(second_month)?;
        Ok(summary::compare_months(&self.categories, first, second))
    }

    /// Label for the current period, e.g. `август 2025 г.`.
    pub fn month_label(&self) -> String {
        self.locale.month_label(self.clock.today())
    }

    /// Labels of the archived months, oldest first.
    pub fn archived_months(&self) -> Vec<&str> {
        self.history
            .iter()
            .map(|snapshot| snapshot.month.as_str())
            .collect()
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn budgets(&self) -> &BTreeMap<String, f64> {
        &self.budgets
    }

    pub fn spent(&self) -> &BTreeMap<String, f64> {
        &self.spent
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn history(&self) -> &[MonthSnapshot] {
        &self.history
    }

    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Notifications that are still within their display window.
    pub fn active_notifications(&self) -> Vec<&Notification> {
        self.notifications.active(self.clock.now())
    }

    pub fn dismiss_notification(&mut self, id: Uuid) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn prune_notifications(&mut self) {
        let now = self.clock.now();
        self.notifications.prune(now);
    }

    fn sign_in(&mut self, session: &Session) -> Result<()> {
        if let Backend::Remote(store) = &self.backend {
            let store = Arc::clone(store);
            Self::seed_if_needed(store.as_ref(), session)?;
        }
        self.reload(session)
    }

    fn apply_document(&mut self, document: UserDocument) {
        self.salary = document.salary;
        self.monthly_budget = document.monthly_budget;
        self.categories = document.categories;
        self.budgets = document.budgets;
        self.transactions = document.transactions;
        self.onboarding_complete = document.onboarding_complete;
        self.history = document.history;
        self.inputs.clear();
        self.rederive_spent();
        self.seed_category_keys();
    }

    fn clear(&mut self) {
        self.salary = 0.0;
        self.monthly_budget = 0.0;
        self.categories.clear();
        self.budgets.clear();
        self.spent.clear();
        self.inputs.clear();
        self.transactions.clear();
        self.history.clear();
        self.onboarding_complete = false;
        self.notifications = NotificationQueue::new();
    }

    fn rederive_spent(&mut self) {
        self.spent = spent_per_category(&self.categories, &self.transactions);
    }

    /// Guarantees every configured category has a budget, spent, and input
    /// entry, so lookups never miss.
    fn seed_category_keys(&mut self) {
        for name in &self.categories {
            self.budgets.entry(name.clone()).or_insert(0.0);
            self.spent.entry(name.clone()).or_insert(0.0);
            self.inputs.entry(name.clone()).or_default();
        }
    }

    fn archived(&self, month: &str) -> Result<&MonthSnapshot> {
        self.history
            .iter()
            .find(|snapshot| snapshot.month == month)
            .ok_or_else(|| BudgetError::MonthNotArchived(month.to_string()))
    }

    fn notify(&mut self, event: LedgerEvent) {
        let now = self.clock.now();
        self.notifications.push(event, now);
    }
}

fn parse_amount(raw: &str) -> Result<f64> {
    let invalid = || BudgetError::InvalidAmount {
        raw: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

fn persist_remote(
    store: &dyn DocumentStore,
    session: &Session,
    update: DocumentUpdate,
    action: &str,
) -> Result<()> {
    store.apply(session.user(), update).map_err(|err| {
        error!("failed to persist {} for `{}`: {}", action, session.user(), err);
        err
    })
}

fn persist_local(
    store: &LocalStore,
    history: &[MonthSnapshot],
    spent: &BTreeMap<String, f64>,
    inputs: &BTreeMap<String, String>,
    action: &str,
) -> Result<()> {
    let state = LocalState {
        budget_history: history.to_vec(),
        current_spent: spent.clone(),
        current_inputs: inputs.clone(),
    };
    store.save(&state).map_err(|err| {
        error!("failed to persist {} to the local state file: {}", action, err);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::notify::Severity;
    use crate::session::UserId;
    use crate::store::MemoryStore;
    use crate::summary::CategoryStatus;
    use crate::time::FixedClock;

    fn session() -> Session {
        Session::new(UserId::new("user-1"))
    }

    fn august_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 8, 14, 10, 0, 0).unwrap(),
        ))
    }

    fn september_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 9, 5, 10, 0, 0).unwrap(),
        ))
    }

    fn configured_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut document = UserDocument {
            salary: 2000.0,
            monthly_budget: 1500.0,
            categories: vec!["Food".to_string(), "Rent".to_string()],
            onboarding_complete: true,
            ..UserDocument::default()
        };
        document.budgets.insert("Food".to_string(), 200.0);
        document.budgets.insert("Rent".to_string(), 500.0);
        store.insert(&UserId::new("user-1"), document);
        store
    }

    fn open_configured(store: &Arc<MemoryStore>) -> Ledger {
        let handle: Arc<dyn DocumentStore> = Arc::clone(store) as Arc<dyn DocumentStore>;
        Ledger::open(handle, &session())
            .expect("open ledger")
            .with_clock(august_clock())
    }

    #[test]
    fn open_seeds_a_fresh_user() {
        let store = Arc::new(MemoryStore::new());
        let handle: Arc<dyn DocumentStore> = Arc::clone(&store) as Arc<dyn DocumentStore>;

        let ledger = Ledger::open(handle, &session()).expect("open ledger");

        let document = store
            .document(&UserId::new("user-1"))
            .expect("seeded document");
        assert_eq!(document.categories, crate::domain::DEFAULT_CATEGORIES);
        assert_eq!(ledger.categories(), document.categories.as_slice());
        assert!(!ledger.onboarding_complete());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn open_derives_spent_and_seeds_inputs() {
        let store = configured_store();
        let mut document = store.document(&UserId::new("user-1")).expect("document");
        document.transactions.push(Transaction::new(
            "Food",
            50.0,
            Utc.with_ymd_and_hms(2025, 8, 2, 9, 0, 0).unwrap(),
        ));
        store.insert(&UserId::new("user-1"), document);

        let ledger = open_configured(&store);

        assert_eq!(ledger.spent().get("Food"), Some(&50.0));
        assert_eq!(ledger.spent().get("Rent"), Some(&0.0));
        assert_eq!(ledger.input("Food"), "");
        assert_eq!(ledger.budgets().get("Food"), Some(&200.0));
    }

    #[test]
    fn record_expense_persists_then_applies() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "100")
            .expect("first expense");

        let amount = ledger
            .record_expense(&session(), "Food", "50")
            .expect("second expense");

        assert_eq!(amount, 50.0);
        assert_eq!(ledger.spent().get("Food"), Some(&150.0));
        assert_eq!(ledger.input("Food"), "");
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert_eq!(document.transactions.len(), 2);
        assert_eq!(document.transactions[1].amount, 50.0);
        let last = ledger.notifications().iter().last().expect("notification");
        assert!(matches!(
            &last.event,
            LedgerEvent::ExpenseRecorded { category, amount }
                if category == "Food" && *amount == 50.0
        ));
    }

    #[test]
    fn record_expense_rejects_invalid_input() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        let writes_before = store.write_count();

        for raw in ["abc", "", "0", "-5", "inf"] {
            let err = ledger
                .record_expense(&session(), "Food", raw)
                .expect_err("invalid amount");
            assert!(matches!(err, BudgetError::InvalidAmount { .. }), "{raw}");
        }

        assert_eq!(ledger.spent().get("Food"), Some(&0.0));
        assert_eq!(store.write_count(), writes_before);
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert!(document.transactions.is_empty());
        let last = ledger.notifications().iter().last().expect("notification");
        assert_eq!(last.severity, Severity::Error);
    }

    #[test]
    fn record_expense_requires_a_known_category() {
        let store = configured_store();
        let mut ledger = open_configured(&store);

        let err = ledger
            .record_expense(&session(), "Travel", "25")
            .expect_err("unknown category");

        assert!(matches!(err, BudgetError::CategoryNotFound(name) if name == "Travel"));
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert!(document.transactions.is_empty());
    }

    #[test]
    fn record_expense_picks_up_external_transactions() {
        let store = configured_store();
        let mut ledger = open_configured(&store);

        // Another device appends a transaction after our load.
        let mut document = store.document(&UserId::new("user-1")).expect("document");
        document.transactions.push(Transaction::new(
            "Rent",
            500.0,
            Utc.with_ymd_and_hms(2025, 8, 3, 8, 0, 0).unwrap(),
        ));
        store.insert(&UserId::new("user-1"), document);

        ledger
            .record_expense(&session(), "Food", "40")
            .expect("expense");

        let document = store.document(&UserId::new("user-1")).expect("document");
        assert_eq!(document.transactions.len(), 2);
        assert_eq!(ledger.spent().get("Rent"), Some(&500.0));
        assert_eq!(ledger.spent().get("Food"), Some(&40.0));
    }

    #[test]
    fn close_month_snapshots_and_resets() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "120")
            .expect("expense");

        let snapshot = ledger.close_month(&session()).expect("close");

        assert_eq!(snapshot.month, "август 2025 г.");
        assert_eq!(snapshot.spent.get("Food"), Some(&120.0));
        assert_eq!(snapshot.totals.total_spent, 120.0);
        assert_eq!(snapshot.totals.monthly_surplus, 1880.0);

        assert_eq!(ledger.history().len(), 1);
        assert!(ledger.spent().values().all(|value| *value == 0.0));
        assert!(ledger.transactions().is_empty());
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert!(document.transactions.is_empty());
        assert_eq!(document.history.len(), 1);
        assert_eq!(document.history[0].month, "август 2025 г.");
    }

    #[test]
    fn close_month_twice_is_rejected_with_a_warning() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger.close_month(&session()).expect("first close");

        let err = ledger
            .close_month(&session())
            .expect_err("second close in the same month");

        assert!(matches!(err, BudgetError::MonthAlreadyClosed(_)));
        assert_eq!(ledger.history().len(), 1);
        let last = ledger.notifications().iter().last().expect("notification");
        assert_eq!(last.severity, Severity::Warning);
        assert!(matches!(
            &last.event,
            LedgerEvent::MonthAlreadyClosed { month } if month == "август 2025 г."
        ));
    }

    #[test]
    fn delete_category_cascades_in_a_single_write() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "80")
            .expect("food expense");
        ledger
            .record_expense(&session(), "Rent", "500")
            .expect("rent expense");
        let writes_before = store.write_count();

        ledger
            .delete_category(&session(), "Food")
            .expect("delete category");

        assert_eq!(store.write_count(), writes_before + 1);
        assert_eq!(ledger.categories(), ["Rent".to_string()].as_slice());
        assert!(!ledger.budgets().contains_key("Food"));
        assert!(!ledger.spent().contains_key("Food"));
        assert_eq!(ledger.totals().total_spent, 500.0);
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert_eq!(document.transactions.len(), 1);
        assert_eq!(document.transactions[0].category, "Rent");
        assert!(!document.budgets.contains_key("Food"));
    }

    #[test]
    fn delete_category_requires_an_existing_name() {
        let store = configured_store();
        let mut ledger = open_configured(&store);

        let err = ledger
            .delete_category(&session(), "Travel")
            .expect_err("unknown category");

        assert!(matches!(err, BudgetError::CategoryNotFound(_)));
    }

    #[test]
    fn delete_history_entry_checks_bounds() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger.close_month(&session()).expect("close");

        let err = ledger
            .delete_history_entry(&session(), 3)
            .expect_err("out of range");
        assert!(matches!(
            err,
            BudgetError::HistoryIndexOutOfRange { index: 3, len: 1 }
        ));

        let removed = ledger
            .delete_history_entry(&session(), 0)
            .expect("delete entry");
        assert_eq!(removed.month, "август 2025 г.");
        assert!(ledger.history().is_empty());
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert!(document.history.is_empty());
    }

    #[test]
    fn update_configuration_merges_and_marks_onboarded() {
        let store = Arc::new(MemoryStore::new());
        let handle: Arc<dyn DocumentStore> = Arc::clone(&store) as Arc<dyn DocumentStore>;
        let mut ledger = Ledger::open(handle, &session())
            .expect("open ledger")
            .with_clock(august_clock());
        let writes_before = store.write_count();

        ledger
            .update_configuration(
                &session(),
                ConfigUpdate::new()
                    .with_salary(2500.0)
                    .with_category("Храна", 250.0)
                    .with_category("Пътуване", 100.0),
            )
            .expect("configuration");

        assert_eq!(store.write_count(), writes_before + 1);
        assert_eq!(ledger.salary(), 2500.0);
        assert!(ledger.onboarding_complete());
        assert_eq!(ledger.budgets().get("Храна"), Some(&250.0));
        assert_eq!(ledger.budgets().get("Пътуване"), Some(&100.0));
        // default categories stay, the new one is appended at the end
        let last = ledger.categories().last().expect("categories");
        assert_eq!(last, "Пътуване");
        assert_eq!(ledger.spent().get("Пътуване"), Some(&0.0));

        ledger
            .update_configuration(&session(), ConfigUpdate::new().with_monthly_budget(1800.0))
            .expect("second configuration");
        assert_eq!(ledger.salary(), 2500.0);
        assert_eq!(ledger.monthly_budget(), 1800.0);
    }

    #[test]
    fn set_category_budget_replaces_one_entry() {
        let store = configured_store();
        let mut ledger = open_configured(&store);

        ledger
            .set_category_budget(&session(), "Food", 300.0)
            .expect("budget change");

        assert_eq!(ledger.budgets().get("Food"), Some(&300.0));
        assert_eq!(ledger.budgets().get("Rent"), Some(&500.0));
        let document = store.document(&UserId::new("user-1")).expect("document");
        assert_eq!(document.budgets.get("Food"), Some(&300.0));

        let err = ledger
            .set_category_budget(&session(), "Travel", 100.0)
            .expect_err("unknown category");
        assert!(matches!(err, BudgetError::CategoryNotFound(_)));
    }

    #[test]
    fn reload_resyncs_with_the_store() {
        let store = configured_store();
        let mut ledger = open_configured(&store);

        let mut document = store.document(&UserId::new("user-1")).expect("document");
        document.transactions.push(Transaction::new(
            "Rent",
            500.0,
            Utc.with_ymd_and_hms(2025, 8, 4, 12, 0, 0).unwrap(),
        ));
        store.insert(&UserId::new("user-1"), document);

        ledger.reload(&session()).expect("reload");

        assert_eq!(ledger.spent().get("Rent"), Some(&500.0));
    }

    #[test]
    fn sign_out_clears_all_state() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "30")
            .expect("expense");

        ledger.handle_auth(&AuthState::SignedOut).expect("sign out");

        assert!(ledger.categories().is_empty());
        assert!(ledger.spent().is_empty());
        assert!(ledger.history().is_empty());
        assert_eq!(ledger.salary(), 0.0);
        assert!(!ledger.onboarding_complete());
        assert!(ledger.notifications().is_empty());

        // signing back in restores the persisted document
        ledger
            .handle_auth(&AuthState::signed_in("user-1"))
            .expect("sign in");
        assert_eq!(ledger.spent().get("Food"), Some(&30.0));
    }

    #[test]
    fn compare_uses_archived_months() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "100")
            .expect("august food");
        ledger.close_month(&session()).expect("close august");

        let mut ledger = ledger.with_clock(september_clock());
        ledger
            .record_expense(&session(), "Food", "120")
            .expect("september food");
        ledger.close_month(&session()).expect("close september");

        assert_eq!(
            ledger.archived_months(),
            vec!["август 2025 г.", "септември 2025 г."]
        );
        let rows = ledger
            .compare("август 2025 г.", "септември 2025 г.")
            .expect("compare");
        let food = rows
            .iter()
            .find(|row| row.category == "Food")
            .expect("food row");
        assert_eq!(food.first, 100.0);
        assert_eq!(food.second, 120.0);
        assert_eq!(food.delta, Some(20));

        let err = ledger
            .compare("юни 2025 г.", "август 2025 г.")
            .expect_err("missing month");
        assert!(matches!(err, BudgetError::MonthNotArchived(_)));
    }

    #[test]
    fn summary_classifies_each_category() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "190")
            .expect("near-limit food");

        let summary = ledger.summary();

        assert_eq!(summary.month, "август 2025 г.");
        let food = summary
            .categories
            .iter()
            .find(|row| row.name == "Food")
            .expect("food row");
        assert_eq!(food.status, CategoryStatus::Near);
        assert_eq!(food.remaining, 10.0);
        let rent = summary
            .categories
            .iter()
            .find(|row| row.name == "Rent")
            .expect("rent row");
        assert_eq!(rent.status, CategoryStatus::Under);
        assert_eq!(summary.totals.monthly_surplus, 1810.0);
    }

    #[test]
    fn with_locale_switches_the_period_label() {
        let store = configured_store();
        let ledger = open_configured(&store).with_locale(Locale::english());

        assert_eq!(ledger.month_label(), "August 2025");
        assert_eq!(ledger.summary().month, "August 2025");
    }

    #[test]
    fn notifications_expire_against_the_clock() {
        let store = configured_store();
        let mut ledger = open_configured(&store);
        ledger
            .record_expense(&session(), "Food", "10")
            .expect("expense");
        assert_eq!(ledger.active_notifications().len(), 1);

        let mut ledger = ledger.with_clock(Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 8, 14, 10, 0, 30).unwrap(),
        )));
        assert!(ledger.active_notifications().is_empty());
        ledger.prune_notifications();
        assert!(ledger.notifications().is_empty());
    }
}
