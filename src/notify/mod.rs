//! Short-lived user-facing notifications emitted by ledger operations.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds a notification stays active before it expires on its own.
const AUTO_DISMISS_SECS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// What happened, with enough payload for a caller to render its own text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ExpenseRecorded { category: String, amount: f64 },
    InvalidExpense { raw: String },
    CategoryDeleted { category: String },
    MonthClosed { month: String },
    MonthAlreadyClosed { month: String },
    HistoryEntryDeleted { month: String },
    ConfigurationSaved,
}

impl LedgerEvent {
    pub fn severity(&self) -> Severity {
        match self {
            LedgerEvent::InvalidExpense { .. } => Severity::Error,
            LedgerEvent::MonthAlreadyClosed { .. } => Severity::Warning,
            _ => Severity::Success,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::ExpenseRecorded { category, amount } => {
                write!(f, "recorded {:.2} against {}", amount, category)
            }
            LedgerEvent::InvalidExpense { raw } => {
                write!(f, "`{}` is not a valid amount", raw)
            }
            LedgerEvent::CategoryDeleted { category } => {
                write!(f, "deleted category {}", category)
            }
            LedgerEvent::MonthClosed { month } => write!(f, "closed {}", month),
            LedgerEvent::MonthAlreadyClosed { month } => {
                write!(f, "{} is already archived", month)
            }
            LedgerEvent::HistoryEntryDeleted { month } => {
                write!(f, "removed archived {}", month)
            }
            LedgerEvent::ConfigurationSaved => write!(f, "configuration saved"),
        }
    }
}

/// A queued event with identity and expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub event: LedgerEvent,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at < Duration::seconds(AUTO_DISMISS_SECS)
    }
}

/// In-memory notification queue, pruned lazily on read.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LedgerEvent, now: DateTime<Utc>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            severity: event.severity(),
            event,
            issued_at: now,
        };
        let id = notification.id;
        self.entries.push(notification);
        id
    }

    /// Notifications that have neither expired nor been dismissed.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.entries
            .iter()
            .filter(|notification| notification.is_active(now))
            .collect()
    }

    /// Dismisses by id, returning whether anything was removed.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|notification| notification.id != id);
        self.entries.len() != before
    }

    /// Drops everything past its expiry.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.entries
            .retain(|notification| notification.is_active(now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }
}
