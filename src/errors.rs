use thiserror::Error;

/// Unified error type for ledger, aggregation, and storage failures.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("No signed-in user")]
    NotSignedIn,
    #[error("Invalid expense amount: `{raw}`")]
    InvalidAmount { raw: String },
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Month `{0}` is already closed")]
    MonthAlreadyClosed(String),
    #[error("No archived month labeled `{0}`")]
    MonthNotArchived(String),
    #[error("History index {index} out of range (len {len})")]
    HistoryIndexOutOfRange { index: usize, len: usize },
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
