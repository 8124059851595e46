pub mod config;
pub mod snapshot;
pub mod transaction;

pub use config::{CategoryEntry, ConfigUpdate, DEFAULT_CATEGORIES};
pub use snapshot::MonthSnapshot;
pub use transaction::{spent_per_category, Transaction};
