#![doc(test(attr(deny(warnings))))]

//! Budgetory is the core of a personal monthly-budget tracker: category
//! budgets, expense recording, derived totals, and closed-month history,
//! persisted through a pluggable per-user document store.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod locale;
pub mod notify;
pub mod session;
pub mod store;
pub mod summary;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budgetory tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
