use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::MonthSnapshot;
use crate::errors::Result;
use crate::utils::persistence::{data_dir, ensure_dir, write_atomic};

const STATE_FILE: &str = "state.json";

/// Locally cached ledger state for the path with no remote document store.
///
/// This is deliberately not a [`super::DocumentStore`]: the legacy path never
/// stored a full user document, only the closed-month history, the running
/// spent map, and the pending inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub budget_history: Vec<MonthSnapshot>,
    #[serde(default)]
    pub current_spent: BTreeMap<String, f64>,
    #[serde(default)]
    pub current_inputs: BTreeMap<String, String>,
}

/// Flat JSON file under the application data directory, written atomically on
/// every mutation.
#[derive(Debug, Clone)]
pub struct LocalStore {
    state_file: PathBuf,
}

impl LocalStore {
    /// Opens a store rooted at `base`, or at the resolved default directory.
    pub fn new(base: Option<PathBuf>) -> Result<Self> {
        let root = data_dir(base);
        ensure_dir(&root)?;
        Ok(Self {
            state_file: root.join(STATE_FILE),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Reads the cached state; a store that has never been written is empty.
    pub fn load(&self) -> Result<LocalState> {
        if !self.state_file.exists() {
            return Ok(LocalState::default());
        }
        let data = fs::read_to_string(&self.state_file)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, state: &LocalState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.state_file, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use crate::summary::Totals;

    fn store_with_temp_dir() -> (LocalStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = LocalStore::new(Some(temp.path().to_path_buf())).expect("local store");
        (store, temp)
    }

    fn sample_state() -> LocalState {
        let budget: BTreeMap<String, f64> = [("Храна".to_string(), 200.0)].into_iter().collect();
        let spent: BTreeMap<String, f64> = [("Храна".to_string(), 120.0)].into_iter().collect();
        let totals = Totals::from_maps(&budget, &spent, 2000.0);
        LocalState {
            budget_history: vec![MonthSnapshot::new(
                Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
                "юли 2025 г.",
                budget,
                spent.clone(),
                totals,
            )],
            current_spent: spent,
            current_inputs: [("Храна".to_string(), "15".to_string())]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn unwritten_store_loads_empty_state() {
        let (store, _guard) = store_with_temp_dir();
        let state = store.load().expect("load");
        assert_eq!(state, LocalState::default());
    }

    #[test]
    fn default_store_honors_the_environment_override() {
        let temp = TempDir::new().expect("temp dir");
        std::env::set_var("BUDGETORY_HOME", temp.path());
        let store = LocalStore::new_default().expect("default store");
        std::env::remove_var("BUDGETORY_HOME");

        assert!(store.state_file().starts_with(temp.path()));
        assert_eq!(
            store.state_file().file_name().and_then(|name| name.to_str()),
            Some(STATE_FILE)
        );
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        let state = sample_state();

        store.save(&state).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded, state);
        assert_eq!(loaded.budget_history[0].month, "юли 2025 г.");
    }

    #[test]
    fn save_replaces_the_previous_state() {
        let (store, _guard) = store_with_temp_dir();
        store.save(&sample_state()).expect("first save");

        let mut next = sample_state();
        next.current_inputs.clear();
        store.save(&next).expect("second save");

        let loaded = store.load().expect("load");
        assert!(loaded.current_inputs.is_empty());
        assert_eq!(loaded.budget_history.len(), 1);
    }
}
