use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::{BudgetError, Result};
use crate::session::UserId;

use super::{DocumentStore, DocumentUpdate, UserDocument};

/// In-memory document store, the reference implementation used in tests.
///
/// `write_count` exposes how many updates were applied, which lets tests
/// assert that multi-field operations arrive as a single merge write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, UserDocument>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a document, bypassing the write counter.
    pub fn insert(&self, user: &UserId, document: UserDocument) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(user.as_str().to_string(), document);
        }
    }

    /// Copy of the stored document, if any.
    pub fn document(&self, user: &UserId) -> Option<UserDocument> {
        self.documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(user.as_str()).cloned())
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, user: &UserId) -> Result<Option<UserDocument>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| BudgetError::Storage("memory store lock poisoned".into()))?;
        Ok(documents.get(user.as_str()).cloned())
    }

    fn apply(&self, user: &UserId, update: DocumentUpdate) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| BudgetError::Storage("memory store lock poisoned".into()))?;
        let document = documents.entry(user.as_str().to_string()).or_default();
        update.apply_to(document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
