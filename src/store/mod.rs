pub mod document;
pub mod local;
pub mod memory;

pub use document::{DocumentUpdate, UserDocument};
pub use local::{LocalState, LocalStore};
pub use memory::MemoryStore;

use crate::errors::Result;
use crate::session::UserId;

/// Abstraction over the remote document store keyed by user identity.
///
/// Object-safe so the ledger can hold `Arc<dyn DocumentStore>`; the real
/// remote implementation lives in the embedding application and owns its own
/// I/O, timeouts, and retries.
pub trait DocumentStore: Send + Sync {
    /// Reads the user's document. `None` means a fresh, unconfigured user.
    fn fetch(&self, user: &UserId) -> Result<Option<UserDocument>>;

    /// Applies a merge-style partial update, creating the document if absent.
    ///
    /// An update carrying several fields must land as one write; callers rely
    /// on that for consistency of cascading changes.
    fn apply(&self, user: &UserId, update: DocumentUpdate) -> Result<()>;
}
