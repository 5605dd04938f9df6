//! The storage seam. The repository only ever talks to a `dyn TaskStore`.

use thiserror::Error;
use uuid::Uuid;

use crate::{
    data_access::query::{SortKey, TaskFilter, TaskPatch},
    task::Task,
};

/// Collection-level operations on task documents.
pub trait TaskStore: Send + Sync {
    /// Cheap round trip proving the store is usable.
    fn ping(&self) -> Result<(), StoreError>;

    fn insert_one(&self, task: &Task) -> Result<(), StoreError>;

    fn find(&self, filter: &TaskFilter, sort: &[SortKey]) -> Result<Vec<Task>, StoreError>;

    fn find_one(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Returns whether a document matched. Unknown ids are left alone.
    fn update_one(&self, id: Uuid, patch: &TaskPatch) -> Result<bool, StoreError>;

    /// Flips `topped` in a single write. `None` when no document has this id.
    fn toggle_topped(&self, id: Uuid) -> Result<Option<bool>, StoreError>;

    /// Returns whether a document was removed.
    fn delete_one(&self, id: Uuid) -> Result<bool, StoreError>;

    fn count(&self, filter: &TaskFilter) -> Result<usize, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb: {0}")]
    Redb(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
    #[error("store lock poisoned")]
    Poisoned,
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);
