//! The persistence collaborator contract.

use async_trait::async_trait;

use crate::storage::StorageError;

/// Why a save attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The save task died before reporting an outcome.
    #[error("save task failed: {0}")]
    Task(String),
}

/// Writes documents somewhere durable.
///
/// Implementations must be idempotent upserts keyed by the document's
/// identity: the scheduler may persist the same snapshot more than once.
#[async_trait]
pub trait Persist<D>: Send + Sync {
    async fn persist(&self, document: &D) -> Result<(), PersistError>;
}
