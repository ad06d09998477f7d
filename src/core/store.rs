use serde::Serialize;
use thiserror::Error;

use super::codec::SpecimenId;

/// Opaque batch or pharmacy reference attached to issued identifiers.
///
/// The generator passes it through to the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BatchRef(String);

impl BatchRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A record handed to [`IdStore::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRecord {
    pub id: SpecimenId,
    pub batch_ref: Option<BatchRef>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Failure reported by a store
pub enum StoreError {
    /// The identifier is already persisted. `save` must report this atomically,
    /// independent of any earlier `exists` answer.
    #[error("ID '{0}' already exists in store")]
    UniquenessViolation(String),

    #[error("Store failure: {0}")]
    Other(String),
}

/// Result type for store writes.
pub type StoreResult<T> = Result<T, StoreError>;

/// A durable, uniqueness-enforcing home for issued identifiers.
///
/// Implementations are shared by concurrent generators, so `save` must reject a
/// duplicate at the storage layer: the generator's `exists` check is not atomic
/// with the write that follows it.
pub trait IdStore {
    /// Returns whether the identifier was already issued. No side effects.
    fn exists(&self, id: &SpecimenId) -> StoreResult<bool>;

    /// Persists a new record, or reports [`StoreError::UniquenessViolation`].
    fn save(&self, record: &IdRecord) -> StoreResult<()>;
}
