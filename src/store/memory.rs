use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::core::{
    codec::SpecimenId,
    store::{BatchRef, IdRecord, IdStore, StoreError, StoreResult},
};

/// A process-local store. Check-and-insert happens under one lock, so concurrent
/// generators sharing it never both win the same identifier.
///
/// Nothing survives the process; use it for tests, demos and dry runs.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<SpecimenId, Option<BatchRef>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of an issued identifier, `None` if it was never issued.
    pub fn get(&self, id: &SpecimenId) -> Option<IdRecord> {
        self.lock().get(id).map(|batch_ref| IdRecord {
            id: id.clone(),
            batch_ref: batch_ref.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<SpecimenId, Option<BatchRef>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdStore for InMemoryStore {
    fn exists(&self, id: &SpecimenId) -> StoreResult<bool> {
        Ok(self.lock().contains_key(id))
    }

    fn save(&self, record: &IdRecord) -> StoreResult<()> {
        match self.lock().entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniquenessViolation(record.id.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(record.batch_ref.clone());
                Ok(())
            }
        }
    }
}
