#![allow(dead_code)]

mod mocks;

pub use mocks::{MockListener, MockStore};

use specimen_id::{
    core::{
        codec::SpecimenId,
        store::{IdRecord, IdStore, StoreResult},
    },
    store::memory::InMemoryStore,
};

/// Store whose existence check always answers "no", as if every check raced a
/// concurrent writer. Only the inner store's uniqueness constraint protects it.
pub struct BlindStore<'a, S: IdStore> {
    pub inner: &'a S,
}

impl<S: IdStore> IdStore for BlindStore<'_, S> {
    fn exists(&self, _id: &SpecimenId) -> StoreResult<bool> {
        Ok(false)
    }

    fn save(&self, record: &IdRecord) -> StoreResult<()> {
        self.inner.save(record)
    }
}

pub fn seeded_memory_store(ids: &[SpecimenId]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for id in ids {
        store
            .save(&IdRecord {
                id: id.clone(),
                batch_ref: None,
            })
            .expect("seed ids are distinct");
    }
    store
}
