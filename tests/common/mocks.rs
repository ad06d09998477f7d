//! Mock versions of the store and listener traits.
use mockall::mock;

use specimen_id::core::{
    codec::SpecimenId,
    listener::{GenerationEvent, GenerationListener},
    store::{IdRecord, IdStore, StoreResult},
};

mock! {
    pub Store {}
    impl IdStore for Store {
        fn exists(&self, id: &SpecimenId) -> StoreResult<bool>;
        fn save(&self, record: &IdRecord) -> StoreResult<()>;
    }
}

mock! {
    pub Listener {}
    impl GenerationListener for Listener {
        fn record(&self, event: &GenerationEvent);
    }
}
