use finder_meta::{EntrySynchronizer, ManualClock, MemoryStorage, MetadataStore};
use std::sync::Arc;

pub const T0: i64 = 1_700_000_000_000;

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MetadataStore>,
    pub sync: Arc<EntrySynchronizer>,
}

pub fn harness() -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::new(T0));
    let store = Arc::new(MetadataStore::new(storage.clone(), clock.clone()));
    let sync = Arc::new(EntrySynchronizer::new(store.clone()));
    Harness {
        storage,
        clock,
        store,
        sync,
    }
}
