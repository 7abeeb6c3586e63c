//! Loading of the balance and movement tables handed to the analytics core.

pub mod csv;
pub mod error;

use crate::core::records::RecordStore;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use self::csv::CsvSource;
pub use error::IngestError;

/// Source tables plus a fingerprint of their content, used to key cached results.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub store: RecordStore,
    pub fingerprint: u64,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load(&self) -> error::Result<LoadedSources>;
}

/// Hashes the raw content of each source; absent sources hash differently
/// from empty ones.
pub fn fingerprint(parts: &[Option<&[u8]>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    hasher.finish()
}

/// Tables already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    store: RecordStore,
}

impl MemorySource {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn load(&self) -> error::Result<LoadedSources> {
        let mut hasher = DefaultHasher::new();
        self.store.balances.hash(&mut hasher);
        self.store.movements.hash(&mut hasher);
        Ok(LoadedSources {
            store: self.store.clone(),
            fingerprint: hasher.finish(),
        })
    }
}
