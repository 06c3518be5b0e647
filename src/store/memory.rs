use std::cell::RefCell;

use crate::domain::unsubscribe::ArtifactKey;
use crate::error::Result;
use crate::store::repo::ArtifactStore;

/// Keeps artifacts in insertion order; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    items: RefCell<Vec<(ArtifactKey, Vec<u8>)>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().iter().map(|(k, _)| k.to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.items
            .borrow()
            .iter()
            .rev()
            .find(|(k, _)| k.to_string() == key)
            .map(|(_, v)| v.clone())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<()> {
        self.items.borrow_mut().push((key.clone(), bytes.to_vec()));
        Ok(())
    }
}
