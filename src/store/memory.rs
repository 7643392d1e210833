//! In-memory chunk store

use super::traits::fetch_fork_table;
use super::{Chunk, ChunkStore, Loader};
use crate::model::Reference;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A chunk store held entirely in memory
///
/// Chunks are kept as encoded frames, the same bytes [`super::ObjectStore`]
/// writes to disk.
/// The number of fork-table fetches is counted so callers can observe how
/// much of a manifest a walk actually loaded.
#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<HashMap<Reference, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fork tables fetched so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Drop a chunk, returns whether it was present
    pub fn remove(&self, reference: &Reference) -> bool {
        self.chunks.write().remove(reference).is_some()
    }

    /// Overwrite the stored bytes under an address without re-addressing
    pub fn insert_raw(&self, reference: Reference, bytes: Vec<u8>) {
        self.chunks.write().insert(reference, bytes);
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }
}

impl ChunkStore for MemoryStore {
    fn put(&self, chunk: &Chunk) -> Result<Reference> {
        let reference = chunk.reference();
        if self.contains(&reference) {
            return Ok(reference);
        }
        let frame = chunk.encode()?;
        self.chunks.write().insert(reference, frame);
        Ok(reference)
    }

    fn get(&self, reference: &Reference) -> Result<Chunk> {
        let chunks = self.chunks.read();
        let bytes = chunks
            .get(reference)
            .ok_or_else(|| Error::NotFound(reference.to_hex()))?;
        Chunk::decode(bytes)
    }

    fn contains(&self, reference: &Reference) -> bool {
        self.chunks.read().contains_key(reference)
    }
}

impl Loader for MemoryStore {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        fetch_fork_table(self, reference)
    }
}
