//! Storage trait definitions

use super::Chunk;
use crate::model::Reference;
use crate::{Error, Result};
use std::sync::Arc;

/// Fetches the serialized fork table of a persisted vertex
///
/// Implementations may block on disk or network I/O. Retry policy, if any,
/// belongs to the implementation; callers surface failures as
/// [`Error::Fetch`].
pub trait Loader {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>>;
}

impl<L: Loader + ?Sized> Loader for &L {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>> {
        (**self).fetch(reference)
    }
}

impl<L: Loader + ?Sized> Loader for Arc<L> {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>> {
        (**self).fetch(reference)
    }
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>> {
        (**self).fetch(reference)
    }
}

/// Read/write access to typed chunks
pub trait ChunkStore: Loader {
    /// Store a chunk, returns its address
    fn put(&self, chunk: &Chunk) -> Result<Reference>;

    /// Retrieve a chunk by address
    fn get(&self, reference: &Reference) -> Result<Chunk>;

    /// Check if an address is present
    fn contains(&self, reference: &Reference) -> bool;

    /// Store raw leaf content
    fn put_content(&self, data: &[u8]) -> Result<Reference> {
        self.put(&Chunk::Content(data.to_vec()))
    }

    /// Retrieve raw leaf content
    fn get_content(&self, reference: &Reference) -> Result<Vec<u8>> {
        self.get(reference)?.into_content(reference)
    }
}

/// Shared [`Loader::fetch`] for chunk stores
///
/// Bytes that came back but do not hold a fork table (unreadable frame,
/// wrong chunk kind) are a decode error; failing to get any bytes is a
/// fetch error.
pub(crate) fn fetch_fork_table<S: ChunkStore + ?Sized>(
    store: &S,
    reference: &Reference,
) -> Result<Vec<u8>> {
    let chunk = store.get(reference).map_err(|e| match e {
        e @ (Error::Fetch { .. } | Error::Decode(_)) => e,
        Error::Corruption(reason) => Error::Decode(format!("{}: {}", reference.short(), reason)),
        other => Error::fetch(reference, other),
    })?;
    chunk.into_fork_table(reference)
}
