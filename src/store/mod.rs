//! Content-addressed chunk storage
//!
//! Manifest vertices and file contents are stored as tagged chunks keyed by
//! their BLAKE3 address and compressed with zstd. The walker only needs the
//! read side ([`Loader`]); building a manifest needs [`ChunkStore`].

mod chunk;
mod file_store;
mod memory;
mod traits;

pub use chunk::Chunk;
pub use file_store::ObjectStore;
pub use memory::MemoryStore;
pub use traits::{ChunkStore, Loader};
