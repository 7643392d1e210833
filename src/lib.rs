//! # radix_manifest
//!
//! A lazily resolved compact radix trie mapping separator-delimited paths to
//! content-addressed references.
//!
//! Every trie vertex is stored as its own content-addressed chunk and only
//! fetched when a lookup or walk needs its children, so very large manifests
//! can be listed a few levels deep without materializing the whole tree.
//!
//! ## Core Concepts
//!
//! - **Node / Fork**: trie vertices and their compacted, multi-byte edges
//! - **Loader**: fetches a vertex's fork table by reference
//! - **Walker**: enumerates directories and files down to a depth bound,
//!   collapsing deeper subtrees into single directory markers
//! - **Manifest**: a store plus a root vertex
//!
//! ## Example
//!
//! ```ignore
//! use radix_manifest::{Entry, Manifest, ManifestBuilder, MemoryStore, Reference};
//!
//! let store = MemoryStore::new();
//! let mut builder = ManifestBuilder::new();
//! builder.insert("img/logo.png", Entry::new(Reference::digest(b"logo")))?;
//! let root = builder.persist(&store)?;
//!
//! let mut manifest = Manifest::open(store, root);
//! for record in manifest.list(b"", 1)? {
//!     println!("{}", record.full_path_lossy());
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod logging;
pub mod model;
pub mod store;
pub mod trie;

mod error;
mod manifest;

pub use cancel::CancelToken;
pub use config::Config;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use model::{Entry, Metadata, Reference};
pub use store::{ChunkStore, Loader, MemoryStore, ObjectStore};
pub use trie::{
    Closest, EntryKind, Fork, ManifestBuilder, Node, WalkEntry, WalkRecord, Walker, MAX_LEVEL,
};

/// Store file format version
pub const VERSION: u32 = 1;

/// Magic bytes for store file identification
pub const MAGIC: &[u8; 8] = b"RMANIFST";

/// Default path separator
pub const PATH_SEPARATOR: u8 = b'/';
