//! Lazily resolved compact radix trie
//!
//! A manifest maps separator-delimited byte paths to content references:
//! - Each vertex's fork table is stored as its own content-addressed chunk
//! - Runs of single-child vertices are compacted into one multi-byte label
//! - Vertices are fetched from a [`crate::store::Loader`] on first access

mod builder;
mod lookup;
mod node;
mod prefix;
mod table;
mod walk;

pub use builder::{ManifestBuilder, DEFAULT_MAX_LABEL_LEN};
pub use lookup::Closest;
pub use node::{Children, Fork, Node};
pub use prefix::{common_prefix, common_prefix_len};
pub use walk::{EntryKind, WalkEntry, WalkRecord, Walker, MAX_LEVEL};
