//! High-level Manifest API
//!
//! This module provides the main entry point for reading a persisted manifest.

use crate::cancel::CancelToken;
use crate::model::{Entry, Reference};
use crate::store::{ChunkStore, Loader};
use crate::trie::{Node, WalkEntry, WalkRecord, Walker, MAX_LEVEL};
use crate::{Error, Result, PATH_SEPARATOR};

/// A manifest: a chunk source plus a root vertex
///
/// Vertices are resolved on demand and cached in the in-memory tree for the
/// lifetime of the `Manifest`, so repeated walks only fetch what earlier
/// walks did not.
pub struct Manifest<S> {
    store: S,
    root: Node,
    separator: u8,
}

impl<S: Loader> Manifest<S> {
    /// Open the manifest rooted at `root`
    pub fn open(store: S, root: Reference) -> Self {
        Manifest {
            store,
            root: Node::from_reference(root),
            separator: PATH_SEPARATOR,
        }
    }

    /// Wrap an in-memory trie
    pub fn from_node(store: S, root: Node) -> Self {
        Manifest {
            store,
            root,
            separator: PATH_SEPARATOR,
        }
    }

    /// Use a different path separator for walks
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_reference(&self) -> Option<Reference> {
        self.root.reference().copied()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // === Lookups ===

    /// Get the entry stored exactly at `path`
    pub fn lookup(&mut self, path: &[u8]) -> Result<&Entry> {
        let node = self
            .root
            .lookup_node(path, &self.store, &CancelToken::new())?;
        node.entry().ok_or_else(|| Error::not_found(path))
    }

    /// Check if a value is stored at `path`
    pub fn contains(&mut self, path: &[u8]) -> Result<bool> {
        match self.lookup(path) {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // === Walks ===

    /// Level-bounded walk; see [`Walker::walk_level`]
    pub fn walk_level<F, E>(
        &mut self,
        start: &[u8],
        max_level: u32,
        cancel: &CancelToken,
        callback: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        Walker::new(&self.store)
            .with_separator(self.separator)
            .with_cancel(cancel.clone())
            .walk_level(&mut self.root, start, max_level, callback)
    }

    /// Unbounded walk of the whole manifest
    pub fn walk_all<F, E>(&mut self, cancel: &CancelToken, callback: F) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        self.walk_level(&[], MAX_LEVEL, cancel, callback)
    }

    /// Collect the events of a level-bounded walk
    pub fn list(&mut self, start: &[u8], max_level: u32) -> Result<Vec<WalkRecord>> {
        let mut records = Vec::new();
        self.walk_level(start, max_level, &CancelToken::new(), |entry: &WalkEntry<'_>| -> Result<()> {
            records.push(entry.to_record());
            Ok(())
        })?;
        Ok(records)
    }
}

impl<S: ChunkStore> Manifest<S> {
    /// Read the content stored at `path`
    pub fn content(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        let reference = self.lookup(path)?.reference;
        self.store.get_content(&reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::trie::{EntryKind, ManifestBuilder};

    fn setup() -> Manifest<MemoryStore> {
        let store = MemoryStore::new();
        let mut builder = ManifestBuilder::new();
        for (path, body) in [
            ("readme.md", "hello"),
            ("src/lib.rs", "pub mod a;"),
            ("src/a/mod.rs", "// a"),
        ] {
            let reference = store.put_content(body.as_bytes()).unwrap();
            builder
                .insert(path, Entry::new(reference).with_metadata("size", body.len().to_string()))
                .unwrap();
        }
        let root = builder.persist(&store).unwrap();
        Manifest::open(store, root)
    }

    #[test]
    fn test_manifest_lookup_and_content() {
        let mut manifest = setup();

        let entry = manifest.lookup(b"src/lib.rs").unwrap();
        assert_eq!(entry.metadata.get("size").map(String::as_str), Some("10"));
        assert_eq!(manifest.content(b"src/a/mod.rs").unwrap(), b"// a");

        assert!(manifest.contains(b"readme.md").unwrap());
        assert!(!manifest.contains(b"src/").unwrap());
        assert!(!manifest.contains(b"missing").unwrap());
    }

    #[test]
    fn test_manifest_list_one_level() {
        let mut manifest = setup();
        let records = manifest.list(b"", 1).unwrap();

        let listed: Vec<_> = records
            .iter()
            .map(|r| (r.kind, r.full_path_lossy()))
            .collect();
        assert_eq!(
            listed,
            vec![
                (EntryKind::File, "readme.md".to_string()),
                (EntryKind::Directory, "src/".to_string()),
            ]
        );
    }

    #[test]
    fn test_manifest_caches_resolved_vertices() {
        let mut manifest = setup();
        manifest.list(b"", MAX_LEVEL).unwrap();
        let fetched = manifest.store().fetch_count();
        assert!(fetched > 0);

        manifest.list(b"", MAX_LEVEL).unwrap();
        assert_eq!(manifest.store().fetch_count(), fetched);
        assert!(manifest.root_reference().is_some());
    }
}
