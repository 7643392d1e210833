//! In-memory manifest construction

use super::node::{Children, Fork, Node};
use super::prefix::common_prefix_len;
use super::table;
use crate::model::{Entry, Reference};
use crate::store::{Chunk, ChunkStore};
use crate::{Error, Result};
use std::collections::btree_map::Entry as Slot;

/// Longest label a single fork may carry before the path is chained through
/// another vertex
pub const DEFAULT_MAX_LABEL_LEN: usize = 30;

/// Builds a manifest trie from `(path, entry)` pairs
///
/// Insertion splits a fork at the first byte where the new path diverges from
/// its label, so siblings never share a leading byte.
pub struct ManifestBuilder {
    root: Node,
    max_label_len: usize,
}

impl ManifestBuilder {
    /// Create a builder with an empty root
    pub fn new() -> Self {
        ManifestBuilder {
            root: Node::new(),
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }

    /// Cap label length; longer paths are stored across chained vertices
    pub fn with_max_label_len(mut self, max_label_len: usize) -> Self {
        self.max_label_len = max_label_len.max(1);
        self
    }

    /// Insert or replace the entry stored at `path`
    pub fn insert(&mut self, path: impl AsRef<[u8]>, entry: Entry) -> Result<()> {
        let path = path.as_ref();
        if path.is_empty() {
            return Err(Error::InvalidPath("cannot store an empty path".into()));
        }
        insert_recursive(&mut self.root, path, entry, self.max_label_len)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Take the in-memory, fully resolved trie
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Write every vertex to `store`, children first, and return the root
    /// reference
    pub fn persist<S: ChunkStore + ?Sized>(&mut self, store: &S) -> Result<Reference> {
        let reference = persist_node(&mut self.root, store)?;
        tracing::debug!(root = %reference.short(), "persisted manifest");
        Ok(reference)
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_recursive(node: &mut Node, path: &[u8], entry: Entry, max_label_len: usize) -> Result<()> {
    let Some(&key) = path.first() else {
        node.set_entry(Some(entry));
        return Ok(());
    };

    let forks = node
        .forks_mut()
        .ok_or_else(|| Error::InvalidPath("cannot insert below an unresolved vertex".into()))?;

    match forks.entry(key) {
        Slot::Vacant(slot) => {
            let take = path.len().min(max_label_len);
            let mut child = Node::new();
            insert_recursive(&mut child, &path[take..], entry, max_label_len)?;
            slot.insert(Fork {
                label: path[..take].to_vec(),
                child,
            });
        }
        Slot::Occupied(slot) => {
            let fork = slot.into_mut();
            let common = common_prefix_len(&fork.label, path);

            if common < fork.label.len() {
                // Split the fork: keep the shared part, push the rest down
                let tail = fork.label.split_off(common);
                let old_child = std::mem::take(&mut fork.child);
                let mut mid = Node::new();
                mid.add_fork(tail, old_child)?;
                fork.child = mid;
            }

            insert_recursive(&mut fork.child, &path[common..], entry, max_label_len)?;
        }
    }
    Ok(())
}

fn persist_node<S: ChunkStore + ?Sized>(node: &mut Node, store: &S) -> Result<Reference> {
    if let Children::Unresolved(reference) = node.children() {
        return Ok(*reference);
    }

    if let Some(forks) = node.forks_mut() {
        for fork in forks.values_mut() {
            if fork.child.has_forks() {
                persist_node(&mut fork.child, store)?;
            }
        }
    }

    let data = match node.forks() {
        Some(forks) => table::encode(forks)?,
        None => return Err(Error::InvalidReference("vertex lost its fork table".into())),
    };
    let reference = store.put(&Chunk::ForkTable(data))?;
    node.set_reference(reference);
    Ok(reference)
}
